//! Order aggregate and state machine rules
//!
//! - **status**: the order status enum and its transition rules
//! - **types**: cart input, line snapshots, customer info, cancellation bookkeeping
//! - **record**: the persisted order aggregate

pub mod record;
pub mod status;
pub mod types;

pub use record::Order;
pub use status::OrderStatus;
pub use types::{CancellationRequest, CartLineInput, CustomerInfo, OrderLine, OrderType};
