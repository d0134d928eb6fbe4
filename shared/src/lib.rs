//! Shared domain types for the order lifecycle engine
//!
//! Common types used by the engine crate and its callers: the order
//! aggregate, the status state machine rules, branch token configuration,
//! and small time utilities.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use models::BranchTokenConfig;
pub use order::{
    CancellationRequest, CartLineInput, CustomerInfo, Order, OrderLine, OrderStatus, OrderType,
};
pub use serde::{Deserialize, Serialize};
