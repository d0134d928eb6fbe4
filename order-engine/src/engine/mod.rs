//! Order lifecycle engine
//!
//! This module drives an order through its bounded state machine:
//!
//! - **service**: the `OrderService` façade callers talk to
//! - **timer**: the cancellation grace-window timer
//! - **error**: the engine error taxonomy
//!
//! # Operation Flow
//!
//! ```text
//! create_order(cart)
//!     ├─ 1. Validate lines against the catalogue
//!     ├─ 2. Snapshot prices, compute total
//!     ├─ 3. Allocate display token (per-branch counter)
//!     └─ 4. Persist in PENDING
//!
//! request_transition / request_cancellation / resolve_cancellation
//!     ├─ 1. Load order, enforce tenant+branch scope
//!     ├─ 2. Validate against the state machine
//!     └─ 3. Commit with the snapshot's version (conflict on stale writer)
//! ```

mod error;
pub use error::*;

pub mod service;
pub mod timer;

pub use service::OrderService;
pub use timer::CancellationTimerService;

#[cfg(test)]
mod tests;
