//! Order Lifecycle & Token Assignment Engine
//!
//! The core of a multi-tenant cafe ordering system. Web routing, auth, and
//! presentation live elsewhere; this crate owns the invariants:
//!
//! - **tokens**: per-branch display token allocation with range wrap
//! - **engine**: the order service façade, state machine enforcement, and
//!   the cancellation timer
//! - **storage**: redb-backed persistence with versioned compare-and-swap
//! - **catalog**: read-only port to the branch/catalogue subsystem
//!
//! # Data Flow
//!
//! 1. A caller submits a cart scoped to a tenant+branch
//! 2. `OrderService` validates lines against the catalogue and snapshots prices
//! 3. `BranchTokenAllocator` issues the next display token for the branch
//! 4. The order is persisted in PENDING
//! 5. Staff drive it forward (PREPARING → READY → COMPLETED) under
//!    optimistic concurrency
//! 6. A cancellation request parks the order in CANCELLATION_PENDING and
//!    arms a timer; staff acceptance cancels, anything else reverts
//!
//! # Module Structure
//!
//! ```text
//! order-engine/src/
//! ├── core/          # Configuration
//! ├── catalog.rs     # Catalogue/branch-config provider port
//! ├── storage.rs     # redb persistence layer
//! ├── tokens.rs      # Branch token allocator
//! ├── money.rs       # Decimal arithmetic helpers
//! ├── engine/        # Service façade, errors, cancellation timer
//! └── utils/         # Logging setup
//! ```

pub mod catalog;
pub mod core;
pub mod engine;
pub mod money;
pub mod storage;
pub mod tokens;
pub mod utils;

// Re-export public surface
pub use catalog::{CatalogError, CatalogProvider, CatalogueItem, MemoryCatalog};
pub use self::core::config::EngineConfig;
pub use engine::{CancellationTimerService, EngineError, EngineResult, OrderService};
pub use storage::{OrderFilter, OrderStore, StorageError, StorageResult};
pub use tokens::BranchTokenAllocator;
pub use utils::logger::{init_logger, init_logger_with_file};
