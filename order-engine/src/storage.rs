//! redb-based storage layer for orders and branch token counters
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | One record per order |
//! | `token_counters` | `(tenant_id, branch_id)` | `u32` | Next display token per branch |
//!
//! # Concurrency
//!
//! redb gives a single writer per commit, so a read-modify-write inside one
//! write transaction is atomic. Order updates additionally carry an
//! expected version: a writer whose snapshot went stale gets
//! `VersionConflict` instead of silently overwriting the newer record.
//!
//! # Durability
//!
//! Commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so token counters and order state survive
//! power loss without replay.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::BranchTokenConfig;
use shared::order::{Order, OrderStatus};
use shared::util::now_millis;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for per-branch token counters: key = (tenant_id, branch_id), value = next token
const TOKEN_COUNTERS_TABLE: TableDefinition<(&str, &str), u32> =
    TableDefinition::new("token_counters");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    DuplicateOrder(String),

    #[error("Version conflict on order {order_id}: expected {expected}, found {found}")]
    VersionConflict {
        order_id: String,
        expected: u64,
        found: u64,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Read-side filter for order listings
///
/// Tenant scoping is mandatory and passed separately; everything here is
/// optional narrowing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub branch_id: Option<String>,
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on `created_at` (Unix millis)
    pub created_from: Option<i64>,
    /// Inclusive upper bound on `created_at` (Unix millis)
    pub created_to: Option<i64>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(branch_id) = &self.branch_id
            && order.branch_id != *branch_id
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }
        true
    }
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and ephemeral embeddings)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(TOKEN_COUNTERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Order Operations ==========

    /// Insert a newly created order
    pub fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            if table.get(order.order_id.as_str())?.is_some() {
                return Err(StorageError::DuplicateOrder(order.order_id.clone()));
            }
            let value = serde_json::to_vec(order)?;
            table.insert(order.order_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => {
                let order: Order = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Commit an order mutation guarded by its expected version
    ///
    /// The caller prepares the updated record from a snapshot it read
    /// earlier and passes that snapshot's version. If the persisted version
    /// moved in the meantime the write is refused with `VersionConflict`
    /// and the caller must re-read and retry. On success the stored record
    /// (version bumped, `updated_at` stamped) is returned.
    pub fn update_order(&self, mut order: Order, expected_version: u64) -> StorageResult<Order> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let current_version = match table.get(order.order_id.as_str())? {
                Some(value) => {
                    let current: Order = serde_json::from_slice(value.value())?;
                    current.version
                }
                None => return Err(StorageError::OrderNotFound(order.order_id.clone())),
            };
            if current_version != expected_version {
                return Err(StorageError::VersionConflict {
                    order_id: order.order_id.clone(),
                    expected: expected_version,
                    found: current_version,
                });
            }
            order.version = expected_version + 1;
            order.updated_at = now_millis();
            let value = serde_json::to_vec(&order)?;
            table.insert(order.order_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(order)
    }

    /// List a tenant's orders, optionally narrowed by branch/status/date
    pub fn list_orders(&self, tenant_id: &str, filter: &OrderFilter) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.tenant_id == tenant_id && filter.matches(&order) {
                orders.push(order);
            }
        }
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    /// All orders currently in CANCELLATION_PENDING (timer recovery scan)
    pub fn pending_cancellations(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.status == OrderStatus::CancellationPending {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    // ========== Token Counter Operations ==========

    /// Issue the next display token for a branch
    ///
    /// The counter is seeded from the branch's configured `current_token`
    /// on first use; afterwards the persisted counter is authoritative.
    /// A value outside the configured range (exhaustion, or an operator
    /// shrinking the range under a live counter) wraps to `range_start`.
    /// An inverted range (`range_start > range_end`) is treated as a
    /// single-token range at `range_start` and logged; it is an operator
    /// misconfiguration, not grounds to refuse the order.
    /// The read-modify-write happens inside one write transaction, so two
    /// concurrent allocators can never observe the same counter value.
    pub fn next_token(
        &self,
        tenant_id: &str,
        branch_id: &str,
        config: &BranchTokenConfig,
    ) -> StorageResult<u32> {
        let (range_start, range_end) = if config.range_start <= config.range_end {
            (config.range_start, config.range_end)
        } else {
            tracing::warn!(
                tenant_id,
                branch_id,
                range_start = config.range_start,
                range_end = config.range_end,
                "Inverted token range, degenerating to single-token range"
            );
            (config.range_start, config.range_start)
        };

        let txn = self.db.begin_write()?;
        let token = {
            let mut table = txn.open_table(TOKEN_COUNTERS_TABLE)?;
            let key = (tenant_id, branch_id);
            let stored = table.get(key)?.map(|guard| guard.value());
            let mut candidate = stored.unwrap_or(config.current_token);
            if candidate < range_start || candidate > range_end {
                candidate = range_start;
            }
            // Wrapping at the end here keeps the successor in range even
            // when range_end is u32::MAX
            let next = if candidate == range_end {
                range_start
            } else {
                candidate + 1
            };
            table.insert(key, next)?;
            candidate
        };
        txn.commit()?;
        Ok(token)
    }

    /// Current counter value for a branch, if any (diagnostics)
    pub fn peek_token_counter(
        &self,
        tenant_id: &str,
        branch_id: &str,
    ) -> StorageResult<Option<u32>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TOKEN_COUNTERS_TABLE)?;
        Ok(table.get((tenant_id, branch_id))?.map(|guard| guard.value()))
    }
}
