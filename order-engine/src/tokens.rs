//! Branch display token allocation
//!
//! Every branch hands out small sequential numbers that customers watch
//! for on a screen. The allocator owns the per-branch counter: it reads
//! the branch configuration from the catalogue subsystem, serializes
//! allocations per branch, and wraps the counter at the end of the range.
//!
//! Tokens are not unique across the lifetime of a branch; after a wrap
//! the same number comes around again. Operators size the range to exceed
//! the plausible number of concurrently open orders.

use crate::catalog::CatalogProvider;
use crate::engine::{EngineError, EngineResult};
use crate::storage::OrderStore;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Allocates display tokens per branch
///
/// Allocations for the same branch are serialized through a per-branch
/// mutex around the counter's read-modify-write; different branches never
/// contend on each other's lock.
pub struct BranchTokenAllocator {
    store: OrderStore,
    catalog: Arc<dyn CatalogProvider>,
    branch_locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl BranchTokenAllocator {
    pub fn new(store: OrderStore, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            store,
            catalog,
            branch_locks: DashMap::new(),
        }
    }

    /// Allocate the next token for a branch
    ///
    /// Returns `Ok(None)` when the branch's token system is disabled; the
    /// order is then created without a token. Fails only when the branch
    /// configuration cannot be loaded or the counter cannot be committed,
    /// both transient from the caller's point of view.
    pub async fn allocate(&self, tenant_id: &str, branch_id: &str) -> EngineResult<Option<u32>> {
        let config = self
            .catalog
            .branch_token_config(tenant_id, branch_id)
            .await?;

        if !config.enabled {
            tracing::debug!(tenant_id, branch_id, "Token system disabled for branch");
            return Ok(None);
        }

        let lock = Arc::clone(
            &*self
                .branch_locks
                .entry((tenant_id.to_string(), branch_id.to_string()))
                .or_default(),
        );
        // Held only across the synchronous counter commit, never an await
        let _guard = lock.lock();
        let token = self
            .store
            .next_token(tenant_id, branch_id, &config)
            .map_err(EngineError::from)?;

        tracing::debug!(tenant_id, branch_id, token, "Allocated display token");
        Ok(Some(token))
    }
}
