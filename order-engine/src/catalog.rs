//! Catalogue and branch-configuration provider port
//!
//! The engine never owns catalogue data. It reads item price/availability
//! at order-creation time and the branch token configuration at allocation
//! time through this trait; the surrounding application wires in whatever
//! backend it uses. `MemoryCatalog` is the in-process implementation used
//! by tests and embedded setups.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use shared::models::BranchTokenConfig;
use thiserror::Error;

/// A catalogue item as seen by the engine at order-creation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogueItem {
    /// Catalogue item ID
    pub item_id: String,
    /// Branch the item natively belongs to
    pub branch_id: String,
    /// Current price (snapshotted into the order line)
    pub price: f64,
    /// Whether the item can currently be ordered
    pub available: bool,
    /// Other branches the item is explicitly shared with
    #[serde(default)]
    pub shared_with_branch_ids: Vec<String>,
}

impl CatalogueItem {
    /// An item is orderable for a branch if it natively belongs to it or
    /// is explicitly shared with it.
    pub fn orderable_for(&self, branch_id: &str) -> bool {
        self.branch_id == branch_id
            || self
                .shared_with_branch_ids
                .iter()
                .any(|shared| shared == branch_id)
    }
}

/// Catalogue backend failures (transient from the engine's point of view)
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalogue backend unavailable: {0}")]
    Unavailable(String),
}

/// Read-only port to the excluded catalogue/branch management subsystem
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Token configuration for a branch
    ///
    /// Failing to load the branch record is a transient error; allocation
    /// must not proceed on guessed configuration.
    async fn branch_token_config(
        &self,
        tenant_id: &str,
        branch_id: &str,
    ) -> Result<BranchTokenConfig, CatalogError>;

    /// Look up a catalogue item within a tenant; None if it does not exist
    async fn catalogue_item(
        &self,
        tenant_id: &str,
        item_id: &str,
    ) -> Result<Option<CatalogueItem>, CatalogError>;
}

/// In-memory catalogue, keyed per tenant
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    configs: DashMap<(String, String), BranchTokenConfig>,
    items: DashMap<(String, String), CatalogueItem>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token configuration for a branch
    pub fn set_token_config(&self, tenant_id: &str, branch_id: &str, config: BranchTokenConfig) {
        self.configs
            .insert((tenant_id.to_string(), branch_id.to_string()), config);
    }

    /// Insert or replace a catalogue item
    pub fn insert_item(&self, tenant_id: &str, item: CatalogueItem) {
        self.items
            .insert((tenant_id.to_string(), item.item_id.clone()), item);
    }

    /// Update an item's price (models a later catalogue edit)
    pub fn set_price(&self, tenant_id: &str, item_id: &str, price: f64) {
        if let Some(mut item) = self
            .items
            .get_mut(&(tenant_id.to_string(), item_id.to_string()))
        {
            item.price = price;
        }
    }

    /// Mark an item available/unavailable
    pub fn set_available(&self, tenant_id: &str, item_id: &str, available: bool) {
        if let Some(mut item) = self
            .items
            .get_mut(&(tenant_id.to_string(), item_id.to_string()))
        {
            item.available = available;
        }
    }
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
    async fn branch_token_config(
        &self,
        tenant_id: &str,
        branch_id: &str,
    ) -> Result<BranchTokenConfig, CatalogError> {
        // Unknown branches fall back to the default 1..=999 enabled range
        Ok(self
            .configs
            .get(&(tenant_id.to_string(), branch_id.to_string()))
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn catalogue_item(
        &self,
        tenant_id: &str,
        item_id: &str,
    ) -> Result<Option<CatalogueItem>, CatalogError> {
        Ok(self
            .items
            .get(&(tenant_id.to_string(), item_id.to_string()))
            .map(|entry| entry.clone()))
    }
}
