//! Service-level test suite
//!
//! Shared fixtures: an in-memory store, a seeded in-memory catalogue, and
//! a service wired with the default 60s grace window. Timer tests run on a
//! paused tokio clock.

use super::*;
use crate::catalog::{CatalogueItem, MemoryCatalog};
use crate::core::config::EngineConfig;
use crate::storage::{OrderFilter, OrderStore};
use shared::models::BranchTokenConfig;
use shared::order::{CartLineInput, Order, OrderStatus, OrderType};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod test_core;

const TENANT: &str = "t-1";
const BRANCH: &str = "b-1";

fn test_config() -> EngineConfig {
    EngineConfig {
        db_path: "unused".to_string(),
        grace_window_secs: 60,
        timer_retry_base_secs: 1,
        timer_retry_max_secs: 5,
    }
}

fn catalogue_item(
    item_id: &str,
    branch_id: &str,
    price: f64,
    available: bool,
    shared_with: &[&str],
) -> CatalogueItem {
    CatalogueItem {
        item_id: item_id.to_string(),
        branch_id: branch_id.to_string(),
        price,
        available,
        shared_with_branch_ids: shared_with.iter().map(|s| s.to_string()).collect(),
    }
}

fn seeded_catalog() -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    catalog.insert_item(TENANT, catalogue_item("latte", BRANCH, 3.50, true, &[]));
    catalog.insert_item(TENANT, catalogue_item("americano", BRANCH, 2.50, true, &[]));
    // Owned by another branch but explicitly shared with BRANCH
    catalog.insert_item(TENANT, catalogue_item("croissant", "b-2", 2.00, true, &[BRANCH]));
    // Exists but cannot currently be ordered
    catalog.insert_item(TENANT, catalogue_item("seasonal", BRANCH, 4.00, false, &[]));
    // Belongs elsewhere and is not shared
    catalog.insert_item(TENANT, catalogue_item("foreign", "b-9", 9.00, true, &[]));
    Arc::new(catalog)
}

fn service_with(catalog: Arc<MemoryCatalog>) -> OrderService {
    OrderService::new(
        OrderStore::open_in_memory().unwrap(),
        catalog,
        test_config(),
        CancellationToken::new(),
    )
}

fn test_service() -> OrderService {
    service_with(seeded_catalog())
}

fn line(item_id: &str, quantity: i32) -> CartLineInput {
    CartLineInput {
        item_id: item_id.to_string(),
        quantity,
    }
}

/// Place a standard order: 2x latte + 1x americano = 9.50
async fn place_order(service: &OrderService) -> Order {
    service
        .create_order(
            TENANT,
            BRANCH,
            OrderType::DineIn,
            None,
            &[line("latte", 2), line("americano", 1)],
        )
        .await
        .unwrap()
}

/// Let spawned timer tasks run without advancing the paused clock
async fn let_timers_settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}
