use super::*;

#[tokio::test]
async fn test_create_order_snapshots_prices_and_totals() {
    let catalog = seeded_catalog();
    let service = service_with(Arc::clone(&catalog));

    let order = place_order(&service).await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.total_amount, 9.50);
    assert_eq!(order.token_number, Some(1));
    assert!(order.completed_at.is_none());

    // A later catalogue price edit must not touch the persisted order
    catalog.set_price(TENANT, "latte", 99.0);
    let reloaded = service.get_order(TENANT, BRANCH, &order.order_id).unwrap();
    assert_eq!(reloaded.total_amount, 9.50);
    assert_eq!(reloaded.lines[0].price, 3.50);
}

#[tokio::test]
async fn test_create_order_empty_cart_rejected() {
    let service = test_service();
    let err = service
        .create_order(TENANT, BRANCH, OrderType::DineIn, None, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn test_create_order_bad_quantity_names_line() {
    let service = test_service();
    let err = service
        .create_order(
            TENANT,
            BRANCH,
            OrderType::DineIn,
            None,
            &[line("latte", 1), line("americano", 0)],
        )
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(msg.contains("line 1"));
    assert!(msg.contains("americano"));

    // Nothing was persisted
    assert!(service
        .list_orders(TENANT, &OrderFilter::default())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_create_order_unknown_item_rejected() {
    let service = test_service();
    let err = service
        .create_order(TENANT, BRANCH, OrderType::DineIn, None, &[line("ghost", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
async fn test_create_order_unavailable_item_rejected() {
    let service = test_service();
    let err = service
        .create_order(
            TENANT,
            BRANCH,
            OrderType::Takeaway,
            None,
            &[line("seasonal", 1)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn test_create_order_foreign_item_rejected_shared_item_accepted() {
    let service = test_service();

    let err = service
        .create_order(TENANT, BRANCH, OrderType::DineIn, None, &[line("foreign", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Shared from b-2 into BRANCH, so orderable here
    let order = service
        .create_order(TENANT, BRANCH, OrderType::DineIn, None, &[line("croissant", 3)])
        .await
        .unwrap();
    assert_eq!(order.total_amount, 6.00);
}

#[tokio::test]
async fn test_create_order_token_disabled_branch() {
    let catalog = seeded_catalog();
    catalog.set_token_config(
        TENANT,
        BRANCH,
        BranchTokenConfig {
            enabled: false,
            ..Default::default()
        },
    );
    let service = service_with(catalog);

    let order = place_order(&service).await;
    assert_eq!(order.token_number, None);
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_scope_enforcement_distinguishes_not_found() {
    let service = test_service();
    let order = place_order(&service).await;

    // Wrong tenant and wrong branch are authorization failures
    let err = service.get_order("t-2", BRANCH, &order.order_id).unwrap_err();
    assert!(matches!(err, EngineError::Authorization { .. }));
    let err = service.get_order(TENANT, "b-2", &order.order_id).unwrap_err();
    assert!(matches!(err, EngineError::Authorization { .. }));

    // A genuinely unknown id is not
    let err = service.get_order(TENANT, BRANCH, "no-such-order").unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_scope_enforcement_on_mutations() {
    let service = test_service();
    let order = place_order(&service).await;

    let err = service
        .request_transition("t-2", BRANCH, &order.order_id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authorization { .. }));

    let err = service
        .request_cancellation(TENANT, "b-2", &order.order_id, "customer")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authorization { .. }));

    // The order is untouched
    let reloaded = service.get_order(TENANT, BRANCH, &order.order_id).unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
    assert_eq!(reloaded.version, 0);
}

#[tokio::test]
async fn test_list_orders_filtering() {
    let service = test_service();
    let first = place_order(&service).await;
    let second = place_order(&service).await;
    service
        .request_transition(TENANT, BRANCH, &second.order_id, OrderStatus::Preparing)
        .await
        .unwrap();

    let all = service.list_orders(TENANT, &OrderFilter::default()).unwrap();
    assert_eq!(all.len(), 2);

    let pending = service
        .list_orders(
            TENANT,
            &OrderFilter {
                status: Some(OrderStatus::Pending),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].order_id, first.order_id);

    // Another tenant sees nothing
    let other = service.list_orders("t-2", &OrderFilter::default()).unwrap();
    assert!(other.is_empty());
}
