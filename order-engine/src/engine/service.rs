//! OrderService - the engine façade
//!
//! Combines the token allocator, the state machine rules, and the
//! cancellation timer behind one API. Every operation takes an explicit
//! tenant+branch scope; nothing is inferred from ambient state, so the
//! engine is testable without a web framework around it.

use crate::catalog::CatalogProvider;
use crate::core::config::EngineConfig;
use crate::engine::timer::CancellationTimerService;
use crate::engine::{EngineError, EngineResult};
use crate::money;
use crate::storage::{OrderFilter, OrderStore};
use crate::tokens::BranchTokenAllocator;
use shared::order::{
    CancellationRequest, CartLineInput, CustomerInfo, Order, OrderLine, OrderStatus, OrderType,
};
use shared::util::now_millis;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The order lifecycle façade
pub struct OrderService {
    store: OrderStore,
    catalog: Arc<dyn CatalogProvider>,
    allocator: BranchTokenAllocator,
    timers: Arc<CancellationTimerService>,
    config: EngineConfig,
}

impl OrderService {
    pub fn new(
        store: OrderStore,
        catalog: Arc<dyn CatalogProvider>,
        config: EngineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let allocator = BranchTokenAllocator::new(store.clone(), Arc::clone(&catalog));
        let timers = CancellationTimerService::new(store.clone(), config.clone(), shutdown);
        Self {
            store,
            catalog,
            allocator,
            timers,
            config,
        }
    }

    /// Re-arm timers for cancellation requests that survived a restart
    ///
    /// Must be called once at startup, inside a tokio runtime. Returns the
    /// number of timers armed.
    pub fn recover_timers(&self) -> EngineResult<usize> {
        let armed = self.timers.recover_pending()?;
        if armed > 0 {
            tracing::info!(armed, "Recovered pending cancellation timers");
        }
        Ok(armed)
    }

    /// The timer service, for embedders that want to inspect it
    pub fn timers(&self) -> &Arc<CancellationTimerService> {
        &self.timers
    }

    // ========== Order Creation ==========

    /// Create an order from a cart
    ///
    /// Validates every line against the branch-scoped catalogue, snapshots
    /// current prices, computes the total, allocates a display token, and
    /// persists the order in PENDING. Any validation failure rejects the
    /// whole cart; no partial order is ever created.
    pub async fn create_order(
        &self,
        tenant_id: &str,
        branch_id: &str,
        order_type: OrderType,
        customer: Option<CustomerInfo>,
        cart: &[CartLineInput],
    ) -> EngineResult<Order> {
        if cart.is_empty() {
            return Err(EngineError::Validation(
                "cart must contain at least one line".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(cart.len());
        for (index, input) in cart.iter().enumerate() {
            money::validate_cart_line(input, index)?;

            let item = self
                .catalog
                .catalogue_item(tenant_id, &input.item_id)
                .await?
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "line {} ({}): unknown catalogue item",
                        index, input.item_id
                    ))
                })?;
            if !item.orderable_for(branch_id) {
                return Err(EngineError::Validation(format!(
                    "line {} ({}): item is not available to branch {}",
                    index, input.item_id, branch_id
                )));
            }
            if !item.available {
                return Err(EngineError::Validation(format!(
                    "line {} ({}): item is currently unavailable",
                    index, input.item_id
                )));
            }
            money::validate_price(item.price, &input.item_id)?;

            lines.push(OrderLine {
                item_id: input.item_id.clone(),
                quantity: input.quantity,
                price: item.price,
            });
        }

        // Token allocation commits the branch counter; if persisting the
        // order fails afterwards the number is burned, which the wrap
        // semantics tolerate. The reverse (order without settled counter)
        // would violate the uniqueness guarantee, so order matters here.
        let token_number = self.allocator.allocate(tenant_id, branch_id).await?;

        let mut order = Order::new(
            uuid::Uuid::new_v4().to_string(),
            tenant_id,
            branch_id,
            order_type,
        );
        order.total_amount = money::order_total(&lines);
        order.lines = lines;
        order.token_number = token_number;
        order.customer = customer;

        self.store.insert_order(&order)?;
        tracing::info!(
            order_id = %order.order_id,
            tenant_id,
            branch_id,
            token = ?order.token_number,
            total = order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    // ========== Reads ==========

    /// Fetch a single order within the caller's scope
    pub fn get_order(&self, tenant_id: &str, branch_id: &str, order_id: &str) -> EngineResult<Order> {
        self.load_scoped(tenant_id, branch_id, order_id)
    }

    /// List a tenant's orders; filtering is read-only passthrough
    pub fn list_orders(&self, tenant_id: &str, filter: &OrderFilter) -> EngineResult<Vec<Order>> {
        Ok(self.store.list_orders(tenant_id, filter)?)
    }

    // ========== Status Transitions ==========

    /// Request a staff-driven forward transition
    ///
    /// Only single forward steps are accepted; the cancellation states are
    /// reachable exclusively through the cancellation operations. The
    /// write is validated against the persisted status immediately before
    /// commit; a stale snapshot loses with `Conflict` and should be
    /// retried by the caller.
    pub async fn request_transition(
        &self,
        tenant_id: &str,
        branch_id: &str,
        order_id: &str,
        target: OrderStatus,
    ) -> EngineResult<Order> {
        let order = self.load_scoped(tenant_id, branch_id, order_id)?;

        if !order.status.can_advance_to(target) {
            return Err(EngineError::invalid_transition(
                order_id,
                order.status,
                target.as_str(),
            ));
        }

        let expected_version = order.version;
        let mut updated = order;
        updated.status = target;
        if target == OrderStatus::Completed {
            updated.completed_at = Some(now_millis());
        }

        let stored = self.store.update_order(updated, expected_version)?;
        tracing::info!(
            order_id,
            tenant_id,
            status = stored.status.as_str(),
            "Order transitioned"
        );
        Ok(stored)
    }

    // ========== Cancellation Sub-protocol ==========

    /// Open a cancellation request and start the grace window
    ///
    /// The order parks in CANCELLATION_PENDING; unless staff accept the
    /// cancellation before the deadline, the order reverts to the status
    /// it holds now. Only one outstanding request per order.
    pub async fn request_cancellation(
        &self,
        tenant_id: &str,
        branch_id: &str,
        order_id: &str,
        requested_by: &str,
    ) -> EngineResult<Order> {
        let order = self.load_scoped(tenant_id, branch_id, order_id)?;

        if !order.status.can_request_cancellation() {
            return Err(EngineError::invalid_transition(
                order_id,
                order.status,
                OrderStatus::CancellationPending.as_str(),
            ));
        }

        let now = now_millis();
        let expires_at = now + self.config.grace_window_millis();
        let expected_version = order.version;
        let mut updated = order;
        updated.cancellation = Some(CancellationRequest {
            previous_status: updated.status,
            requested_by: requested_by.to_string(),
            requested_at: now,
            expires_at,
        });
        updated.status = OrderStatus::CancellationPending;

        let stored = self.store.update_order(updated, expected_version)?;
        // Arm only after the commit; a conflicting writer above means no
        // request exists and nothing must fire.
        self.timers.arm(order_id, now, expires_at);
        tracing::info!(
            order_id,
            tenant_id,
            requested_by,
            expires_at,
            "Cancellation requested"
        );
        Ok(stored)
    }

    /// Resolve an outstanding cancellation request
    ///
    /// `accept == true` ratifies the cancellation: the order terminates in
    /// CANCELLED. `accept == false` rejects it: the order reverts to the
    /// status it held before the request and the bookkeeping is cleared.
    /// Either way the timer is disarmed.
    pub async fn resolve_cancellation(
        &self,
        tenant_id: &str,
        branch_id: &str,
        order_id: &str,
        accept: bool,
    ) -> EngineResult<Order> {
        let order = self.load_scoped(tenant_id, branch_id, order_id)?;

        if !order.is_cancellation_pending() {
            return Err(EngineError::invalid_transition(
                order_id,
                order.status,
                if accept {
                    OrderStatus::Cancelled.as_str().to_string()
                } else {
                    "CANCELLATION_REJECT".to_string()
                },
            ));
        }

        let expected_version = order.version;
        let mut updated = order;
        if accept {
            updated.status = OrderStatus::Cancelled;
        } else {
            updated.revert_cancellation();
        }

        let stored = self.store.update_order(updated, expected_version)?;
        self.timers.disarm(order_id);
        tracing::info!(
            order_id,
            tenant_id,
            accepted = accept,
            status = stored.status.as_str(),
            "Cancellation resolved"
        );
        Ok(stored)
    }

    // ========== Helpers ==========

    /// Load an order and enforce the caller's tenant+branch scope
    ///
    /// A genuinely unknown id is NotFound; an order owned by another
    /// scope is Authorization, so callers (and tests) can tell the two
    /// apart.
    fn load_scoped(&self, tenant_id: &str, branch_id: &str, order_id: &str) -> EngineResult<Order> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| EngineError::NotFound(order_id.to_string()))?;
        if !order.belongs_to(tenant_id, branch_id) {
            tracing::warn!(
                order_id,
                tenant_id,
                branch_id,
                "Rejected cross-scope order access"
            );
            return Err(EngineError::Authorization {
                order_id: order_id.to_string(),
            });
        }
        Ok(order)
    }
}
