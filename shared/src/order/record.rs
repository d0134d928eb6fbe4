//! The persisted order aggregate

use super::status::OrderStatus;
use super::types::{CancellationRequest, CustomerInfo, OrderLine, OrderType};
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// One order: line items, computed total, status, and token assignment
///
/// Every operation on an order is scoped to its owning tenant and branch;
/// callers from another scope must be rejected before any mutation.
/// The `version` field is the optimistic-concurrency guard: it is bumped
/// by the storage layer on every committed mutation, and a writer whose
/// expected version is stale loses the race.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (opaque, assigned at creation)
    pub order_id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Owning branch
    pub branch_id: String,
    /// Dine-in or takeaway
    pub order_type: OrderType,
    /// Line items, frozen once the order leaves PENDING
    pub lines: Vec<OrderLine>,
    /// Sum of `price * quantity` across lines
    pub total_amount: f64,
    /// Current state-machine status
    pub status: OrderStatus,
    /// Display token; None when the branch's token system is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_number: Option<u32>,
    /// Optional customer details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Completion timestamp, stamped on entering COMPLETED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Outstanding cancellation request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationRequest>,
    /// Last update timestamp (Unix millis)
    pub updated_at: i64,
    /// Optimistic-concurrency version, bumped on every committed write
    pub version: u64,
}

impl Order {
    /// Create a new order in PENDING with no lines
    pub fn new(
        order_id: impl Into<String>,
        tenant_id: impl Into<String>,
        branch_id: impl Into<String>,
        order_type: OrderType,
    ) -> Self {
        let now = now_millis();
        Self {
            order_id: order_id.into(),
            tenant_id: tenant_id.into(),
            branch_id: branch_id.into(),
            order_type,
            lines: Vec::new(),
            total_amount: 0.0,
            status: OrderStatus::Pending,
            token_number: None,
            customer: None,
            created_at: now,
            completed_at: None,
            cancellation: None,
            updated_at: now,
            version: 0,
        }
    }

    /// Check whether the order belongs to the given tenant+branch scope
    pub fn belongs_to(&self, tenant_id: &str, branch_id: &str) -> bool {
        self.tenant_id == tenant_id && self.branch_id == branch_id
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_cancellation_pending(&self) -> bool {
        self.status == OrderStatus::CancellationPending
    }

    /// Revert an outstanding cancellation request to the prior status
    ///
    /// Clears the cancellation bookkeeping. Returns false if no request
    /// was outstanding.
    pub fn revert_cancellation(&mut self) -> bool {
        match self.cancellation.take() {
            Some(request) => {
                self.status = request.previous_status;
                true
            }
            None => false,
        }
    }
}
