use crate::catalog::CatalogError;
use crate::storage::StorageError;
use shared::order::OrderStatus;
use thiserror::Error;

/// Engine errors
///
/// Every variant carries enough context for the caller to render a
/// user-facing message: the order, its current status, and what was
/// attempted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input: unavailable item, non-positive quantity, empty cart
    #[error("Validation failed: {0}")]
    Validation(String),

    /// State machine rule violation
    #[error("Invalid transition for order {order_id}: {} -> {attempted}", .current.as_str())]
    InvalidTransition {
        order_id: String,
        current: OrderStatus,
        attempted: String,
    },

    /// Lost optimistic-concurrency race; benign, retry the operation
    #[error("Conflict on order {order_id}: concurrent update, retry")]
    Conflict { order_id: String },

    /// The order exists but belongs to another tenant/branch scope
    #[error("Order {order_id} is outside the caller's tenant/branch scope")]
    Authorization { order_id: String },

    #[error("Order not found: {0}")]
    NotFound(String),

    /// Infrastructure failure; retryable with backoff
    #[error("Transient storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Whether the caller should retry the same operation
    ///
    /// Conflicts are benign contention; storage failures are transient.
    /// Everything else is a logic or input fault and retrying is pointless.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict { .. } | EngineError::Storage(_))
    }

    pub(crate) fn invalid_transition(
        order_id: &str,
        current: OrderStatus,
        attempted: impl Into<String>,
    ) -> Self {
        EngineError::InvalidTransition {
            order_id: order_id.to_string(),
            current,
            attempted: attempted.into(),
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VersionConflict { order_id, .. } => EngineError::Conflict { order_id },
            StorageError::OrderNotFound(id) => EngineError::NotFound(id),
            other => EngineError::Storage(other.to_string()),
        }
    }
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        EngineError::Storage(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let conflict = StorageError::VersionConflict {
            order_id: "o-1".to_string(),
            expected: 1,
            found: 2,
        };
        let mapped = EngineError::from(conflict);
        assert!(matches!(&mapped, EngineError::Conflict { order_id } if order_id == "o-1"));
        assert!(mapped.is_retryable());

        let missing = EngineError::from(StorageError::OrderNotFound("o-2".to_string()));
        assert!(matches!(missing, EngineError::NotFound(_)));
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_invalid_transition_message_names_both_states() {
        let err = EngineError::invalid_transition("o-1", OrderStatus::Pending, "READY");
        let msg = err.to_string();
        assert!(msg.contains("o-1"));
        assert!(msg.contains("PENDING"));
        assert!(msg.contains("READY"));
    }
}
