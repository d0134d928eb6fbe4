//! Order status and transition rules
//!
//! The forward path is strictly monotonic, one step at a time:
//! `PENDING → PREPARING → READY → COMPLETED`. Cancellation is a
//! sub-protocol: any non-terminal status without an outstanding request
//! may enter `CANCELLATION_PENDING`, which resolves to `CANCELLED`
//! (accepted) or reverts to the prior status (rejected or expired).

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Completed,
    CancellationPending,
    Cancelled,
}

impl OrderStatus {
    /// Wire/display name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::CancellationPending => "CANCELLATION_PENDING",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The next staff-driven forward step, if any
    pub fn next_forward(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Whether a staff transition request to `target` is legal
    ///
    /// Only single forward steps qualify. Skipping a step, moving out of a
    /// terminal state, or targeting the cancellation states through this
    /// path is rejected.
    pub fn can_advance_to(&self, target: OrderStatus) -> bool {
        self.next_forward() == Some(target)
    }

    /// Whether a cancellation request may be opened from this status
    ///
    /// One outstanding request per order: an order already in
    /// `CANCELLATION_PENDING` cannot be requested again.
    pub fn can_request_cancellation(&self) -> bool {
        !self.is_terminal() && *self != OrderStatus::CancellationPending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        assert_eq!(
            OrderStatus::Pending.next_forward(),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(
            OrderStatus::Preparing.next_forward(),
            Some(OrderStatus::Ready)
        );
        assert_eq!(
            OrderStatus::Ready.next_forward(),
            Some(OrderStatus::Completed)
        );
        assert_eq!(OrderStatus::Completed.next_forward(), None);
        assert_eq!(OrderStatus::Cancelled.next_forward(), None);
        assert_eq!(OrderStatus::CancellationPending.next_forward(), None);
    }

    #[test]
    fn test_skipping_a_step_is_rejected() {
        assert!(!OrderStatus::Pending.can_advance_to(OrderStatus::Ready));
        assert!(!OrderStatus::Pending.can_advance_to(OrderStatus::Completed));
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Preparing));
    }

    #[test]
    fn test_cancellation_states_unreachable_via_advance() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ] {
            assert!(!status.can_advance_to(OrderStatus::CancellationPending));
            assert!(!status.can_advance_to(OrderStatus::Cancelled));
        }
    }

    #[test]
    fn test_cancellation_eligibility() {
        assert!(OrderStatus::Pending.can_request_cancellation());
        assert!(OrderStatus::Preparing.can_request_cancellation());
        assert!(OrderStatus::Ready.can_request_cancellation());
        assert!(!OrderStatus::Completed.can_request_cancellation());
        assert!(!OrderStatus::Cancelled.can_request_cancellation());
        assert!(!OrderStatus::CancellationPending.can_request_cancellation());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::CancellationPending,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
