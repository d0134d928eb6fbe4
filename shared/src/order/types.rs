//! Cart input, line snapshots, and cancellation bookkeeping

use super::status::OrderStatus;
use serde::{Deserialize, Serialize};

/// Order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
}

/// Cart line input - for order creation (price is looked up, never supplied)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineInput {
    /// Catalogue item ID
    pub item_id: String,
    /// Quantity (must be >= 1)
    pub quantity: i32,
}

/// Order line - a catalogue item with its price frozen at creation time
///
/// The price is a snapshot of the catalogue price at order-creation time
/// and is never re-read afterwards, so later catalogue edits cannot
/// corrupt historical orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Catalogue item ID
    pub item_id: String,
    /// Quantity
    pub quantity: i32,
    /// Unit price snapshot (non-negative)
    pub price: f64,
}

/// Optional customer details attached to an order
///
/// The device identifier is an anti-abuse hint only; the engine does not
/// deduplicate on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CustomerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Bookkeeping for an outstanding cancellation request
///
/// Present only while the order is in `CANCELLATION_PENDING`; cleared when
/// the request is rejected or expires. `requested_at` doubles as the guard
/// the timer checks before auto-reverting, so a disarm/rearm race can
/// never revert the wrong request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancellationRequest {
    /// Status the order held when cancellation was requested
    pub previous_status: OrderStatus,
    /// Who asked for the cancellation (customer or staff label)
    pub requested_by: String,
    /// Request timestamp (Unix millis)
    pub requested_at: i64,
    /// Deadline for staff resolution (Unix millis)
    pub expires_at: i64,
}
