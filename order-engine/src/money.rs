//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary fields are stored and serialized as `f64`, but every
//! computation goes through `Decimal` so line totals and order totals are
//! exact to the cent.

use crate::engine::EngineError;
use rust_decimal::prelude::*;
use shared::order::{CartLineInput, OrderLine};

/// Rounding for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal, rounded to cents
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(DECIMAL_PLACES)
}

/// Convert Decimal back to f64, rounded to cents
pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(DECIMAL_PLACES).to_f64().unwrap_or(0.0)
}

/// Exact line total: price * quantity
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Exact order total across lines, returned in the storage representation
pub fn order_total(lines: &[OrderLine]) -> f64 {
    let total: Decimal = lines
        .iter()
        .map(|line| line_total(line.price, line.quantity))
        .sum();
    to_f64(total)
}

/// Validate a cart line before the catalogue is consulted
///
/// `line_index` is included so the caller gets an error naming the
/// offending line.
pub fn validate_cart_line(line: &CartLineInput, line_index: usize) -> Result<(), EngineError> {
    if line.item_id.trim().is_empty() {
        return Err(EngineError::Validation(format!(
            "line {}: item id must not be empty",
            line_index
        )));
    }
    if line.quantity < 1 {
        return Err(EngineError::Validation(format!(
            "line {} ({}): quantity must be >= 1, got {}",
            line_index, line.item_id, line.quantity
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(EngineError::Validation(format!(
            "line {} ({}): quantity exceeds maximum allowed ({}), got {}",
            line_index, line.item_id, MAX_QUANTITY, line.quantity
        )));
    }
    Ok(())
}

/// Validate a snapshotted catalogue price before it enters an order
pub fn validate_price(price: f64, item_id: &str) -> Result<(), EngineError> {
    if !price.is_finite() {
        return Err(EngineError::Validation(format!(
            "item {}: price must be a finite number, got {}",
            item_id, price
        )));
    }
    if price < 0.0 {
        return Err(EngineError::Validation(format!(
            "item {}: price must be non-negative, got {}",
            item_id, price
        )));
    }
    if price > MAX_PRICE {
        return Err(EngineError::Validation(format!(
            "item {}: price exceeds maximum allowed ({}), got {}",
            item_id, MAX_PRICE, price
        )));
    }
    Ok(())
}
