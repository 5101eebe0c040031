//! Core business logic - framework-agnostic restaurant operations.
//!
//! Every function takes a database handle and returns [`crate::errors::Result`].
//! Helpers that must join a caller's database transaction are generic over
//! `ConnectionTrait` so they accept either a connection or a transaction.

pub mod access;
pub mod business_hours;
pub mod campaign;
pub mod employee;
pub mod expense;
pub mod inventory;
pub mod kds;
pub mod loyalty;
pub mod menu;
pub mod order;
pub mod report;
pub mod reservation;
pub mod restaurant;
pub mod table;
pub mod temp_order;

use crate::errors::{Error, Result};

/// Rounds a currency amount to cents.
#[must_use]
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Stock quantities are kept on a grid of one millionth of a unit.
const QUANTITY_SCALE: f64 = 1_000_000.0;

/// Rounds a stock quantity to the millionth so sums of recipe portions
/// land exactly on the stock they were cut from.
#[must_use]
pub fn round_quantity(quantity: f64) -> f64 {
    (quantity * QUANTITY_SCALE).round() / QUANTITY_SCALE
}

/// Rejects NaN, infinite, and negative amounts.
pub(crate) fn ensure_non_negative(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Rejects NaN, infinite, zero, and negative amounts.
pub(crate) fn ensure_positive(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Trims a required text field, rejecting blank input.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(10.005_1), 10.01);
        assert_eq!(round_currency(3.333_333), 3.33);
        assert_eq!(round_currency(0.0), 0.0);
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(0.3 - 0.1 - 0.1), 0.1);
        assert_eq!(round_quantity(0.1 * 3.0), 0.3);
        assert_eq!(round_quantity(1.234_567_89), 1.234_568);
    }

    #[test]
    fn test_amount_guards() {
        assert!(ensure_non_negative(0.0).is_ok());
        assert!(ensure_non_negative(-0.01).is_err());
        assert!(ensure_non_negative(f64::NAN).is_err());
        assert!(ensure_positive(0.0).is_err());
        assert!(ensure_positive(f64::INFINITY).is_err());
        assert!(ensure_positive(12.5).is_ok());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Paneer Tikka ", "name").ok(), Some("Paneer Tikka".to_string()));
        assert!(matches!(required_text("   ", "name"), Err(Error::Validation { .. })));
    }
}
