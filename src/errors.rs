//! Unified error type for the point-of-sale backend.
//!
//! Business rules, lookups, and database failures all surface as [`Error`].
//! The HTTP layer maps each variant onto a status code in `api::error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {permission}")]
    Forbidden { permission: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Insufficient stock for '{item}': available {available}, required {required}")]
    InsufficientStock {
        item: String,
        available: f64,
        required: f64,
    },

    #[error("Insufficient loyalty points: available {available}, required {required}")]
    InsufficientPoints { available: i64, required: i64 },

    #[error("Order {order_id} is locked: {reason}")]
    OrderLocked { order_id: i64, reason: String },

    #[error("Coupon '{code}' cannot be used: {reason}")]
    CouponUnavailable { code: String, reason: String },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
