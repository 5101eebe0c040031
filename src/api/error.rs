//! HTTP mapping of [`Error`].
//!
//! Every error leaves the API as JSON `{ "code": ..., "message": ... }`.
//! Internal failures are logged here and reported without detail.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl Error {
    /// Status code and stable machine-readable code of the error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_failed"),
            Self::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, "invalid_amount"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            Self::InsufficientStock { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock"),
            Self::InsufficientPoints { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_points")
            }
            Self::OrderLocked { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "order_locked"),
            Self::CouponUnavailable { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "coupon_unavailable")
            }
            Self::InvalidTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_transition")
            }
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Self::Config { .. } | Self::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::validation("x").status_and_code().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Unauthorized.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::not_found("Order", 1).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::OrderLocked {
                order_id: 1,
                reason: "paid".to_string()
            }
            .status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "order_locked")
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string()))
                .status_and_code()
                .0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = Error::Database(sea_orm::DbErr::Custom("secret".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = String::from_utf8_lossy(&bytes);
        assert!(body.contains("database_error"));
        assert!(!body.contains("secret"));
    }
}
