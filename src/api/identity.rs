//! Caller identity.
//!
//! Sign-in happens at the identity provider in front of this service. The
//! gateway forwards the authenticated subject in a header (by default
//! `x-user-id`) and this extractor trusts it.

use super::AppState;
use crate::errors::Error;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = state.config.identity.user_header.as_str();
        let user_id = parts
            .headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user_id {
            Some(user_id) => Ok(Self {
                user_id: user_id.to_string(),
            }),
            None => {
                tracing::warn!(uri = %parts.uri, "Request without identity header");
                Err(Error::Unauthorized)
            }
        }
    }
}
