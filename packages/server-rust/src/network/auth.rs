//! Bearer-token guard for catalog mutations.
//!
//! Listing and lookup routes are public; anything that writes to the
//! catalog takes an [`AdminAccess`] argument and therefore only runs
//! when the request carried the configured admin token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use super::handlers::{ApiError, AppState};

/// Proof that the request presented the admin bearer token.
///
/// When no token is configured the extractor rejects everything, which
/// turns all mutating routes off without touching the router.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_token.as_deref() else {
            return Err(ApiError::Unauthorized);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match provided {
            Some(token) if token_matches(token, expected) => Ok(Self),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Constant-time token comparison.
fn token_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
