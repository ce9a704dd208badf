//! API error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl
//! is the single place where errors become status codes and the wire
//! error envelope, so the JSON shape stays uniform across routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ngopi_core::{ErrorEnvelope, ValidationError};

use crate::traits::StorageError;

/// Failure modes a request handler can surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query parameter or body field was rejected. Maps to 400 with
    /// the offending field named in `details`.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The addressed record does not exist. Maps to 404.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Missing or wrong admin credentials. Maps to 401.
    #[error("missing or invalid admin credentials")]
    Unauthorized,
    /// The data source failed. Maps to 503 or 500 depending on whether
    /// the failure looks transient.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, ErrorEnvelope::from(err)),
            Self::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorEnvelope::message(format!("{resource} not found")),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorEnvelope::message("missing or invalid admin credentials"),
            ),
            Self::Storage(StorageError::Unavailable(reason)) => {
                tracing::warn!(reason, "catalog unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorEnvelope::message("catalog temporarily unavailable"),
                )
            }
            Self::Storage(StorageError::Internal(err)) => {
                tracing::error!(error = %err, "unhandled storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope::message("internal error"),
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}
