//! HTTP response envelopes shared by server handlers and client decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::page::{PageResult, Pagination};

/// Body of every list endpoint: `{ data, pagination }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<PageResult<T>> for ListEnvelope<T> {
    fn from(result: PageResult<T>) -> Self {
        Self {
            data: result.rows,
            pagination: result.pagination,
        }
    }
}

/// Body of every non-2xx response: `{ error, details? }`.
///
/// `details` carries field-level messages for validation failures so a
/// form can render them next to the offending control; other failure
/// classes send only the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorEnvelope {
    /// Envelope with a bare message and no field detail.
    #[must_use]
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Envelope carrying one field-level detail entry.
    #[must_use]
    pub fn field(error: impl Into<String>, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(BTreeMap::from([(field.into(), detail.into())])),
        }
    }
}

impl From<&ValidationError> for ErrorEnvelope {
    fn from(err: &ValidationError) -> Self {
        Self::field("validation failed", err.field.clone(), err.message.clone())
    }
}
