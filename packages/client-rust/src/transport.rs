//! HTTP transport for list fetches.

use std::time::Duration;

use async_trait::async_trait;
use ngopi_core::envelope::ErrorEnvelope;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Issues list fetches against a resource endpoint.
///
/// Returns raw JSON; typed decoding happens a layer up so the transport
/// can be mocked without knowing row types. Implementations map non-2xx
/// statuses to [`ClientError`] variants and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `{endpoint}?{query}` and returns the decoded JSON body.
    async fn get_list(&self, endpoint: &str, query: &str) -> Result<Value, ClientError>;
}

/// [`Transport`] over HTTP with a per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Transport rooted at `base_url` (scheme and authority, no trailing
    /// slash needed: `https://api.ngopi.example.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Like [`HttpTransport::new`] with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_list(&self, endpoint: &str, query: &str) -> Result<Value, ClientError> {
        let url = if query.is_empty() {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}{endpoint}?{query}", self.base_url)
        };
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_body(status, &body)
    }
}

/// Maps a response to its JSON body or a typed error by status class.
fn decode_body(status: StatusCode, body: &[u8]) -> Result<Value, ClientError> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body)?);
    }
    // Non-2xx bodies should be error envelopes; tolerate anything else
    // (a proxy's HTML error page) by falling back to the bare status.
    let envelope = serde_json::from_slice::<ErrorEnvelope>(body)
        .unwrap_or_else(|_| ErrorEnvelope::message(format!("status {}", status.as_u16())));
    Err(ClientError::from_status(status.as_u16(), envelope))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn success_bodies_decode_to_json() {
        let value = decode_body(status(200), br#"{"data": [], "pagination": {}}"#).unwrap();
        assert!(value["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn undecodable_success_bodies_are_decode_errors() {
        let err = decode_body(status(200), b"<html>hi</html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn bad_request_maps_to_validation_with_details() {
        let body = br#"{"error": "validation failed", "details": {"page": "`0` is not a positive integer"}}"#;
        let err = decode_body(status(400), body).unwrap_err();
        let envelope = err.validation().unwrap();
        assert_eq!(envelope.error, "validation failed");
        assert_eq!(
            envelope.details.as_ref().unwrap()["page"],
            "`0` is not a positive integer"
        );
    }

    #[test]
    fn not_found_carries_the_message() {
        let err = decode_body(status(404), br#"{"error": "cafe not found"}"#).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "cafe not found"));
    }

    #[test]
    fn other_statuses_map_to_api_errors() {
        let err = decode_body(status(503), br#"{"error": "catalog temporarily unavailable"}"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 503, .. }));
    }

    #[test]
    fn non_json_error_bodies_fall_back_to_the_status() {
        let err = decode_body(status(502), b"Bad Gateway").unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "status 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let transport = HttpTransport::new("https://api.ngopi.example.com///").unwrap();
        assert_eq!(transport.base_url, "https://api.ngopi.example.com");
    }
}
