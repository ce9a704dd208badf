//! Client-side error taxonomy.

use ngopi_core::envelope::ErrorEnvelope;

/// Failure of one client operation, distinguishable by cause.
///
/// `Validation` and `NotFound` carry the server's error envelope content
/// so a form can render field-level messages; `Api` covers every other
/// non-2xx status; `Transport` and `Decode` never reached a usable
/// response at all.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the request as invalid (HTTP 400).
    #[error("{}", .0.error)]
    Validation(ErrorEnvelope),

    /// The requested resource does not exist (HTTP 404).
    #[error("{0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("server returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never completed (connect, timeout, TLS).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape.
    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Classifies a non-2xx status and its decoded envelope.
    #[must_use]
    pub fn from_status(status: u16, envelope: ErrorEnvelope) -> Self {
        match status {
            400 => Self::Validation(envelope),
            404 => Self::NotFound(envelope.error),
            _ => Self::Api {
                status,
                message: envelope.error,
            },
        }
    }

    /// The validation envelope, when this is a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ErrorEnvelope> {
        match self {
            Self::Validation(envelope) => Some(envelope),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_distinguishable() {
        let validation = ClientError::from_status(
            400,
            ErrorEnvelope::field("validation failed", "page", "`0` is not a positive integer"),
        );
        assert!(validation.validation().is_some());

        let not_found = ClientError::from_status(404, ErrorEnvelope::message("cafe not found"));
        assert!(matches!(not_found, ClientError::NotFound(ref m) if m == "cafe not found"));

        let api = ClientError::from_status(503, ErrorEnvelope::message("catalog unavailable"));
        assert!(matches!(api, ClientError::Api { status: 503, .. }));
    }

    #[test]
    fn validation_details_survive_the_mapping() {
        let err = ClientError::from_status(
            400,
            ErrorEnvelope::field("validation failed", "limit", "`0` is outside 1..=100"),
        );
        let details = err.validation().unwrap().details.as_ref().unwrap();
        assert_eq!(details["limit"], "`0` is outside 1..=100");
    }

    #[test]
    fn display_is_a_plain_message() {
        let err = ClientError::NotFound("cafe not found".into());
        assert_eq!(err.to_string(), "cafe not found");

        let err = ClientError::Api {
            status: 500,
            message: "internal error".into(),
        };
        assert_eq!(err.to_string(), "server returned status 500: internal error");
    }
}
