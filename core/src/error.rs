//! Error types for the REST client core.
//!
//! # Design
//! Only two kinds of failure ever reach application code as `Err`: building
//! a request from an unusable URL, and converting a representation payload
//! (malformed JSON or XML). Transport failures are folded into a terminal
//! `Response` carrying a connector-error status, so `TransportError` is
//! consumed by the adapter rather than returned to callers. `HeaderError`
//! never escapes the header mapper; each malformed header is logged and
//! skipped.

use thiserror::Error;

use crate::status::Status;

/// Failure reported by a transport binding instead of a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established (refused, unknown host).
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connection was established but the exchange did not complete.
    #[error("communication failed: {0}")]
    Communication(String),

    /// The binding itself failed before or after the exchange.
    #[error("internal connector error: {0}")]
    Internal(String),
}

impl TransportError {
    /// The connector-error status this failure is reported with.
    pub fn status(&self) -> Status {
        let base = match self {
            TransportError::Connection(_) => Status::CONNECTOR_ERROR_CONNECTION,
            TransportError::Communication(_) => Status::CONNECTOR_ERROR_COMMUNICATION,
            TransportError::Internal(_) => Status::CONNECTOR_ERROR_INTERNAL,
        };
        base.with_description(self.to_string())
    }
}

/// Lazy conversion of a representation payload failed.
#[derive(Debug, Error)]
pub enum RepresentationError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(String),

    /// The representation was released and no longer holds its content.
    #[error("representation content is not available")]
    Unavailable,
}

/// A single header value could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("invalid date: {0}")]
    Date(String),

    #[error("invalid number: {0}")]
    Number(String),

    #[error("invalid content disposition: {0}")]
    Disposition(String),

    #[error("invalid content range: {0}")]
    Range(String),

    #[error("invalid digest: {0}")]
    Digest(String),

    #[error("invalid entity tag: {0}")]
    Tag(String),

    #[error("invalid location: {0}")]
    Location(String),
}

/// Reason phrases end up on a status line, so CR and LF are rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("reason phrase of the status must not contain CR or LF characters")]
pub struct InvalidReasonPhrase;

/// Errors returned while setting up a client call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid resource reference: {0}")]
    InvalidReference(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Representation(#[from] RepresentationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_to_connector_statuses() {
        let refused = TransportError::Connection("refused".into()).status();
        assert_eq!(refused.code(), 1000);
        assert_eq!(
            refused.description(),
            Some("connection failed: refused")
        );

        assert_eq!(TransportError::Communication("eof".into()).status().code(), 1001);
        assert_eq!(TransportError::Internal("bug".into()).status().code(), 1002);
    }

    #[test]
    fn json_errors_convert_into_representation_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RepresentationError = err.into();
        assert!(matches!(err, RepresentationError::Json(_)));
    }
}
