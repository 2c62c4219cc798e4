//! Error type for the chat transport.

use thiserror::Error;

/// Failure of one exchange with the assistance service.
///
/// Callers treat every variant the same way; the distinction only feeds logs.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The body did not match the reply contract.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedReply(value.to_string())
    }
}
