//! Error responses of the HTTP API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Request-level failures, rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body was not a valid chat request.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// The message was empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(rejection) => rejection.status(),
            Self::EmptyMessage => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "chat request refused");
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
