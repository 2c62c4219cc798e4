//! JSON bodies of the `/chat` exchange, shared by the client and the service.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message, already trimmed by the client.
    pub message: String,
    /// Session token; serialized as `null` before the service assigned one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Successful reply to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub response: String,
    /// Session token the conversation belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `"healthy"` while the service answers.
    pub status: String,
}
