//! Request/response transport to the assistance service.

use async_trait::async_trait;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::ids::SessionId;
use crate::protocol::{ChatRequest, ChatResponse};

use super::error::TransportError;

/// Outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReply {
    /// Assistant reply text.
    pub reply: String,
    /// Session id returned by the service, if any.
    pub session_id: Option<SessionId>,
}

/// One request/response round trip with the assistance service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` within `session_id` and wait for the reply.
    async fn exchange(
        &self,
        message: &str,
        session_id: Option<&SessionId>,
    ) -> Result<ExchangeReply, TransportError>;
}

/// HTTP transport posting JSON to `{base_url}/chat`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for the configured service.
    ///
    /// # Errors
    /// Returns an error if the service URL is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(reqwest::Client::new(), config.chat_endpoint()?))
    }

    /// Build a transport around an existing client and endpoint.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// The `/chat` endpoint this transport posts to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn exchange(
        &self,
        message: &str,
        session_id: Option<&SessionId>,
    ) -> Result<ExchangeReply, TransportError> {
        let request = ChatRequest {
            message: message.to_string(),
            session_id: session_id.map(|id| id.as_str().to_string()),
        };

        tracing::debug!(endpoint = %self.endpoint, has_session = session_id.is_some(), "posting chat message");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&body)?;

        Ok(ExchangeReply {
            reply: reply.response,
            session_id: reply.session_id.and_then(SessionId::from_token),
        })
    }
}
