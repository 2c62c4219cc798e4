//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::flow::{ConversationFlow, ConversationStore, WebhookClient};

/// Shared application state.
pub struct AppState {
    /// Intake conversation engine.
    pub flow: ConversationFlow,
}

impl AppState {
    /// Create the state from the service configuration.
    ///
    /// # Errors
    /// Returns an error if the webhook client or the extraction patterns cannot be built.
    pub fn new(config: &ServerConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let webhook = WebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)
            .map_err(|e| format!("Failed to create webhook client: {e}"))?;

        let flow = ConversationFlow::new(
            ConversationStore::with_max_sessions(config.max_sessions),
            Arc::new(webhook),
        )
        .map_err(|e| format!("Failed to compile extraction patterns: {e}"))?;

        Ok(Self::with_flow(flow))
    }

    /// Wrap an existing flow.
    #[must_use]
    pub fn with_flow(flow: ConversationFlow) -> Arc<Self> {
        Arc::new(Self { flow })
    }
}
