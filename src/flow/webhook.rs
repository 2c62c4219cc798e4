//! Referral delivery to the partner webhook.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::program::Program;

/// Beneficiary details sent once a conversation has collected them all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    /// Beneficiary name.
    pub beneficiary_name: String,
    /// Beneficiary age in years.
    pub beneficiary_age: u32,
    /// Description of the help needed.
    pub assistance_request: String,
    /// Program the beneficiary is referred to.
    pub program: Program,
}

/// How a referral was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The webhook accepted the referral.
    Sent,
    /// No webhook is configured; the referral was only logged.
    Skipped,
}

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request could not be built or sent.
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook answered with something other than 200.
    #[error("webhook returned HTTP {status}: {body}")]
    Rejected {
        /// Status code received.
        status: u16,
        /// Response body, for the logs.
        body: String,
    },
}

/// Destination for completed referrals.
#[async_trait]
pub trait ReferralNotifier: Send + Sync {
    /// Deliver one referral.
    async fn notify(&self, referral: &Referral) -> Result<Delivery, WebhookError>;
}

/// Posts referrals as JSON to a configured URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    /// Create a webhook client.
    ///
    /// With `url` set to `None` referrals are logged instead of sent.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, WebhookError> {
        if url.is_none() {
            tracing::warn!("WEBHOOK_URL not set; referrals will be logged, not sent");
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// Whether a webhook URL is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl ReferralNotifier for WebhookClient {
    async fn notify(&self, referral: &Referral) -> Result<Delivery, WebhookError> {
        let Some(url) = &self.url else {
            tracing::info!(
                beneficiary_name = %referral.beneficiary_name,
                beneficiary_age = referral.beneficiary_age,
                assistance_request = %referral.assistance_request,
                program = referral.program.as_str(),
                "webhook disabled, referral not sent"
            );
            return Ok(Delivery::Skipped);
        };

        let response = self.client.post(url).json(referral).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(beneficiary_name = %referral.beneficiary_name, "referral webhook sent");
        Ok(Delivery::Sent)
    }
}
