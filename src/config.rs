//! Environment-driven configuration for the chat client and the assistance service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::flow::store::DEFAULT_MAX_SESSIONS;

/// Environment variable holding the service base URL for the chat client.
pub const API_URL_ENV: &str = "ZERO_HUNGER_API_URL";
/// Environment variable holding the service listening port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable holding the referral webhook URL.
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";
/// Environment variable holding the webhook timeout, in seconds.
pub const WEBHOOK_TIMEOUT_ENV: &str = "ZERO_HUNGER_WEBHOOK_TIMEOUT_SECS";
/// Environment variable holding the comma-separated CORS origins.
pub const CORS_ORIGINS_ENV: &str = "ZERO_HUNGER_CORS_ORIGINS";
/// Environment variable capping the number of conversations kept in memory.
pub const MAX_SESSIONS_ENV: &str = "ZERO_HUNGER_MAX_SESSIONS";

/// Default service base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default service port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default webhook timeout.
const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The service base URL could not be parsed.
    #[error("invalid service url {url:?}: {source}")]
    InvalidUrl {
        /// Offending value.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The URL uses a scheme other than http or https.
    #[error("unsupported url scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
}

/// Chat client configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the assistance service, without the `/chat` suffix.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = non_blank(lookup(API_URL_ENV)) {
            config.api_url = url;
        }
        config
    }

    /// Set the service base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Build the `/chat` endpoint URL.
    ///
    /// # Errors
    /// Returns an error if the base URL is not a valid http(s) URL.
    pub fn chat_endpoint(&self) -> Result<Url, ConfigError> {
        endpoint(&self.api_url, "chat")
    }
}

/// Assistance service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Referral webhook URL; `None` logs referrals instead of sending them.
    pub webhook_url: Option<String>,
    /// Webhook request timeout.
    #[serde(with = "duration_secs")]
    pub webhook_timeout: Duration,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Conversations kept in memory before the oldest is evicted.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            webhook_url: None,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
            allowed_origins: default_origins(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        let port = lookup(PORT_ENV)
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(default.port);

        let webhook_timeout = lookup(WEBHOOK_TIMEOUT_ENV)
            .and_then(|s| s.trim().parse().ok())
            .map_or(default.webhook_timeout, Duration::from_secs);

        let allowed_origins = non_blank(lookup(CORS_ORIGINS_ENV)).map_or(
            default.allowed_origins,
            |list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            },
        );

        let max_sessions = lookup(MAX_SESSIONS_ENV)
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(default.max_sessions);

        Self {
            port,
            webhook_url: non_blank(lookup(WEBHOOK_URL_ENV)),
            webhook_timeout,
            allowed_origins,
            max_sessions,
        }
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the referral webhook URL.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set the webhook timeout.
    #[must_use]
    pub const fn with_webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }

    /// Set the in-memory conversation cap.
    #[must_use]
    pub const fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Join `path` onto `base` by plain concatenation, so that a base with a
/// path prefix (`https://host/api`) keeps it.
fn endpoint(base: &str, path: &str) -> Result<Url, ConfigError> {
    let raw = format!("{}/{path}", base.trim().trim_end_matches('/'));
    let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
        url: base.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// Serde module for `Duration` as whole seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.chat_endpoint().unwrap().as_str(),
            "http://localhost:8000/chat"
        );
    }

    #[test]
    fn test_client_endpoint_keeps_path_prefix() {
        let config = ClientConfig::default().with_api_url("https://example.org/api/");
        assert_eq!(
            config.chat_endpoint().unwrap().as_str(),
            "https://example.org/api/chat"
        );
    }

    #[test]
    fn test_client_env_override() {
        let config = ClientConfig::from_lookup(lookup_from(&[(API_URL_ENV, " http://10.0.0.2:9000 ")]));
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
    }

    #[test]
    fn test_client_rejects_bad_urls() {
        let config = ClientConfig::default().with_api_url("not a url");
        assert!(matches!(config.chat_endpoint(), Err(ConfigError::InvalidUrl { .. })));

        let config = ClientConfig::default().with_api_url("ftp://example.org");
        assert!(matches!(config.chat_endpoint(), Err(ConfigError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.webhook_url.is_none());
        assert_eq!(config.webhook_timeout, Duration::from_secs(10));
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
    }

    #[test]
    fn test_server_env_override() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (PORT_ENV, "9100"),
            (WEBHOOK_URL_ENV, "https://hooks.example.org/referral"),
            (WEBHOOK_TIMEOUT_ENV, "3"),
            (CORS_ORIGINS_ENV, "https://a.example, ,https://b.example"),
            (MAX_SESSIONS_ENV, "250"),
        ]));
        assert_eq!(config.max_sessions, 250);
        assert_eq!(config.port, 9100);
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.example.org/referral")
        );
        assert_eq!(config.webhook_timeout, Duration::from_secs(3));
        assert_eq!(config.allowed_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_server_bad_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (PORT_ENV, "eighty"),
            (WEBHOOK_URL_ENV, "   "),
            (WEBHOOK_TIMEOUT_ENV, "-1"),
            (MAX_SESSIONS_ENV, "0"),
        ]));
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.webhook_url.is_none());
        assert_eq!(config.webhook_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_server_builder() {
        let config = ServerConfig::default()
            .with_port(0)
            .with_webhook_url("http://127.0.0.1:1/hook")
            .with_webhook_timeout(Duration::from_secs(1))
            .with_max_sessions(3);
        assert_eq!(config.max_sessions, 3);
        assert_eq!(config.port, 0);
        assert!(config.webhook_url.is_some());
        assert_eq!(config.webhook_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_server_config_serde() {
        let json = serde_json::to_value(ServerConfig::default()).unwrap();
        assert_eq!(json["webhook_timeout"], 10);
    }
}
