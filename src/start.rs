//! Entry helpers for the chat client and the assistance service binaries.

use std::process::ExitCode;

use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::client::terminal::run_repl;
use crate::client::{ChatSession, HttpTransport};
use crate::config::{ClientConfig, ServerConfig};
use crate::server::{self, AppState};

/// Run the assistance service (used by the `zero-hunger-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run_server() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Starting Zero Hunger Assistant v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        webhook = config.webhook_url.is_some(),
        origins = ?config.allowed_origins,
        "configuration loaded"
    );

    let state = match AppState::new(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(
        state,
        config.port,
        &config.allowed_origins,
        shutdown_signal(),
    )) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Run the terminal chat client (used by the `zero-hunger-chat` binary).
///
/// Logs go to stderr so the transcript on stdout stays readable.
#[must_use]
pub fn run_chat() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = chat() {
        tracing::error!("Chat client error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn chat() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    let transport = HttpTransport::new(&config).context("invalid service configuration")?;
    tracing::debug!(endpoint = %transport.endpoint(), "chat client configured");

    let rt = tokio::runtime::Runtime::new().context("failed to create runtime")?;
    rt.block_on(async {
        let session = ChatSession::new(transport);
        run_repl(&session, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
            .context("terminal I/O failed")
    })
}

/// Resolve when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
