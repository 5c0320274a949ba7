//! Shared start-up for the command-line programs

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::Credentials;
use crate::config::{Config, LOG_ENV};
use crate::service::AgentsClient;

/// Filter used when MCP_AGENT_LOG is unset
const DEFAULT_LOG_FILTER: &str = "info,mcp_agent=debug";

/// Load `.env` and send logs to a file, keeping stdout for the conversation.
///
/// Must run before argument parsing so `.env` values feed clap's env fallbacks.
pub fn init(program: &str) -> Result<PathBuf> {
    // Optional; never overrides variables that are already set
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: ignoring unreadable .env file: {}", e);
        }
    }

    let log_path = std::env::temp_dir().join(format!("{}.log", program));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(log_file).with_ansi(false))
        .init();

    tracing::info!("{} {} starting", program, env!("CARGO_PKG_VERSION"));
    Ok(log_path)
}

/// Build an HTTP client for the configured project endpoint
pub async fn connect(config: &Config) -> Result<AgentsClient> {
    // Configuration problems surface before any credential lookup or remote call
    let endpoint = config.endpoint()?;
    let credentials = Credentials::resolve().await?;
    tracing::info!("Using project endpoint {}", endpoint);

    AgentsClient::new(&endpoint, credentials, config.client_options())
        .context("Failed to create agent service client")
}
