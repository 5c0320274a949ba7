//! Credentials for the agent service

use anyhow::{Context, Result};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

/// Environment variable holding a project API key
pub const API_KEY_ENV: &str = "AZURE_AI_API_KEY";

/// Environment variable holding a ready-made bearer token
pub const TOKEN_ENV: &str = "AZURE_AI_TOKEN";

/// Resource the Azure CLI is asked to mint tokens for
const TOKEN_RESOURCE: &str = "https://ai.azure.com";

/// Authentication credentials
#[derive(Clone)]
pub enum Credentials {
    ApiKey(String),
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey(..)"),
            Credentials::Bearer(_) => f.write_str("Credentials::Bearer(..)"),
        }
    }
}

impl Credentials {
    /// Resolve credentials from the environment, falling back to the Azure CLI
    pub async fn resolve() -> Result<Self> {
        if let Some(creds) = Self::from_lookup(|key| std::env::var(key).ok())? {
            return Ok(creds);
        }
        tracing::debug!("No credentials in environment, asking the Azure CLI for a token");
        Self::from_azure_cli().await
    }

    /// Pick credentials from a variable lookup; `None` when nothing is set
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        if let Some(key) = lookup(API_KEY_ENV) {
            let creds = Credentials::ApiKey(key.trim().to_string());
            creds.validate()?;
            return Ok(Some(creds));
        }
        if let Some(token) = lookup(TOKEN_ENV) {
            let creds = Credentials::Bearer(token.trim().to_string());
            creds.validate()?;
            return Ok(Some(creds));
        }
        Ok(None)
    }

    /// Mint a bearer token with `az account get-access-token`
    pub async fn from_azure_cli() -> Result<Self> {
        let output = tokio::process::Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                TOKEN_RESOURCE,
                "--query",
                "accessToken",
                "-o",
                "tsv",
            ])
            .output()
            .await
            .with_context(|| {
                format!(
                    "No credentials found: set {} or {}, or install the Azure CLI and run 'az login'",
                    API_KEY_ENV, TOKEN_ENV
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Azure CLI token request failed: {}", stderr.trim());
        }

        let creds = Credentials::Bearer(String::from_utf8_lossy(&output.stdout).trim().to_string());
        creds.validate()?;
        Ok(creds)
    }

    /// Reject empty secrets before they reach a request
    pub fn validate(&self) -> Result<()> {
        match self {
            Credentials::ApiKey(key) if key.is_empty() => anyhow::bail!("API key is empty"),
            Credentials::Bearer(token) if token.is_empty() => {
                anyhow::bail!("Bearer token is empty")
            }
            _ => Ok(()),
        }
    }

    /// Header carrying these credentials
    pub fn header(&self) -> Result<(HeaderName, HeaderValue)> {
        match self {
            Credentials::ApiKey(key) => Ok((
                HeaderName::from_static("api-key"),
                HeaderValue::from_str(key).context("Invalid API key")?,
            )),
            Credentials::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid bearer token")?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
        }
    }
}
