//! Configuration loading and validation
//!
//! Values are layered: command-line flag, then environment (clap reads the
//! `env` fallbacks, and `.env` is loaded beforehand), then the optional
//! `config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::approval::ApprovalConfig;
use crate::mcp::{McpServer, DEFAULT_MCP_LABEL, DEFAULT_MCP_URL};
use crate::registry::{AgentRegistry, REGISTRY_FILE};
use crate::service::{ClientOptions, DEFAULT_API_VERSION};

/// Project endpoint of the agent service (required)
pub const ENDPOINT_ENV: &str = "PROJECT_ENDPOINT";

/// Model deployment used when `--model` is absent
pub const MODEL_ENV: &str = "MODEL_DEPLOYMENT_NAME";

/// MCP server URL used when `--mcp-url` is absent
pub const MCP_URL_ENV: &str = "MCP_SERVER_URL";

/// MCP server label used when `--mcp-label` is absent
pub const MCP_LABEL_ENV: &str = "MCP_SERVER_LABEL";

/// Tracing filter for the log file
pub const LOG_ENV: &str = "MCP_AGENT_LOG";

/// Instructions given to every provisioned agent
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful agent that can use the available tools to answer questions and perform tasks";

/// Configuration problems detected before any remote call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Model deployment name must be provided via --model or MODEL_DEPLOYMENT_NAME env var")]
    MissingModel,

    #[error("PROJECT_ENDPOINT env var is required")]
    MissingEndpoint,

    #[error("Agent name must not be empty")]
    EmptyName,

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Main configuration structure loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub mcp: McpConfig,
    pub registry: RegistryConfig,
    pub session: SessionConfig,
    pub approval: ApprovalConfig,
}

impl Config {
    /// Load configuration from an explicit file, or the default one if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the config directory path (~/.config/mcp-agent)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("mcp-agent"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Project endpoint from the environment, else the config file
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        self.endpoint_from(|key| std::env::var(key).ok())
    }

    pub fn endpoint_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        lookup(ENDPOINT_ENV)
            .or_else(|| self.service.endpoint.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEndpoint)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_version: self.service.api_version.clone(),
            timeout: Duration::from_secs(self.service.timeout_secs),
        }
    }

    pub fn registry(&self) -> AgentRegistry {
        AgentRegistry::new(&self.registry.path)
    }

    /// Resolve the provisioning inputs; `model`, `mcp_url` and `mcp_label`
    /// already carry their environment fallbacks
    pub fn provision(
        &self,
        name: &str,
        model: Option<String>,
        mcp_url: Option<String>,
        mcp_label: Option<String>,
    ) -> Result<ProvisionConfig> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName.into());
        }

        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or(ConfigError::MissingModel)?;

        let url = mcp_url
            .or_else(|| self.mcp.url.clone())
            .unwrap_or_else(|| DEFAULT_MCP_URL.to_string());
        let label = mcp_label
            .or_else(|| self.mcp.label.clone())
            .unwrap_or_else(|| DEFAULT_MCP_LABEL.to_string());
        let server = McpServer::new(label, url)?.with_allowed_tools(self.mcp.allowed_tools.clone());

        Ok(ProvisionConfig {
            name: name.to_string(),
            model,
            server,
            instructions: self.agent.instructions.clone(),
        })
    }

    /// Resolve the runner settings
    pub fn session(&self) -> Result<SessionSettings, ConfigError> {
        if self.session.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(SessionSettings {
            poll_interval: Duration::from_millis(self.session.poll_interval_ms),
            max_polls: self.session.max_polls,
        })
    }
}

/// Inputs to a provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub name: String,
    pub model: String,
    pub server: McpServer,
    pub instructions: String,
}

/// Timing of the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    /// Give up on a run after this many polls; `None` polls forever
    pub max_polls: Option<u32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_polls: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Used when PROJECT_ENDPOINT is unset
    pub endpoint: Option<String>,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub instructions: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub url: Option<String>,
    pub label: Option<String>,
    pub allowed_tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(REGISTRY_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub poll_interval_ms: u64,
    pub max_polls: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_polls: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::OtherCallPolicy;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.api_version, "v1");
        assert_eq!(config.registry.path, PathBuf::from(".agents.json"));
        assert_eq!(config.session().unwrap(), SessionSettings::default());
        assert_eq!(config.agent.instructions, DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[service]
endpoint = "https://res.services.ai.azure.com/api/projects/demo"
api_version = "2025-05-15-preview"

[mcp]
allowed_tools = ["search_code"]

[registry]
path = "state/agents.json"

[session]
poll_interval_ms = 250
max_polls = 600

[approval]
deny = ["^delete_"]
other_calls = "deny"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.service.api_version, "2025-05-15-preview");
        assert_eq!(config.service.timeout_secs, 120);
        assert_eq!(config.mcp.allowed_tools, vec!["search_code"]);
        assert_eq!(config.registry.path, PathBuf::from("state/agents.json"));
        assert_eq!(
            config.session().unwrap(),
            SessionSettings {
                poll_interval: Duration::from_millis(250),
                max_polls: Some(600),
            }
        );
        assert_eq!(config.approval.filter.deny, vec!["^delete_"]);
        assert_eq!(config.approval.other_calls, OtherCallPolicy::Deny);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent]\ninstructions = \"Be brief.\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.agent.instructions, "Be brief.");

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_endpoint_resolution() {
        let mut config = Config::default();
        assert_eq!(config.endpoint_from(|_| None), Err(ConfigError::MissingEndpoint));
        assert_eq!(
            config.endpoint_from(|_| Some("  ".to_string())),
            Err(ConfigError::MissingEndpoint)
        );

        config.service.endpoint = Some("https://from-file".to_string());
        assert_eq!(config.endpoint_from(|_| None).unwrap(), "https://from-file");
        assert_eq!(
            config
                .endpoint_from(|key| (key == ENDPOINT_ENV).then(|| "https://from-env".to_string()))
                .unwrap(),
            "https://from-env"
        );
    }

    #[test]
    fn test_provision_requires_model() {
        let config = Config::default();
        let err = config.provision("docs", None, None, None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingModel)
        );
        assert!(err.to_string().contains(MODEL_ENV));

        let err = config
            .provision(" ", Some("gpt-4o".to_string()), None, None)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::EmptyName));
    }

    #[test]
    fn test_provision_defaults_and_overrides() {
        let mut config = Config::default();
        let resolved = config
            .provision("docs", Some("gpt-4o".to_string()), None, None)
            .unwrap();
        assert_eq!(resolved.server.url, DEFAULT_MCP_URL);
        assert_eq!(resolved.server.label, DEFAULT_MCP_LABEL);
        assert_eq!(resolved.instructions, DEFAULT_INSTRUCTIONS);

        config.mcp.label = Some("from-file".to_string());
        let resolved = config
            .provision(
                "docs",
                Some("gpt-4o".to_string()),
                Some("https://example.com/mcp".to_string()),
                None,
            )
            .unwrap();
        assert_eq!(resolved.server.url, "https://example.com/mcp");
        assert_eq!(resolved.server.label, "from-file");
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = Config::default();
        config.session.poll_interval_ms = 0;
        assert_eq!(config.session(), Err(ConfigError::ZeroPollInterval));
    }
}
