//! Remote MCP server descriptor

use anyhow::{Context, Result};
use url::Url;

use crate::service::ToolDefinition;

/// Server used when neither flag nor environment names one
pub const DEFAULT_MCP_URL: &str = "https://gitmcp.io/Azure/azure-rest-api-specs";

/// Label used when neither flag nor environment names one
pub const DEFAULT_MCP_LABEL: &str = "github";

/// A remote MCP server the agent may call tools on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServer {
    pub label: String,
    pub url: String,
    /// Restrict the agent to these tools; empty means all
    pub allowed_tools: Vec<String>,
}

impl McpServer {
    /// Validate the url and label of a server
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let label = label.into().trim().to_string();
        let url = url.into().trim().to_string();

        if label.is_empty() {
            anyhow::bail!("MCP server label must not be empty");
        }
        let parsed = Url::parse(&url).with_context(|| format!("Invalid MCP server URL: {}", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("MCP server URL must use http or https: {}", url);
        }

        Ok(Self {
            label,
            url,
            allowed_tools: Vec::new(),
        })
    }

    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    /// Tool definitions to attach to an agent
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::Mcp {
            server_label: self.label.clone(),
            server_url: self.url.clone(),
            allowed_tools: self.allowed_tools.clone(),
        }]
    }
}
