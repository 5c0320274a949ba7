//! mcp-agent - provision hosted agents that call remote MCP tools, and chat with them
//!
//! The crate backs two command-line programs:
//!
//! - `create-agent` creates an agent bound to an MCP server and records its ID
//!   in a local registry file (`.agents.json`).
//! - `run-agent` resumes a recorded agent on a fresh thread and runs an
//!   interactive loop, approving the MCP tool calls the agent makes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp_agent::{AgentRegistry, AgentsClient, ClientOptions, Credentials, Session};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let agent_id = AgentRegistry::default().lookup("docs")?;
//!     let client = AgentsClient::new(
//!         "https://my-resource.services.ai.azure.com/api/projects/my-project",
//!         Credentials::resolve().await?,
//!         ClientOptions::default(),
//!     )?;
//!
//!     let mut session = Session::start(Arc::new(client), "docs", &agent_id).await?;
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     session.repl(stdin, &mut std::io::stdout()).await
//! }
//! ```

mod approval;
mod auth;
mod commands;
mod config;
mod mcp;
mod provision;
mod registry;
mod service;
mod session;
mod tool_filter;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export the public API
pub use approval::{
    collect_approvals, ApprovalConfig, ApprovalPolicy, McpApprovalPolicy, OtherCallPolicy,
    ToolDecision,
};
pub use auth::Credentials;
pub use commands::{parse_command, Command};
pub use config::{
    Config, ConfigError, ProvisionConfig, SessionSettings, DEFAULT_INSTRUCTIONS, ENDPOINT_ENV,
    LOG_ENV, MCP_LABEL_ENV, MCP_URL_ENV, MODEL_ENV,
};
pub use mcp::{McpServer, DEFAULT_MCP_LABEL, DEFAULT_MCP_URL};
pub use provision::provision;
pub use registry::{AgentMap, AgentRegistry, RegistryError, REGISTRY_FILE};
pub use service::{
    Agent, AgentService, AgentsClient, ClientOptions, CreateAgentRequest, ListSortOrder, Role,
    RequiredToolCall, Run, RunStatus, RunStep, ServiceError, Thread, ThreadMessage, ToolApproval,
    ToolCallKind, ToolDefinition,
};
pub use session::{Clock, Session, SessionError, TokioClock, TurnOutcome, TurnState};
pub use tool_filter::ToolFilterConfig;
