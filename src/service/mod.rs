//! Remote agent-management service
//!
//! The run loop and the provisioner only talk to the service through the
//! [`AgentService`] trait, so the HTTP backend can be swapped for a scripted
//! one in tests.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod scripted;
mod types;

use async_trait::async_trait;

pub use client::{AgentsClient, ClientOptions, DEFAULT_API_VERSION};
pub use error::ServiceError;
pub use types::{
    Agent, CreateAgentRequest, ListSortOrder, MessageContent, Role, RequiredAction,
    RequiredToolCall, Run, RunError, RunStatus, RunStep, StepActivity, StepDetails,
    StepToolCall, TextValue, Thread, ThreadMessage, ToolApproval, ToolCallKind, ToolDefinition,
};

/// Result type for service calls
pub type Result<T> = std::result::Result<T, ServiceError>;

/// The nine operations the agent tools need from the remote service
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Create a new agent
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent>;

    /// Fetch an existing agent by id
    async fn get_agent(&self, agent_id: &str) -> Result<Agent>;

    /// Open a new conversation thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a message to a thread
    async fn create_message(&self, thread_id: &str, role: Role, content: &str)
        -> Result<ThreadMessage>;

    /// List every message on a thread in the given order
    async fn list_messages(&self, thread_id: &str, order: ListSortOrder)
        -> Result<Vec<ThreadMessage>>;

    /// Start a run of an agent over a thread
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Submit a batch of tool approvals for a run
    async fn submit_tool_approvals(
        &self,
        thread_id: &str,
        run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<Run>;

    /// List every step of a run
    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> Result<Vec<RunStep>>;
}
