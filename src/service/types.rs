//! Wire types for the Azure AI Agents API

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A remote agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Request body for agent creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition attached to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    Mcp {
        server_label: String,
        server_url: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed_tools: Vec<String>,
    },
}

/// A conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message on a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// Text segments of the message, in order
    pub fn text_segments(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect()
    }
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        MessageContent::Text {
            text: TextValue {
                value: value.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// Request body for message creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub role: Role,
    pub content: String,
}

/// Sort order for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSortOrder {
    #[default]
    Asc,
    Desc,
}

impl ListSortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSortOrder::Asc => "asc",
            ListSortOrder::Desc => "desc",
        }
    }
}

/// One page of a list response
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the run is still moving and must be polled again
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::RequiresAction
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of an agent over a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Tool calls awaiting approval, if the run is blocked on one
    pub fn pending_approvals(&self) -> Option<&[RequiredToolCall]> {
        if self.status != RunStatus::RequiresAction {
            return None;
        }
        match &self.required_action {
            Some(RequiredAction::SubmitToolApproval {
                submit_tool_approval,
            }) => Some(submit_tool_approval.tool_calls.as_slice()),
            _ => None,
        }
    }
}

/// Request body for run creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

/// Error recorded on a failed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Action the service is waiting on before a run can continue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolApproval {
        submit_tool_approval: RequiredToolCalls,
    },
    SubmitToolOutputs {
        submit_tool_outputs: RequiredToolCalls,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredToolCalls {
    #[serde(default)]
    pub tool_calls: Vec<RequiredToolCall>,
}

/// Kind of a pending tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallKind {
    Mcp,
    Function,
    #[serde(other)]
    Other,
}

/// A tool call the run is waiting on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolCallKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub server_label: Option<String>,
}

impl fmt::Display for RequiredToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("?");
        match &self.server_label {
            Some(label) => write!(f, "{}.{}", label, name)?,
            None => f.write_str(name)?,
        }
        write!(f, "({})", self.arguments.as_deref().unwrap_or(""))?;
        write!(f, " [{}]", self.id)
    }
}

/// Approval (or denial) of one pending tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolApproval {
    pub tool_call_id: String,
    pub approve: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl ToolApproval {
    pub fn new(tool_call_id: impl Into<String>, approve: bool) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            approve,
            headers: HashMap::new(),
        }
    }
}

/// Request body for approval submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitApprovalsRequest {
    pub tool_approvals: Vec<ToolApproval>,
}

/// One step in a run's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    pub step_details: StepDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    Activities {
        #[serde(default)]
        activities: Vec<StepActivity>,
    },
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<StepToolCall>,
    },
    #[serde(other)]
    Other,
}

impl StepDetails {
    /// Names of all tools touched by this step
    pub fn tool_names(&self) -> Vec<&str> {
        match self {
            StepDetails::Activities { activities } => activities
                .iter()
                .flat_map(|a| a.tools.keys().map(String::as_str))
                .collect(),
            StepDetails::ToolCalls { tool_calls } => tool_calls
                .iter()
                .filter_map(|c| c.name.as_deref())
                .collect(),
            StepDetails::Other => Vec::new(),
        }
    }
}

/// Tool activity reported by a step (e.g. listing the tools of an MCP server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepActivity {
    #[serde(default)]
    pub server_label: Option<String>,
    #[serde(default)]
    pub tools: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepToolCall {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
