//! Approval of tool calls a run is blocked on
//!
//! The service pauses a run in `requires_action` until every pending MCP call
//! is approved or denied. An [`ApprovalPolicy`] decides each call; abstaining
//! leaves the call pending, and the run keeps reporting `requires_action`
//! until the service resolves it on its own terms.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::service::{RequiredToolCall, ToolApproval, ToolCallKind};
use crate::tool_filter::{CompiledToolFilter, ToolFilterConfig};

/// Decision for a single pending tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolDecision {
    Approve,
    Deny,
}

/// Decides pending tool calls, keyed by their kind
pub trait ApprovalPolicy: Send + Sync {
    /// `None` leaves the call pending
    fn decide(&self, call: &RequiredToolCall) -> Option<ToolDecision>;
}

/// What to do with pending calls that are not MCP calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherCallPolicy {
    /// Neither approve nor deny
    #[default]
    LeavePending,
    Deny,
}

/// Approval settings from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    #[serde(flatten)]
    pub filter: ToolFilterConfig,
    pub other_calls: OtherCallPolicy,
}

/// Approves MCP calls that pass the name filter
#[derive(Debug, Default)]
pub struct McpApprovalPolicy {
    filter: CompiledToolFilter,
    other_calls: OtherCallPolicy,
}

impl McpApprovalPolicy {
    pub fn from_config(config: &ApprovalConfig) -> Result<Self> {
        Ok(Self {
            filter: CompiledToolFilter::compile(&config.filter)?,
            other_calls: config.other_calls,
        })
    }
}

impl ApprovalPolicy for McpApprovalPolicy {
    fn decide(&self, call: &RequiredToolCall) -> Option<ToolDecision> {
        match call.kind {
            ToolCallKind::Mcp => Some(self.filter.evaluate(call.name.as_deref().unwrap_or(""))),
            ToolCallKind::Function | ToolCallKind::Other => match self.other_calls {
                OtherCallPolicy::LeavePending => None,
                OtherCallPolicy::Deny => Some(ToolDecision::Deny),
            },
        }
    }
}

/// Turn a set of pending calls into the approvals to submit in one batch
pub fn collect_approvals(
    policy: &dyn ApprovalPolicy,
    calls: &[RequiredToolCall],
) -> Vec<ToolApproval> {
    calls
        .iter()
        .filter_map(|call| {
            let decision = policy.decide(call);
            match decision {
                Some(ToolDecision::Approve) => tracing::info!("Approving tool call: {}", call),
                Some(ToolDecision::Deny) => tracing::info!("Denying tool call: {}", call),
                None => tracing::debug!("Leaving tool call pending: {}", call),
            }
            decision.map(|d| ToolApproval::new(&call.id, d == ToolDecision::Approve))
        })
        .collect()
}
