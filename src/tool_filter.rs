//! Tool name filtering with regex patterns
//!
//! Decides pending MCP tool calls based on patterns matched against the
//! tool's name.
//!
//! # Configuration Format
//!
//! ```toml
//! [approval]
//! allow = ["^search_", "^fetch_"]
//! deny = ["delete", "^write_"]
//! ```
//!
//! # Evaluation Order
//!
//! 1. If any deny pattern matches → `ToolDecision::Deny`
//! 2. If no allow patterns are configured → `ToolDecision::Approve`
//! 3. If any allow pattern matches → `ToolDecision::Approve`
//! 4. Otherwise → `ToolDecision::Deny`

use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::approval::ToolDecision;

/// Filter configuration with allow and deny pattern lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolFilterConfig {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

/// Compiled filter for efficient repeated matching
#[derive(Debug, Default)]
pub struct CompiledToolFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl CompiledToolFilter {
    /// Compile a filter configuration into regex patterns
    pub fn compile(config: &ToolFilterConfig) -> Result<Self> {
        let allow = config
            .allow
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid allow pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;

        let deny = config
            .deny
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid deny pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { allow, deny })
    }

    /// Evaluate patterns against a tool name
    pub fn evaluate(&self, tool_name: &str) -> ToolDecision {
        // A pattern that errors out while matching counts as no match
        if self
            .deny
            .iter()
            .any(|p| p.is_match(tool_name).unwrap_or(false))
        {
            return ToolDecision::Deny;
        }

        if self.allow.is_empty()
            || self
                .allow
                .iter()
                .any(|p| p.is_match(tool_name).unwrap_or(false))
        {
            return ToolDecision::Approve;
        }

        ToolDecision::Deny
    }
}
