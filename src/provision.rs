//! Agent provisioning

use anyhow::{Context, Result};

use crate::config::ProvisionConfig;
use crate::registry::AgentRegistry;
use crate::service::{Agent, AgentService, CreateAgentRequest};

/// Create the agent remotely and record it under its name
///
/// The registry is only touched once the service has answered.
pub async fn provision(
    service: &dyn AgentService,
    registry: &AgentRegistry,
    config: &ProvisionConfig,
) -> Result<Agent> {
    let request = CreateAgentRequest {
        model: config.model.clone(),
        name: config.name.clone(),
        instructions: config.instructions.clone(),
        tools: config.server.definitions(),
    };

    tracing::info!(
        "Creating agent '{}' on model {} with MCP server {} ({})",
        config.name,
        config.model,
        config.server.label,
        config.server.url
    );

    let agent = service
        .create_agent(&request)
        .await
        .with_context(|| format!("Failed to create agent '{}'", config.name))?;

    registry
        .record(&config.name, &agent.id)
        .context("Agent was created but its ID could not be stored")?;

    tracing::info!("Recorded agent '{}' as {}", config.name, agent.id);
    Ok(agent)
}
