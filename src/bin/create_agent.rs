use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use mcp_agent::{cli, provision, Config};

/// Create an agent with an MCP tool and record its ID for later runs
#[derive(Parser, Debug)]
#[command(name = "create-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Human-friendly agent name (unique key in the agent store)
    #[arg(long)]
    name: String,

    /// Model deployment name
    #[arg(long, env = "MODEL_DEPLOYMENT_NAME")]
    model: Option<String>,

    /// MCP server URL
    #[arg(long = "mcp-url", env = "MCP_SERVER_URL")]
    mcp_url: Option<String>,

    /// MCP server label
    #[arg(long = "mcp-label", env = "MCP_SERVER_LABEL")]
    mcp_label: Option<String>,

    /// Config file (defaults to ~/.config/mcp-agent/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init("create-agent")?;
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let request = config.provision(&args.name, args.model, args.mcp_url, args.mcp_label)?;
    let client = cli::connect(&config).await?;
    let registry = config.registry();

    let agent = provision(&client, &registry, &request).await?;

    println!("Created agent '{}' with ID: {}", request.name, agent.id);
    println!("Stored mapping in {}", registry.path().display());
    Ok(())
}
