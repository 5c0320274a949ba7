use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use mcp_agent::{cli, Config, McpApprovalPolicy, Session};

/// Run an interactive loop with an agent created by create-agent
///
/// Type a message and press Enter. Type ":quit" or Ctrl-D to exit.
#[derive(Parser, Debug)]
#[command(name = "run-agent")]
#[command(author, version, about)]
struct Args {
    /// Agent name (key in the agent store)
    #[arg(long)]
    name: String,

    /// Config file (defaults to ~/.config/mcp-agent/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init("run-agent")?;
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let settings = config.session()?;
    let policy = McpApprovalPolicy::from_config(&config.approval)?;

    let agent_id = config.registry().lookup(&args.name)?;
    let client = cli::connect(&config).await?;

    let mut session = Session::start(Arc::new(client), &args.name, &agent_id)
        .await?
        .with_settings(settings)
        .with_policy(Box::new(policy));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.repl(stdin, &mut std::io::stdout()).await
}
