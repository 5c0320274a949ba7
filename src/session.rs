//! Interactive conversation with a provisioned agent
//!
//! Each line the operator enters becomes one turn:
//!
//! ```text
//! Submitted -> RunCreated -> Polling (sleep, fetch, approve)* -> Terminal
//! ```
//!
//! A failed run is a normal outcome of a turn. A remote error inside a turn is
//! reported with the turn number and the session carries on.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::approval::{collect_approvals, ApprovalPolicy, McpApprovalPolicy};
use crate::commands::{parse_command, Command};
use crate::config::SessionSettings;
use crate::service::{
    AgentService, ListSortOrder, Role, Run, RunStatus, RunStep, ServiceError, ThreadMessage,
};

/// Source of the delay between polls
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real time, via tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Run {run_id} still {status} after {polls} polls")]
    PollLimit {
        run_id: String,
        status: RunStatus,
        polls: u32,
    },

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Phase of one request/response cycle
#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    /// The operator's message is on the thread
    Submitted { message_id: String },
    /// A run exists with its initial status
    RunCreated(Run),
    /// The run is still moving; `polls` fetches done so far
    Polling { run: Run, polls: u32 },
    /// The run left the pending statuses
    Terminal(Run),
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The run failed; no reply was produced
    Failed { error: String },
    /// The run finished; `reply` is the latest assistant text, if any
    Finished {
        status: RunStatus,
        reply: Option<String>,
        tools_used: Vec<String>,
    },
}

/// A conversation thread bound to one agent
pub struct Session {
    service: Arc<dyn AgentService>,
    clock: Arc<dyn Clock>,
    policy: Box<dyn ApprovalPolicy>,
    settings: SessionSettings,
    agent_id: String,
    thread_id: String,
    turns: usize,
}

impl Session {
    /// Check the agent exists and open a fresh thread for it
    pub async fn start(
        service: Arc<dyn AgentService>,
        name: &str,
        agent_id: &str,
    ) -> anyhow::Result<Self> {
        let agent = service
            .get_agent(agent_id)
            .await
            .with_context(|| format!("Failed to retrieve agent '{}' (id={})", name, agent_id))?;
        tracing::info!("Resumed agent '{}' ({})", name, agent.id);

        let thread = service
            .create_thread()
            .await
            .context("Failed to create conversation thread")?;
        tracing::info!("Opened thread {}", thread.id);

        Ok(Self {
            service,
            clock: Arc::new(TokioClock),
            policy: Box::new(McpApprovalPolicy::default()),
            settings: SessionSettings::default(),
            agent_id: agent.id,
            thread_id: thread.id,
            turns: 0,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn ApprovalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Read lines until the operator quits or input ends
    pub async fn repl<R>(&mut self, input: R, out: &mut dyn Write) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(out, "Session thread ID: {}", self.thread_id)?;
        writeln!(out, "Type messages. Use :quit to exit.\n")?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                // End of input: keep the shell prompt on its own line
                writeln!(out)?;
                break;
            };

            match parse_command(&line) {
                Command::Skip => continue,
                Command::Quit => break,
                Command::Message(text) => {
                    self.turns += 1;
                    let turn = self.turns;
                    if let Err(e) = self.run_turn(&text, out).await {
                        tracing::error!("Turn {} failed: {}", turn, e);
                        writeln!(out, "Turn {} failed: {}", turn, e)?;
                    }
                }
            }
        }

        tracing::info!("Session on thread {} ended after {} turns", self.thread_id, self.turns);
        writeln!(out, "Exiting. (Agent not deleted; reuse with another session.)")?;
        Ok(())
    }

    /// Send one message and drive its run to a terminal status
    pub async fn run_turn(
        &mut self,
        text: &str,
        out: &mut dyn Write,
    ) -> Result<TurnOutcome, SessionError> {
        let message = self
            .service
            .create_message(&self.thread_id, Role::User, text)
            .await?;
        writeln!(out, "Created message: {}", message.id)?;

        let mut state = TurnState::Submitted {
            message_id: message.id,
        };
        loop {
            state = match state {
                TurnState::Terminal(run) => return self.finish(run, out).await,
                state => self.advance(state, out).await?,
            };
        }
    }

    /// Move a turn one transition forward
    pub async fn advance(
        &self,
        state: TurnState,
        out: &mut dyn Write,
    ) -> Result<TurnState, SessionError> {
        match state {
            TurnState::Submitted { message_id } => {
                let run = self
                    .service
                    .create_run(&self.thread_id, &self.agent_id)
                    .await?;
                tracing::debug!("Run {} created for message {}", run.id, message_id);
                writeln!(out, "Run: {} (status: {})", run.id, run.status)?;
                Ok(TurnState::RunCreated(run))
            }
            TurnState::RunCreated(run) => Ok(Self::classify(run, 0)),
            TurnState::Polling { run, polls } => {
                if let Some(max) = self.settings.max_polls {
                    if polls >= max {
                        return Err(SessionError::PollLimit {
                            run_id: run.id,
                            status: run.status,
                            polls,
                        });
                    }
                }

                self.clock.sleep(self.settings.poll_interval).await;
                let run = self.service.get_run(&self.thread_id, &run.id).await?;
                self.approve_pending(&run, out).await?;
                writeln!(out, "  Status: {}", run.status)?;

                Ok(Self::classify(run, polls + 1))
            }
            TurnState::Terminal(run) => Ok(TurnState::Terminal(run)),
        }
    }

    fn classify(run: Run, polls: u32) -> TurnState {
        if run.status.is_pending() {
            TurnState::Polling { run, polls }
        } else {
            TurnState::Terminal(run)
        }
    }

    /// Submit one batch of decisions for the calls the run is waiting on
    async fn approve_pending(&self, run: &Run, out: &mut dyn Write) -> Result<(), SessionError> {
        let Some(calls) = run.pending_approvals() else {
            return Ok(());
        };

        let approvals = collect_approvals(self.policy.as_ref(), calls);
        if approvals.is_empty() {
            tracing::debug!("Run {} has {} calls left pending", run.id, calls.len());
            return Ok(());
        }

        for approval in &approvals {
            let verb = if approval.approve { "Approving" } else { "Denying" };
            match calls.iter().find(|c| c.id == approval.tool_call_id) {
                Some(call) => writeln!(out, "{} MCP tool call: {}", verb, call)?,
                None => writeln!(out, "{} tool call: {}", verb, approval.tool_call_id)?,
            }
        }

        self.service
            .submit_tool_approvals(&self.thread_id, &run.id, &approvals)
            .await?;
        Ok(())
    }

    /// Report the result of a run that left the pending statuses
    async fn finish(&self, run: Run, out: &mut dyn Write) -> Result<TurnOutcome, SessionError> {
        if run.status == RunStatus::Failed {
            let error = run
                .last_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("Run {} failed: {}", run.id, error);
            writeln!(out, "Run failed: {}", error)?;
            return Ok(TurnOutcome::Failed { error });
        }

        if run.status != RunStatus::Completed {
            tracing::warn!("Run {} ended with status {}", run.id, run.status);
        }

        let messages = self
            .service
            .list_messages(&self.thread_id, ListSortOrder::Asc)
            .await?;
        let reply = latest_reply(&messages).map(str::to_string);
        if let Some(ref text) = reply {
            writeln!(out, "\nAssistant:\n{}\n", text)?;
        }

        let steps = self.service.list_run_steps(&self.thread_id, &run.id).await?;
        let tools_used = tools_used(&steps);
        for name in &tools_used {
            writeln!(out, "  (Tool used: {})", name)?;
        }

        Ok(TurnOutcome::Finished {
            status: run.status,
            reply,
            tools_used,
        })
    }
}

/// Last text segment of the newest assistant message that has text
fn latest_reply(messages: &[ThreadMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant)
        .find_map(|m| m.text_segments().last().copied())
}

/// Tool names from every step that reports tool activity
fn tools_used(steps: &[RunStep]) -> Vec<String> {
    steps
        .iter()
        .flat_map(|s| s.step_details.tool_names())
        .map(str::to_string)
        .collect()
}
