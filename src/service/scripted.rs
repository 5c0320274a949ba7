//! In-memory agent service driven by a script of run states

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::*;
use super::{AgentService, Result, ServiceError};

/// A call made against the scripted service
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAgent(String),
    GetAgent(String),
    CreateThread,
    CreateMessage(String),
    ListMessages,
    CreateRun(String),
    GetRun(String),
    SubmitApprovals(Vec<ToolApproval>),
    ListRunSteps(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    runs: VecDeque<Run>,
    messages: Vec<ThreadMessage>,
    steps: Vec<RunStep>,
    replies: VecDeque<String>,
    fail_create_agent: Option<String>,
    fail_create_message: Option<String>,
    fail_get_agent: Option<String>,
    next_id: usize,
}

/// Replays queued run states and records every call
#[derive(Default)]
pub struct ScriptedService {
    state: Mutex<State>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the states a run will report, first one returned by `create_run`
    pub fn with_run_states(self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.state.lock().unwrap().runs.extend(runs);
        self
    }

    /// Reply the assistant will post when the next run completes
    pub fn with_reply(self, text: &str) -> Self {
        self.state.lock().unwrap().replies.push_back(text.to_string());
        self
    }

    pub fn with_steps(self, steps: Vec<RunStep>) -> Self {
        self.state.lock().unwrap().steps = steps;
        self
    }

    pub fn failing_create_agent(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_create_agent = Some(message.to_string());
        self
    }

    pub fn failing_create_message(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_create_message = Some(message.to_string());
        self
    }

    pub fn failing_get_agent(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_get_agent = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn approval_batches(&self) -> Vec<Vec<ToolApproval>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitApprovals(batch) => Some(batch),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn next_run(&mut self) -> Result<Run> {
        let run = self
            .runs
            .pop_front()
            .ok_or_else(|| ServiceError::Other("run script exhausted".to_string()))?;

        if run.status == RunStatus::Completed {
            if let Some(reply) = self.replies.pop_front() {
                let id = self.id("msg");
                self.messages.push(ThreadMessage {
                    id,
                    role: Role::Assistant,
                    content: vec![MessageContent::text(reply)],
                });
            }
        }
        Ok(run)
    }
}

#[async_trait]
impl AgentService for ScriptedService {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent> {
        self.record(Call::CreateAgent(request.name.clone()));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_create_agent.take() {
            return Err(ServiceError::Api { status: 400, message });
        }
        Ok(Agent {
            id: state.id("asst"),
            name: Some(request.name.clone()),
            model: Some(request.model.clone()),
        })
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        self.record(Call::GetAgent(agent_id.to_string()));
        if let Some(message) = self.state.lock().unwrap().fail_get_agent.clone() {
            return Err(ServiceError::Api { status: 404, message });
        }
        Ok(Agent {
            id: agent_id.to_string(),
            name: None,
            model: None,
        })
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.record(Call::CreateThread);
        let mut state = self.state.lock().unwrap();
        Ok(Thread { id: state.id("thread") })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage> {
        self.record(Call::CreateMessage(content.to_string()));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_create_message.take() {
            return Err(ServiceError::Api { status: 500, message });
        }
        let message = ThreadMessage {
            id: state.id("msg"),
            role,
            content: vec![MessageContent::text(content)],
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>> {
        self.record(Call::ListMessages);
        let mut messages = self.state.lock().unwrap().messages.clone();
        if order == ListSortOrder::Desc {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn create_run(&self, _thread_id: &str, agent_id: &str) -> Result<Run> {
        self.record(Call::CreateRun(agent_id.to_string()));
        self.state.lock().unwrap().next_run()
    }

    async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        self.record(Call::GetRun(run_id.to_string()));
        self.state.lock().unwrap().next_run()
    }

    async fn submit_tool_approvals(
        &self,
        _thread_id: &str,
        run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<Run> {
        self.record(Call::SubmitApprovals(approvals.to_vec()));
        Ok(run(run_id, RunStatus::InProgress))
    }

    async fn list_run_steps(&self, _thread_id: &str, run_id: &str) -> Result<Vec<RunStep>> {
        self.record(Call::ListRunSteps(run_id.to_string()));
        Ok(self.state.lock().unwrap().steps.clone())
    }
}

/// A run in a plain status
pub fn run(id: &str, status: RunStatus) -> Run {
    Run {
        id: id.to_string(),
        status,
        required_action: None,
        last_error: None,
    }
}

/// A run blocked on approval of the given calls
pub fn run_requiring(id: &str, calls: Vec<RequiredToolCall>) -> Run {
    Run {
        id: id.to_string(),
        status: RunStatus::RequiresAction,
        required_action: Some(RequiredAction::SubmitToolApproval {
            submit_tool_approval: RequiredToolCalls { tool_calls: calls },
        }),
        last_error: None,
    }
}

/// A failed run carrying an error message
pub fn failed_run(id: &str, message: &str) -> Run {
    Run {
        id: id.to_string(),
        status: RunStatus::Failed,
        required_action: None,
        last_error: Some(RunError {
            code: Some("server_error".to_string()),
            message: message.to_string(),
        }),
    }
}

/// A pending call of the given kind
pub fn tool_call(id: &str, kind: ToolCallKind, name: &str) -> RequiredToolCall {
    RequiredToolCall {
        id: id.to_string(),
        kind,
        name: Some(name.to_string()),
        arguments: Some("{}".to_string()),
        server_label: Some("github".to_string()),
    }
}
