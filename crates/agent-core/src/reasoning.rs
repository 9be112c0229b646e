//! Reasoning Loop
//!
//! ReAct (Reason + Act) planner over an [`LlmProvider`]. Each model reply is
//! either one or more fenced `tool` blocks, which are announced as a
//! [`PlannerEvent::Actions`] and executed before the model is asked again, or
//! plain text, which is the final answer.
//!
//! Tool observations live in a per-turn scratchpad. Only the user input and
//! the final answer are written back into session memory.

use std::sync::Arc;

use futures::stream;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::planner::{AgentAction, Planner, PlannerEvent, PlannerStream};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Persona / instructions placed ahead of the tool catalog
    pub system_prompt: String,

    /// Maximum model calls per turn before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions {
                stop_sequences: vec![OBSERVATION_STOP.into()],
                ..GenerationOptions::default()
            },
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful assistant.

Use a tool whenever the answer depends on data you do not have.
After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate.";

/// Keeps the model from writing tool observations itself
const OBSERVATION_STOP: &str = "Observation:";

const TOOL_BLOCK_OPEN: &str = "```tool";
const TOOL_BLOCK_CLOSE: &str = "```";

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Execute a tool call, folding lookup failures into a failed result
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(result) => result,
            Err(e) => ToolResult {
                name: call.name.clone(),
                id: call.id.clone(),
                success: false,
                output: format!("Error: {e}. Available tools: {}", self.tools.names().join(", ")),
                data: None,
            },
        }
    }

    /// Format tool result for the scratchpad
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }
}

impl Planner for Agent {
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a> {
        memory.ensure_system_prompt(self.build_system_prompt());
        memory.truncate_to_fit();

        let run = ReactRun {
            agent: self,
            input,
            memory,
            scratchpad: Vec::new(),
            pending: Vec::new(),
            iterations: 0,
            finished: false,
        };

        Box::pin(stream::unfold(run, |mut run| async move {
            let event = run.next_event().await?;
            Some((event, run))
        }))
    }

    fn system_prompt(&self) -> Option<String> {
        Some(self.build_system_prompt())
    }
}

/// State of one planner run
struct ReactRun<'a> {
    agent: &'a Agent,
    input: &'a str,
    memory: &'a mut Conversation,
    scratchpad: Vec<Message>,
    /// Calls announced in the last event, executed on the next poll
    pending: Vec<ToolCall>,
    iterations: usize,
    finished: bool,
}

impl ReactRun<'_> {
    async fn next_event(&mut self) -> Option<Result<PlannerEvent>> {
        if self.finished {
            return None;
        }

        for call in std::mem::take(&mut self.pending) {
            let result = self.agent.execute_tool(&call).await;
            tracing::debug!(tool = %call.name, success = result.success, "Tool observation");
            self.scratchpad
                .push(Message::tool(Agent::format_tool_result(&result), call.id.clone()));
        }

        let event = self.reason().await;
        if !matches!(event, Ok(PlannerEvent::Actions(_))) {
            self.finished = true;
        }
        Some(event)
    }

    async fn reason(&mut self) -> Result<PlannerEvent> {
        let max = self.agent.config.max_iterations;

        loop {
            self.iterations += 1;
            if self.iterations > max {
                return Err(AgentError::MaxIterations(max));
            }

            let completion = self
                .agent
                .provider
                .complete(&self.prompt(), &self.agent.config.generation)
                .await?;

            match parse_reply(&completion.content) {
                Reply::ToolCalls(calls) => {
                    self.scratchpad.push(Message::assistant(completion.content));
                    let actions: Vec<AgentAction> = calls.iter().map(AgentAction::from).collect();
                    self.pending = calls;
                    return Ok(PlannerEvent::Actions(actions));
                }
                Reply::Invalid(reason) => {
                    tracing::warn!(%reason, iteration = self.iterations, "Unparseable model reply");
                    self.scratchpad.push(Message::assistant(completion.content));
                    self.scratchpad.push(Message::tool(
                        format!(
                            "[Format error] {reason}. Reply with a valid ```tool block \
                             or answer the customer directly."
                        ),
                        None,
                    ));
                }
                Reply::Final(answer) => {
                    self.memory.push(Message::user(self.input));
                    self.memory.push(Message::assistant(answer.clone()));
                    return Ok(PlannerEvent::Output(answer));
                }
            }
        }
    }

    /// Memory, then this turn's input, then the scratchpad
    fn prompt(&self) -> Vec<Message> {
        let mut messages = self.memory.messages().to_vec();
        messages.push(Message::user(self.input));
        messages.extend(self.scratchpad.iter().cloned());
        messages
    }
}

/// Classified model reply
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    ToolCalls(Vec<ToolCall>),
    Invalid(String),
    Final(String),
}

fn parse_reply(content: &str) -> Reply {
    let mut calls = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find(TOOL_BLOCK_OPEN) {
        let after_marker = &rest[start + TOOL_BLOCK_OPEN.len()..];
        let Some(end) = after_marker.find(TOOL_BLOCK_CLOSE) else {
            return Reply::Invalid("unterminated tool block".into());
        };

        match serde_json::from_str::<ToolCall>(after_marker[..end].trim()) {
            Ok(call) => calls.push(with_call_id(call)),
            Err(e) => return Reply::Invalid(format!("could not parse tool call: {e}")),
        }
        rest = &after_marker[end + TOOL_BLOCK_CLOSE.len()..];
    }

    if !calls.is_empty() {
        return Reply::ToolCalls(calls);
    }

    if let Some(call) = parse_inline_tool_call(content) {
        return Reply::ToolCalls(vec![with_call_id(call)]);
    }

    let answer = content.trim();
    if answer.is_empty() {
        Reply::Invalid("empty response".into())
    } else {
        Reply::Final(answer.to_string())
    }
}

/// Whole reply is a bare JSON tool call, emitted without the fence
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    let trimmed = content.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return None;
    }
    serde_json::from_str::<ToolCall>(trimmed).ok()
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, self.tools, self.config))
    }
}
