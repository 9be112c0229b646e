//! In-memory test doubles

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::planner::{Planner, PlannerEvent, PlannerStream};
use crate::provider::{Completion, GenerationOptions, LlmProvider};
use crate::tool::{FieldSchema, Tool, ToolCall, ToolResult, ToolSchema};

/// Provider that replays queued replies and records every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    repeat: Option<String>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same reply
    pub fn repeating(reply: &str) -> Self {
        Self {
            repeat: Some(reply.to_string()),
            ..Self::new([])
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(messages.to_vec());

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match (next, &self.repeat) {
            (Some(reply), _) => reply?,
            (None, Some(repeat)) => repeat.clone(),
            (None, None) => return Err(AgentError::Provider("script exhausted".into())),
        };
        Ok(Completion::text(reply, options.model.clone()))
    }
}

/// Planner that replays one scripted event list per turn
pub struct ScriptedPlanner {
    turns: Mutex<VecDeque<Vec<Result<PlannerEvent>>>>,
}

impl ScriptedPlanner {
    pub fn new(turns: impl IntoIterator<Item = Vec<Result<PlannerEvent>>>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
        }
    }
}

impl Planner for ScriptedPlanner {
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a> {
        let events = self.turns.lock().unwrap().pop_front().unwrap_or_default();
        if let Some(Ok(PlannerEvent::Output(answer))) = events.last() {
            memory.push(Message::user(input));
            memory.push(Message::assistant(answer.clone()));
        }
        Box::pin(stream::iter(events))
    }

    fn system_prompt(&self) -> Option<String> {
        Some("scripted".into())
    }
}

/// Planner whose first run never yields; later runs answer at once
#[derive(Default)]
pub struct StallingPlanner {
    stalled: AtomicBool,
}

impl Planner for StallingPlanner {
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            return Box::pin(stream::pending::<Result<PlannerEvent>>());
        }
        memory.push(Message::user(input));
        memory.push(Message::assistant("Siap membantu."));
        Box::pin(stream::iter([Ok(PlannerEvent::Output("Siap membantu.".into()))]))
    }
}

/// Tool that answers with its raw input
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "echo".into(),
            description: "Echo the raw input".into(),
            input_format: "text=halo".into(),
            fields: vec![FieldSchema::required("text", "string", "Text to echo")],
            category: None,
        }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        ToolResult::success("echo", call.input.clone())
    }
}
