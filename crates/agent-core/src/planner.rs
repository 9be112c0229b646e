//! Planner Contract
//!
//! A planner turns one user input plus the session memory into a finite,
//! lazily produced sequence of [`PlannerEvent`]s: zero or more tool actions
//! followed by exactly one final output.
//!
//! The session controller only sees this trait, so the reasoning strategy
//! (the built-in [`crate::reasoning::Agent`], a scripted test double, or a
//! remote agent service) is pluggable.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Conversation;
use crate::tool::ToolCall;

/// A tool invocation announced by the planner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
}

impl AgentAction {
    pub fn new(tool: impl Into<String>, tool_input: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            tool_input: tool_input.into(),
        }
    }
}

impl From<&ToolCall> for AgentAction {
    fn from(call: &ToolCall) -> Self {
        Self::new(call.name.clone(), call.input.clone())
    }
}

/// One step of a planner run.
///
/// Serializes as `{"actions": [...]}` or `{"output": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerEvent {
    /// Tools about to be invoked, announced before their results are known
    Actions(Vec<AgentAction>),

    /// The completed answer for the turn
    Output(String),
}

/// Lazy event sequence for one turn
pub type PlannerStream<'a> = Pin<Box<dyn Stream<Item = Result<PlannerEvent>> + Send + 'a>>;

/// Reasoning strategy consulted once per user turn
pub trait Planner: Send + Sync {
    /// Start a run for `input`.
    ///
    /// `memory` is borrowed for the whole run; implementations record the
    /// exchange in it once the final output is produced.
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a>;

    /// System prompt installed in fresh session memory
    fn system_prompt(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let actions = PlannerEvent::Actions(vec![AgentAction::new("cek_stok_mobil", "model=Agya")]);
        assert_eq!(
            serde_json::to_value(&actions).unwrap(),
            serde_json::json!({"actions": [{"tool": "cek_stok_mobil", "tool_input": "model=Agya"}]})
        );

        let output = PlannerEvent::Output("Stok tersedia.".into());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            serde_json::json!({"output": "Stok tersedia."})
        );
    }

    #[test]
    fn test_action_from_tool_call() {
        let call = ToolCall::new("lokasi_dealer", "kota=Medan");
        assert_eq!(AgentAction::from(&call), AgentAction::new("lokasi_dealer", "kota=Medan"));
    }
}
