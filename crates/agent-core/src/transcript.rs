//! Transcript Store
//!
//! Ordered, append-only log of what the user sees in one session. Tool
//! invocations are kept as assistant entries carrying a distinct
//! [`TurnKind::ToolAction`] so renderers can style them apart from answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Role;
use crate::planner::AgentAction;

/// What an entry represents
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnKind {
    /// Plain user or assistant text
    Message,
    /// A tool the assistant invoked while working on the answer
    ToolAction { tool: String, tool_input: String },
    /// Apology shown in place of an answer after a planner failure
    Error,
}

/// One rendered transcript entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub kind: TurnKind,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>, kind: TurnKind) -> Self {
        Self {
            role,
            content: content.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, TurnKind::Message)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, TurnKind::Message)
    }

    /// Annotated tool invocation, e.g. ``🛠 **cek_harga_mobil**: `model=Avanza` ``
    pub fn tool_action(action: AgentAction) -> Self {
        let content = format!("🛠 **{}**: `{}`", action.tool, action.tool_input);
        Self::new(
            Role::Assistant,
            content,
            TurnKind::ToolAction {
                tool: action.tool,
                tool_input: action.tool_input,
            },
        )
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, TurnKind::Error)
    }

    pub fn is_tool_action(&self) -> bool {
        matches!(self.kind, TurnKind::ToolAction { .. })
    }
}

/// Session-scoped ordered log of turns
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.entries.push(turn);
    }

    pub fn entries(&self) -> &[Turn] {
        &self.entries
    }

    /// Entries from `start` onwards
    pub fn since(&self, start: usize) -> &[Turn] {
        self.entries.get(start..).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_action_rendering() {
        let turn = Turn::tool_action(AgentAction::new("cek_harga_mobil", "model=Avanza"));
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.is_tool_action());
        assert_eq!(turn.content, "🛠 **cek_harga_mobil**: `model=Avanza`");
    }

    #[test]
    fn test_kind_serialization() {
        let turn = Turn::tool_action(AgentAction::new("lokasi_dealer", "kota=Medan"));
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["kind"]["type"], "tool_action");
        assert_eq!(json["kind"]["tool"], "lokasi_dealer");

        let json = serde_json::to_value(Turn::user("halo")).unwrap();
        assert_eq!(json["kind"]["type"], "message");
    }

    #[test]
    fn test_append_since_and_clear() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("a"));
        transcript.append(Turn::assistant("b"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.since(1)[0].content, "b");
        assert!(transcript.since(5).is_empty());

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
