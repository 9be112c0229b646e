//! Conversation Messages
//!
//! Message format shared by planners and providers. A [`Conversation`] is
//! the planner memory carried across the turns of one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool observation (injected as context)
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Tool call this message answers (tool messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool observation message
    pub fn tool(content: impl Into<String>, tool_call_id: Option<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = tool_call_id;
        msg
    }

    /// Estimate token count (rough approximation)
    pub fn estimate_tokens(&self) -> u32 {
        // ~4 characters per token, +4 for role overhead
        u32::try_from(self.content.len() / 4).unwrap_or(u32::MAX).saturating_add(4)
    }
}

/// Conversation memory with utility methods
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,

    /// Maximum context length (in estimated tokens)
    #[serde(default = "default_max_context")]
    max_context_tokens: u32,
}

fn default_max_context() -> u32 {
    8192
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            max_context_tokens: default_max_context(),
        }
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Install `prompt` as the leading system message unless one is present
    pub fn ensure_system_prompt(&mut self, prompt: impl Into<String>) {
        if self.messages.first().map(|m| m.role) != Some(Role::System) {
            self.messages.insert(0, Message::system(prompt));
        }
    }

    /// Clear all messages except system prompt
    pub fn clear_history(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }

    /// Estimate total tokens in conversation
    pub fn estimate_tokens(&self) -> u32 {
        self.messages.iter().map(Message::estimate_tokens).sum()
    }

    /// Truncate to fit within token limit, preserving system and recent messages
    pub fn truncate_to_fit(&mut self) {
        while self.estimate_tokens() > self.max_context_tokens && self.messages.len() > 2 {
            // Never drop the system prompt or the very last message
            match self.messages.iter().position(|m| m.role != Role::System) {
                Some(pos) if pos < self.messages.len() - 1 => {
                    self.messages.remove(pos);
                }
                _ => break,
            }
        }
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Berapa harga Avanza?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Berapa harga Avanza?");
    }

    #[test]
    fn test_conversation() {
        let mut conv = Conversation::new();
        conv.ensure_system_prompt("Kamu adalah bot dealer.");
        conv.push(Message::user("Halo"));
        conv.push(Message::assistant("Selamat datang!"));

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.messages()[2].role, Role::Assistant);
    }

    #[test]
    fn test_clear_history_keeps_system_prompt() {
        let mut conv = Conversation::new();
        conv.ensure_system_prompt("prompt");
        conv.push(Message::user("a"));
        conv.push(Message::assistant("b"));

        conv.clear_history();
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::System);
    }

    #[test]
    fn test_ensure_system_prompt_is_idempotent() {
        let mut conv = Conversation::new();
        conv.ensure_system_prompt("first");
        conv.ensure_system_prompt("second");

        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].content, "first");
    }

    #[test]
    fn test_truncate_keeps_system_and_latest() {
        let mut conv = Conversation {
            messages: Vec::new(),
            max_context_tokens: 20,
        };
        conv.push(Message::system("sys"));
        for i in 0..10 {
            conv.push(Message::user(format!("pesan nomor {i} yang cukup panjang")));
        }

        conv.truncate_to_fit();
        assert_eq!(conv.messages()[0].role, Role::System);
        assert!(conv.messages()[conv.len() - 1].content.contains("nomor 9"));
        assert!(conv.len() < 11);
    }
}
