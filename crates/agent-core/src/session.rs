//! Session Management
//!
//! A session bundles everything one conversation owns: the transcript the
//! user sees and the memory the planner reads. Nothing here is global, so
//! any number of sessions can live side by side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Role};
use crate::transcript::Transcript;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-conversation state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// What the user has seen so far
    pub transcript: Transcript,

    /// What the planner remembers
    pub memory: Conversation,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            transcript: Transcript::new(),
            memory: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Title derived from the first user entry
    pub fn title(&self) -> String {
        self.transcript
            .entries()
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| {
                let preview: String = t.content.chars().take(50).collect();
                if t.content.chars().count() > 50 {
                    format!("{preview}...")
                } else {
                    preview
                }
            })
            .unwrap_or_else(|| format!("Session {}", &self.id.0[..8.min(self.id.0.len())]))
    }

    /// Drop transcript and memory history; the system prompt survives
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.memory.clear_history();
        self.touch();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
