//! # agent-core
//!
//! Planner contract, tool protocol and session turn loop for the dealer
//! assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     SessionController                        │
//! │  ┌────────────┐   ┌──────────────────┐   ┌───────────────┐   │
//! │  │ Transcript │◄──│ Turn loop        │──►│ Planner       │   │
//! │  │ (entries)  │   │ Idle → Awaiting  │   │ (Strategy)    │   │
//! │  └────────────┘   │ → Done           │   └──────┬────────┘   │
//! │                   └──────────────────┘          │            │
//! └─────────────────────────────────────────────────┼────────────┘
//!                          ┌────────────────────────┴─────┐
//!                          │ Agent: ReAct over LlmProvider│
//!                          │ + ToolRegistry (k=v;k=v)     │
//!                          └──────────────────────────────┘
//! ```
//!
//! The `Planner` trait is the only thing the controller knows about
//! reasoning; `LlmProvider` is the only thing the `Agent` knows about the
//! model backend.

pub mod controller;
pub mod error;
pub mod input;
pub mod message;
pub mod planner;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ControllerConfig, SessionController, TurnObserver, TurnReport, TurnState, TurnStatus};
pub use error::{AgentError, Result};
pub use input::{ToolInput, ToolInputError};
pub use message::{Conversation, Message, Role};
pub use planner::{AgentAction, Planner, PlannerEvent, PlannerStream};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use session::{Session, SessionId};
pub use tool::{FieldSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use transcript::{Transcript, Turn, TurnKind};
