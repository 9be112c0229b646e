//! # agent-runtime
//!
//! Model backends for the dealer assistant.
//!
//! ## Providers
//!
//! - **Replicate** (default): hosted models through the predictions API
//! - **Ollama** (`ollama` feature): local inference
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::ProviderConfig;
//!
//! let provider = ProviderConfig::from_env()?.build()?;
//! let agent = AgentBuilder::new()
//!     .provider(provider)
//!     .tools(registry)
//!     .build()?;
//! ```

pub mod config;
pub mod replicate;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use config::{Backend, OllamaConfig, ProviderConfig};
pub use replicate::{ReplicateConfig, ReplicateProvider};

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;
