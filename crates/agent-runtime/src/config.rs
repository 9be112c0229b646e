//! Provider Configuration
//!
//! Selects and validates the reasoning backend from the environment.
//! Missing credentials fail here, at start-up, instead of on the first turn.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `DEALER_BOT_PROVIDER` | `replicate` (default) or `ollama` |
//! | `REPLICATE_API_TOKEN` | required for `replicate` |
//! | `REPLICATE_BASE_URL` | optional API base override |
//! | `OLLAMA_HOST` / `OLLAMA_PORT` | Ollama endpoint |
//! | `REPLICATE_MODEL` | Replicate model id |
//! | `DEALER_BOT_MODEL` | model id override for either backend |

use std::sync::Arc;

use agent_core::provider::DEFAULT_MODEL;
use agent_core::{AgentError, LlmProvider, Result};

#[cfg(feature = "ollama")]
use crate::ollama::OllamaProvider;
use crate::replicate::{ReplicateConfig, ReplicateProvider};

const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
        }
    }
}

/// Backend-specific settings
#[derive(Clone, Debug)]
pub enum Backend {
    Replicate(ReplicateConfig),
    Ollama(OllamaConfig),
}

/// Which backend to talk to and which model to ask for
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub backend: Backend,
    pub model: String,
}

impl ProviderConfig {
    /// Read from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup (blank values count as unset)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = get("DEALER_BOT_PROVIDER").unwrap_or_else(|| "replicate".into());
        match kind.to_ascii_lowercase().as_str() {
            "replicate" => {
                let token = get("REPLICATE_API_TOKEN").ok_or_else(|| {
                    AgentError::Config(
                        "REPLICATE_API_TOKEN must be set to use the Replicate provider".into(),
                    )
                })?;
                let mut config = ReplicateConfig::new(token);
                if let Some(base_url) = get("REPLICATE_BASE_URL") {
                    config.base_url = base_url.trim_end_matches('/').to_string();
                }
                let model = get("DEALER_BOT_MODEL")
                    .or_else(|| get("REPLICATE_MODEL"))
                    .unwrap_or_else(|| DEFAULT_MODEL.into());
                Ok(Self {
                    backend: Backend::Replicate(config),
                    model,
                })
            }
            "ollama" => {
                let mut config = OllamaConfig::default();
                if let Some(host) = get("OLLAMA_HOST") {
                    config.host = host;
                }
                if let Some(port) = get("OLLAMA_PORT") {
                    config.port = port.parse().map_err(|_| {
                        AgentError::Config(format!("OLLAMA_PORT is not a valid port: {port}"))
                    })?;
                }
                Ok(Self {
                    backend: Backend::Ollama(config),
                    model: get("DEALER_BOT_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
                })
            }
            other => Err(AgentError::Config(format!(
                "unknown DEALER_BOT_PROVIDER '{other}', expected 'replicate' or 'ollama'"
            ))),
        }
    }

    /// Construct the configured provider
    pub fn build(&self) -> Result<Arc<dyn LlmProvider>> {
        match &self.backend {
            Backend::Replicate(config) => {
                Ok(Arc::new(ReplicateProvider::from_config(config.clone())?))
            }
            #[cfg(feature = "ollama")]
            Backend::Ollama(config) => Ok(Arc::new(OllamaProvider::from_config(config))),
            #[cfg(not(feature = "ollama"))]
            Backend::Ollama(_) => Err(AgentError::Config(
                "built without the `ollama` feature".into(),
            )),
        }
    }
}
