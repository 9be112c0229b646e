//! Error Types

use thiserror::Error;

use crate::input::ToolInputError;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool input could not be decomposed into fields
    #[error("Tool input error: {0}")]
    ToolInput(#[from] ToolInputError),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Planner stream ended without a usable answer
    #[error("Planner error: {0}")]
    Planner(String),

    /// Parse error (e.g., tool call parsing)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::ProviderUnavailable(_)
                | AgentError::RateLimited(_)
                | AgentError::Io(_)
        )
    }

    /// Convert to a message fit for the customer-facing transcript
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(_) | AgentError::Planner(_) | AgentError::Parse(_) => {
                "Layanan asisten sedang mengalami gangguan.".into()
            }
            AgentError::ProviderUnavailable(_) => {
                "Layanan asisten sedang tidak tersedia. Silakan coba beberapa saat lagi.".into()
            }
            AgentError::ToolNotFound(name) => format!("Fitur '{name}' tidak tersedia."),
            AgentError::ToolInput(err) => format!("Format permintaan tidak valid: {err}"),
            AgentError::MaxIterations(_) => {
                "Permintaan Anda terlalu rumit untuk diproses. Silakan ajukan pertanyaan yang lebih sederhana.".into()
            }
            AgentError::RateLimited(_) => {
                "Terlalu banyak permintaan. Mohon tunggu sebentar.".into()
            }
            AgentError::Auth(_) | AgentError::Config(_) => {
                "Layanan asisten belum dikonfigurasi dengan benar.".into()
            }
            AgentError::Session(msg) => format!("Sesi tidak dapat diproses: {msg}"),
            _ => "Terjadi kesalahan yang tidak terduga.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AgentError::ProviderUnavailable("down".into()).is_retryable());
        assert!(AgentError::RateLimited("429".into()).is_retryable());
        assert!(!AgentError::Provider("bad request".into()).is_retryable());
        assert!(!AgentError::MaxIterations(10).is_retryable());
    }

    #[test]
    fn test_input_error_converts() {
        let err: AgentError = ToolInputError::MissingField("model".into()).into();
        assert!(matches!(err, AgentError::ToolInput(_)));
        assert!(err.user_message().contains("model"));
    }
}
