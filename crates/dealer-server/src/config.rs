//! Server Configuration
//!
//! Everything is read once at start-up; a bad value stops the process
//! before the first customer message.

use agent_core::{AgentError, ControllerConfig, Result};
use agent_runtime::ProviderConfig;

/// Process-wide settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`)
    pub bind_addr: String,

    /// Reasoning backend and model
    pub provider: ProviderConfig,

    /// Model calls allowed per turn (`DEALER_BOT_MAX_ITERATIONS`)
    pub max_iterations: usize,

    /// Turn loop tuning (`DEALER_BOT_PLANNER_RETRIES`)
    pub controller: ControllerConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = ProviderConfig::from_lookup(&lookup)?;

        let max_iterations = match get("DEALER_BOT_MAX_ITERATIONS") {
            Some(raw) => parse_setting::<usize>("DEALER_BOT_MAX_ITERATIONS", &raw)?,
            None => 10,
        };
        if max_iterations == 0 {
            return Err(AgentError::Config(
                "DEALER_BOT_MAX_ITERATIONS must be at least 1".into(),
            ));
        }

        let mut controller = ControllerConfig::default();
        if let Some(raw) = get("DEALER_BOT_PLANNER_RETRIES") {
            controller.planner_retries = parse_setting("DEALER_BOT_PLANNER_RETRIES", &raw)?;
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            provider,
            max_iterations,
            controller,
        })
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AgentError::Config(format!("{key} is not a valid number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        ServerConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("REPLICATE_API_TOKEN", "r8_abc")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.controller.planner_retries, 1);
        assert_eq!(config.provider.model, "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("REPLICATE_API_TOKEN", "r8_abc"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DEALER_BOT_MAX_ITERATIONS", "4"),
            ("DEALER_BOT_PLANNER_RETRIES", "0"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.controller.planner_retries, 0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config(&[]).is_err());
        assert!(config(&[
            ("REPLICATE_API_TOKEN", "r8_abc"),
            ("DEALER_BOT_MAX_ITERATIONS", "0"),
        ])
        .is_err());
        assert!(config(&[
            ("REPLICATE_API_TOKEN", "r8_abc"),
            ("DEALER_BOT_PLANNER_RETRIES", "sekali"),
        ])
        .is_err());
    }
}
