//! Replicate LLM Provider
//!
//! Runs hosted models through the Replicate predictions API. The request
//! asks the server to hold the connection (`Prefer: wait`); predictions that
//! are still running after that are polled until they settle.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, GenerationOptions, LlmProvider},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// Replicate provider configuration
#[derive(Clone)]
pub struct ReplicateConfig {
    /// API token (`REPLICATE_API_TOKEN`)
    pub api_token: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Delay between polls of an unfinished prediction
    pub poll_interval: Duration,

    /// Polls before giving up on a prediction
    pub max_polls: u32,
}

impl ReplicateConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: "https://api.replicate.com/v1".into(),
            timeout_secs: 120,
            poll_interval: Duration::from_secs(1),
            max_polls: 60,
        }
    }
}

impl std::fmt::Debug for ReplicateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicateConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_polls", &self.max_polls)
            .finish_non_exhaustive()
    }
}

/// Prediction as returned by the API
#[derive(Debug, Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

/// Replicate LLM provider
pub struct ReplicateProvider {
    client: reqwest::Client,
    config: ReplicateConfig,
}

impl ReplicateProvider {
    /// Create from configuration
    pub fn from_config(config: ReplicateConfig) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(AgentError::Config("Replicate API token is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Split messages into Replicate's `system_prompt` and a dialogue prompt
    fn render_prompt(messages: &[Message]) -> (String, String) {
        let mut system = Vec::new();
        let mut dialogue = String::new();

        for message in messages {
            let label = match message.role {
                Role::System => {
                    system.push(message.content.as_str());
                    continue;
                }
                Role::User => "Human",
                Role::Assistant => "Assistant",
                Role::Tool => "Observation",
            };
            dialogue.push_str(&format!("{label}: {}\n\n", message.content));
        }
        dialogue.push_str("Assistant:");

        (system.join("\n\n"), dialogue)
    }

    /// Streaming-capable models return a list of token strings
    fn collect_output(output: Option<serde_json::Value>) -> String {
        match output {
            Some(serde_json::Value::String(text)) => text,
            Some(serde_json::Value::Array(parts)) => parts
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    fn status_error(status: StatusCode, body: &str) -> AgentError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(body.to_string()),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(body.to_string()),
            s if s.is_server_error() => AgentError::ProviderUnavailable(format!("{s}: {body}")),
            s => AgentError::Provider(format!("{s}: {body}")),
        }
    }

    fn transport_error(err: &reqwest::Error) -> AgentError {
        if err.is_timeout() || err.is_connect() {
            AgentError::ProviderUnavailable(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }
        response
            .json::<Prediction>()
            .await
            .map_err(|e| AgentError::Parse(format!("Replicate response: {e}")))
    }

    /// Poll until the prediction leaves `starting` / `processing`
    async fn settle(&self, mut prediction: Prediction) -> Result<Prediction> {
        let mut polls = 0;

        while matches!(prediction.status.as_str(), "starting" | "processing") {
            polls += 1;
            if polls > self.config.max_polls {
                return Err(AgentError::ProviderUnavailable(
                    "Replicate prediction did not finish in time".into(),
                ));
            }

            let url = prediction
                .urls
                .as_ref()
                .and_then(|u| u.get.clone())
                .ok_or_else(|| AgentError::Parse("prediction has no poll URL".into()))?;

            tokio::time::sleep(self.config.poll_interval).await;
            tracing::debug!(polls, "Polling Replicate prediction");

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.config.api_token)
                .send()
                .await
                .map_err(|e| Self::transport_error(&e))?;
            prediction = Self::read_prediction(response).await?;
        }

        Ok(prediction)
    }
}

#[async_trait]
impl LlmProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "Replicate"
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/account", self.config.base_url))
            .bearer_auth(&self.config.api_token)
            .send()
            .await;

        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(e) => {
                tracing::warn!("Replicate health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let (system_prompt, prompt) = Self::render_prompt(messages);
        let body = serde_json::json!({
            "input": {
                "prompt": prompt,
                "system_prompt": system_prompt,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
                "top_p": options.top_p,
                "stop_sequences": options.stop_sequences.join(","),
            }
        });

        let response = self
            .client
            .post(format!(
                "{}/models/{}/predictions",
                self.config.base_url, options.model
            ))
            .bearer_auth(&self.config.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let prediction = self.settle(Self::read_prediction(response).await?).await?;

        match prediction.status.as_str() {
            "succeeded" => Ok(Completion::text(
                Self::collect_output(prediction.output),
                options.model.clone(),
            )),
            status => Err(AgentError::Provider(format!(
                "prediction {status}: {}",
                prediction
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no error detail".into())
            ))),
        }
    }
}
