//! Ollama LLM Provider
//!
//! Local inference through an Ollama daemon. Tool observations are sent as
//! user turns carrying the same `Observation:` label the Replicate prompt
//! uses, so the ReAct stop sequence applies to both backends.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
    models::ModelOptions as OllamaOptions,
    Ollama,
};

use crate::config::OllamaConfig;

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    endpoint: String,
}

impl OllamaProvider {
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            client: Ollama::new(&config.host, config.port),
            endpoint: format!("{}:{}", config.host, config.port),
        }
    }

    fn chat_message(message: &Message) -> ChatMessage {
        match message.role {
            Role::System => ChatMessage::new(MessageRole::System, message.content.clone()),
            Role::User => ChatMessage::new(MessageRole::User, message.content.clone()),
            Role::Assistant => ChatMessage::new(MessageRole::Assistant, message.content.clone()),
            Role::Tool => ChatMessage::new(
                MessageRole::User,
                format!("Observation: {}", message.content),
            ),
        }
    }

    fn options(opts: &GenerationOptions) -> OllamaOptions {
        OllamaOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX))
            .stop(opts.stop_sequences.clone())
    }

    /// Token counts saturate at `u32::MAX` instead of wrapping
    fn usage<T>(prompt: T, completion: T) -> TokenUsage
    where
        u32: TryFrom<T>,
    {
        let prompt_tokens = u32::try_from(prompt).unwrap_or(u32::MAX);
        let completion_tokens = u32::try_from(completion).unwrap_or(u32::MAX);
        TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn health_check(&self) -> Result<bool> {
        if let Err(e) = self.client.list_local_models().await {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "Ollama unreachable");
            return Ok(false);
        }
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatMessageRequest::new(
            options.model.clone(),
            messages.iter().map(Self::chat_message).collect(),
        )
        .options(Self::options(options));

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::ProviderUnavailable(format!("{}: {e}", self.endpoint)))?;

        let usage = response
            .final_data
            .as_ref()
            .map(|d| Self::usage(d.prompt_eval_count, d.eval_count));

        Ok(Completion {
            content: response.message.content,
            model: options.model.clone(),
            usage,
            finish_reason: Some(FinishReason::Stop),
        })
    }
}
