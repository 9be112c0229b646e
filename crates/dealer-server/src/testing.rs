//! Planners and a provider for exercising the routes offline

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream;

use agent_core::{
    AgentAction, AgentError, ControllerConfig, Conversation, LlmProvider, Message, Planner,
    PlannerEvent, PlannerStream, ToolRegistry,
    provider::{Completion, GenerationOptions},
};

use crate::state::AppState;

pub const AVANZA_ANSWER: &str = "Harga Avanza adalah Rp 250,000,000 dan stoknya 5 unit.";

/// Looks up the Avanza price and stock, then answers
#[derive(Default)]
pub struct CannedPlanner;

impl Planner for CannedPlanner {
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a> {
        memory.push(Message::user(input));
        memory.push(Message::assistant(AVANZA_ANSWER));
        let events: Vec<agent_core::Result<PlannerEvent>> = vec![
            Ok(PlannerEvent::Actions(vec![AgentAction::new("cek_harga_mobil", "model=Avanza")])),
            Ok(PlannerEvent::Actions(vec![AgentAction::new("cek_stok_mobil", "model=Avanza")])),
            Ok(PlannerEvent::Output(AVANZA_ANSWER.into())),
        ];
        Box::pin(stream::iter(events))
    }
}

/// Fails every run with a non-retryable provider error
pub struct BrokenPlanner;

impl Planner for BrokenPlanner {
    fn stream<'a>(&'a self, _input: &'a str, _memory: &'a mut Conversation) -> PlannerStream<'a> {
        let events: Vec<agent_core::Result<PlannerEvent>> =
            vec![Err(AgentError::Provider("422 Unprocessable Entity".into()))];
        Box::pin(stream::iter(events))
    }
}

/// First run never yields; later runs behave like [`CannedPlanner`]
#[derive(Default)]
pub struct StallOncePlanner {
    stalled: AtomicBool,
    canned: CannedPlanner,
}

impl Planner for StallOncePlanner {
    fn stream<'a>(&'a self, input: &'a str, memory: &'a mut Conversation) -> PlannerStream<'a> {
        if self.stalled.swap(true, Ordering::SeqCst) {
            self.canned.stream(input, memory)
        } else {
            Box::pin(stream::pending::<agent_core::Result<PlannerEvent>>())
        }
    }
}

pub struct OfflineProvider;

#[async_trait]
impl LlmProvider for OfflineProvider {
    fn name(&self) -> &str {
        "Offline"
    }

    async fn health_check(&self) -> agent_core::Result<bool> {
        Ok(false)
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &GenerationOptions,
    ) -> agent_core::Result<Completion> {
        Err(AgentError::ProviderUnavailable("offline".into()))
    }
}

pub fn app_state(planner: Arc<dyn Planner>) -> AppState {
    let mut tools = ToolRegistry::new();
    car_advisor::register_tools(&mut tools);
    AppState::new(
        Arc::new(OfflineProvider),
        Arc::new(tools),
        planner,
        ControllerConfig::default(),
    )
}
