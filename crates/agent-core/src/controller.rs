//! Session Controller
//!
//! Drives one user turn at a time through
//! `Idle → AwaitingPlannerEvents → Done → Idle`:
//!
//! 1. the user entry is appended before the planner is consulted;
//! 2. every announced tool action is appended as it arrives;
//! 3. the final output is appended last.
//!
//! Planner failures never escape a turn. They become one apologetic entry
//! and the session stays usable. A turn whose future is dropped midway
//! (a disconnected client) is closed the same way.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{AgentError, Result};
use crate::message::Conversation;
use crate::planner::{Planner, PlannerEvent};
use crate::session::{Session, SessionId};
use crate::transcript::{Transcript, Turn};

/// Turn state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingPlannerEvents,
    Done,
}

/// Receives entries as soon as they are appended
pub trait TurnObserver: Send {
    fn on_entry(&mut self, turn: &Turn);

    fn on_state(&mut self, _state: TurnState) {}
}

impl TurnObserver for () {
    fn on_entry(&mut self, _turn: &Turn) {}
}

impl TurnObserver for Vec<Turn> {
    fn on_entry(&mut self, turn: &Turn) {
        self.push(turn.clone());
    }
}

impl TurnObserver for mpsc::UnboundedSender<Turn> {
    fn on_entry(&mut self, turn: &Turn) {
        // Receiver gone means nobody is watching; the transcript still has it
        let _ = self.send(turn.clone());
    }
}

/// Controller tuning
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Extra planner attempts for retryable failures before anything was shown
    pub planner_retries: u32,

    /// Base delay between attempts, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            planner_retries: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// How a turn ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Failed { reason: String },
}

/// Entries appended by one turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnReport {
    #[serde(flatten)]
    pub status: TurnStatus,
    pub entries: Vec<Turn>,
}

/// Failure of one planner attempt
struct AttemptError {
    error: AgentError,
    /// Whether any entry of this attempt already reached the transcript
    emitted: bool,
}

const APOLOGY: &str = "Mohon maaf, permintaan Anda belum dapat diproses.";

/// Closes a turn whose future was dropped before the planner finished.
///
/// The abandoned turn gets its apology entry and the controller returns to
/// `Idle`, so the next `submit` is accepted.
struct TurnGuard<'c> {
    controller: &'c mut SessionController,
    finished: bool,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let ctl = &mut *self.controller;
        tracing::warn!(session = %ctl.session.id, "Turn abandoned before completion");
        ctl.session
            .transcript
            .append(Turn::error(format!("{APOLOGY} Permintaan terputus sebelum selesai.")));
        ctl.session.touch();
        ctl.state = TurnState::Idle;
    }
}

/// Owns one session and serializes its turns
pub struct SessionController {
    planner: Arc<dyn Planner>,
    session: Session,
    state: TurnState,
    config: ControllerConfig,
}

impl SessionController {
    pub fn new(planner: Arc<dyn Planner>, config: ControllerConfig) -> Self {
        Self::with_session(planner, config, Session::new())
    }

    pub fn with_session(planner: Arc<dyn Planner>, config: ControllerConfig, mut session: Session) -> Self {
        if let Some(prompt) = planner.system_prompt() {
            session.memory.ensure_system_prompt(prompt);
        }
        Self {
            planner,
            session,
            state: TurnState::Idle,
            config,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.session.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.session.transcript
    }

    pub fn memory(&self) -> &Conversation {
        &self.session.memory
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Run one user turn, reporting entries to `observer` as they appear
    pub async fn submit<O>(&mut self, input: &str, observer: &mut O) -> Result<TurnReport>
    where
        O: TurnObserver + ?Sized,
    {
        if self.state != TurnState::Idle {
            return Err(AgentError::Session(
                "a turn is already in progress for this session".into(),
            ));
        }

        let start = self.session.transcript.len();
        self.transition(TurnState::AwaitingPlannerEvents, observer);
        Self::append(&mut self.session.transcript, Turn::user(input), observer);
        tracing::info!(session = %self.session.id, "Turn started");

        let mut turn = TurnGuard {
            controller: &mut *self,
            finished: false,
        };
        let status = turn.controller.conclude(input, observer).await;
        turn.finished = true;
        drop(turn);

        self.session.touch();
        self.transition(TurnState::Done, observer);
        self.transition(TurnState::Idle, observer);

        let entries = self.session.transcript.since(start).to_vec();
        tracing::info!(session = %self.session.id, entries = entries.len(), "Turn finished");
        Ok(TurnReport { status, entries })
    }

    /// Clear transcript and planner memory. Idempotent.
    pub fn reset(&mut self) {
        if self.state != TurnState::Idle {
            tracing::warn!(session = %self.session.id, state = ?self.state, "Reset during unfinished turn");
        }
        self.session.reset();
        self.state = TurnState::Idle;
        tracing::info!(session = %self.session.id, "Session reset");
    }

    /// Drive the planner to an outcome, turning failure into an apology entry
    async fn conclude<O>(&mut self, input: &str, observer: &mut O) -> TurnStatus
    where
        O: TurnObserver + ?Sized,
    {
        match self.drive(input, observer).await {
            Ok(()) => TurnStatus::Completed,
            Err(e) => {
                tracing::error!(session = %self.session.id, error = %e, "Planner failed");
                let apology = format!("{APOLOGY} {}", e.user_message());
                Self::append(&mut self.session.transcript, Turn::error(apology), observer);
                TurnStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run the planner, retrying retryable failures that showed nothing yet
    async fn drive<O>(&mut self, input: &str, observer: &mut O) -> Result<()>
    where
        O: TurnObserver + ?Sized,
    {
        let mut attempt = 0;

        loop {
            let Session {
                transcript, memory, ..
            } = &mut self.session;

            match Self::attempt(self.planner.as_ref(), input, memory, transcript, observer).await {
                Ok(()) => return Ok(()),
                Err(AttemptError { error, emitted })
                    if !emitted && error.is_retryable() && attempt < self.config.planner_retries =>
                {
                    attempt += 1;
                    tracing::warn!(attempt, error = %error, "Retrying planner");
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(AttemptError { error, .. }) => return Err(error),
            }
        }
    }

    async fn attempt<O>(
        planner: &dyn Planner,
        input: &str,
        memory: &mut Conversation,
        transcript: &mut Transcript,
        observer: &mut O,
    ) -> std::result::Result<(), AttemptError>
    where
        O: TurnObserver + ?Sized,
    {
        let mut events = planner.stream(input, memory);
        let mut emitted = false;

        while let Some(event) = events.next().await {
            match event {
                Ok(PlannerEvent::Actions(actions)) => {
                    for action in actions {
                        tracing::debug!(tool = %action.tool, input = %action.tool_input, "Planner action");
                        Self::append(transcript, Turn::tool_action(action), observer);
                        emitted = true;
                    }
                }
                Ok(PlannerEvent::Output(answer)) => {
                    Self::append(transcript, Turn::assistant(answer), observer);
                    return Ok(());
                }
                Err(error) => return Err(AttemptError { error, emitted }),
            }
        }

        Err(AttemptError {
            error: AgentError::Planner("stream ended without a final answer".into()),
            emitted,
        })
    }

    fn append<O>(transcript: &mut Transcript, turn: Turn, observer: &mut O)
    where
        O: TurnObserver + ?Sized,
    {
        observer.on_entry(&turn);
        transcript.append(turn);
    }

    fn transition<O>(&mut self, state: TurnState, observer: &mut O)
    where
        O: TurnObserver + ?Sized,
    {
        self.state = state;
        observer.on_state(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::planner::AgentAction;
    use crate::reasoning::AgentBuilder;
    use crate::testing::{EchoTool, ScriptedPlanner, ScriptedProvider, StallingPlanner};
    use crate::tool::ToolRegistry;
    use crate::transcript::TurnKind;

    fn quick_config() -> ControllerConfig {
        ControllerConfig {
            planner_retries: 1,
            retry_backoff: Duration::ZERO,
        }
    }

    fn controller(turns: Vec<Vec<Result<PlannerEvent>>>) -> SessionController {
        SessionController::new(Arc::new(ScriptedPlanner::new(turns)), quick_config())
    }

    fn two_actions_then_output() -> Vec<Result<PlannerEvent>> {
        vec![
            Ok(PlannerEvent::Actions(vec![AgentAction::new("cek_harga_mobil", "model=Avanza")])),
            Ok(PlannerEvent::Actions(vec![AgentAction::new("cek_stok_mobil", "model=Avanza")])),
            Ok(PlannerEvent::Output("Avanza tersedia.".into())),
        ]
    }

    #[derive(Default)]
    struct Recorder {
        entries: Vec<String>,
        states: Vec<TurnState>,
    }

    impl TurnObserver for Recorder {
        fn on_entry(&mut self, turn: &Turn) {
            self.entries.push(turn.content.clone());
        }

        fn on_state(&mut self, state: TurnState) {
            self.states.push(state);
        }
    }

    #[tokio::test]
    async fn test_turn_ordering() {
        let mut ctl = controller(vec![two_actions_then_output()]);

        let report = ctl.submit("Harga dan stok Avanza?", &mut ()).await.unwrap();
        assert_eq!(report.status, TurnStatus::Completed);
        assert_eq!(report.entries.len(), 4);

        let entries = ctl.transcript().entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].content, "Harga dan stok Avanza?");
        assert!(matches!(&entries[1].kind, TurnKind::ToolAction { tool, .. } if tool == "cek_harga_mobil"));
        assert!(matches!(&entries[2].kind, TurnKind::ToolAction { tool, .. } if tool == "cek_stok_mobil"));
        assert_eq!(entries[3].kind, TurnKind::Message);
        assert_eq!(entries[3].content, "Avanza tersedia.");
    }

    #[tokio::test]
    async fn test_observer_sees_entries_and_states_in_order() {
        let mut ctl = controller(vec![two_actions_then_output()]);
        let mut recorder = Recorder::default();

        ctl.submit("halo", &mut recorder).await.unwrap();
        assert_eq!(recorder.entries.len(), 4);
        assert_eq!(recorder.entries[0], "halo");
        assert_eq!(recorder.entries[3], "Avanza tersedia.");
        assert_eq!(
            recorder.states,
            [TurnState::AwaitingPlannerEvents, TurnState::Done, TurnState::Idle]
        );
        assert_eq!(ctl.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_channel_observer() {
        let mut ctl = controller(vec![two_actions_then_output()]);
        let (mut tx, mut rx) = mpsc::unbounded_channel();

        ctl.submit("halo", &mut tx).await.unwrap();
        drop(tx);

        let mut seen = Vec::new();
        while let Some(turn) = rx.recv().await {
            seen.push(turn.content);
        }
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test]
    async fn test_planner_failure_becomes_apology() {
        let mut ctl = controller(vec![
            vec![Err(AgentError::Provider("500".into()))],
            vec![Ok(PlannerEvent::Output("Halo!".into()))],
        ]);

        let report = ctl.submit("halo", &mut ()).await.unwrap();
        assert!(matches!(report.status, TurnStatus::Failed { .. }));
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].kind, TurnKind::Error);
        assert!(report.entries[1].content.starts_with("Mohon maaf"));

        // Session stays usable
        let report = ctl.submit("halo lagi", &mut ()).await.unwrap();
        assert_eq!(report.status, TurnStatus::Completed);
        assert_eq!(ctl.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_stream_without_output_is_failure() {
        let mut ctl = controller(vec![vec![Ok(PlannerEvent::Actions(vec![AgentAction::new(
            "cek_stok_mobil",
            "model=Civic",
        )]))]]);

        let report = ctl.submit("stok civic", &mut ()).await.unwrap();
        assert!(matches!(report.status, TurnStatus::Failed { .. }));
        let kinds: Vec<_> = report.entries.iter().map(|t| t.is_tool_action()).collect();
        assert_eq!(kinds, [false, true, false]);
    }

    #[tokio::test]
    async fn test_retryable_failure_is_retried() {
        let mut ctl = controller(vec![
            vec![Err(AgentError::ProviderUnavailable("timeout".into()))],
            vec![Ok(PlannerEvent::Output("Berhasil.".into()))],
        ]);

        let report = ctl.submit("halo", &mut ()).await.unwrap();
        assert_eq!(report.status, TurnStatus::Completed);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].content, "Berhasil.");
    }

    #[tokio::test]
    async fn test_no_retry_after_actions_were_shown() {
        let mut ctl = controller(vec![
            vec![
                Ok(PlannerEvent::Actions(vec![AgentAction::new("cek_harga_mobil", "model=Agya")])),
                Err(AgentError::ProviderUnavailable("timeout".into())),
            ],
            vec![Ok(PlannerEvent::Output("tidak boleh terpakai".into()))],
        ]);

        let report = ctl.submit("harga agya", &mut ()).await.unwrap();
        assert!(matches!(report.status, TurnStatus::Failed { .. }));
        assert_eq!(report.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let mut ctl = controller(vec![two_actions_then_output()]);
        ctl.submit("halo", &mut ()).await.unwrap();
        assert_eq!(ctl.memory().len(), 3);

        ctl.reset();
        let once = (ctl.transcript().len(), ctl.memory().len(), ctl.state());
        ctl.reset();
        let twice = (ctl.transcript().len(), ctl.memory().len(), ctl.state());

        assert_eq!(once, (0, 1, TurnState::Idle));
        assert_eq!(once, twice);
        assert_eq!(ctl.memory().messages()[0].content, "scripted");
    }

    #[tokio::test]
    async fn test_unfinished_state_rejects_until_reset() {
        let mut ctl = controller(vec![
            two_actions_then_output(),
            vec![Ok(PlannerEvent::Output("ok".into()))],
        ]);

        ctl.state = TurnState::AwaitingPlannerEvents;
        assert!(matches!(
            ctl.submit("lagi", &mut ()).await,
            Err(AgentError::Session(_))
        ));

        ctl.reset();
        assert!(ctl.submit("lagi", &mut ()).await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_turn_leaves_session_usable() {
        let mut ctl = SessionController::new(Arc::new(StallingPlanner::default()), quick_config());

        let stalled = tokio::time::timeout(Duration::from_millis(50), ctl.submit("halo", &mut ())).await;
        assert!(stalled.is_err());

        assert_eq!(ctl.state(), TurnState::Idle);
        let entries = ctl.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "halo");
        assert_eq!(entries[1].kind, TurnKind::Error);
        assert!(entries[1].content.starts_with("Mohon maaf"));

        let report = ctl.submit("halo lagi", &mut ()).await.unwrap();
        assert_eq!(report.status, TurnStatus::Completed);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].content, "Siap membantu.");
        assert_eq!(ctl.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_end_to_end_with_react_agent() {
        let provider = Arc::new(ScriptedProvider::new([
            Ok("```tool\n{\"tool\": \"echo\", \"tool_input\": \"text=satu\"}\n```\n\
                ```tool\n{\"tool\": \"echo\", \"tool_input\": \"text=dua\"}\n```"
                .to_string()),
            Ok("Selesai.".to_string()),
        ]));
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);
        let agent = AgentBuilder::new()
            .provider(provider)
            .tools(Arc::new(tools))
            .build()
            .unwrap();

        let mut ctl = SessionController::new(Arc::new(agent), quick_config());
        let report = ctl.submit("tolong cek", &mut ()).await.unwrap();

        let contents: Vec<_> = report.entries.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(
            contents,
            [
                "tolong cek",
                "🛠 **echo**: `text=satu`",
                "🛠 **echo**: `text=dua`",
                "Selesai.",
            ]
        );
        // system prompt + user + final answer
        assert_eq!(ctl.memory().len(), 3);
    }
}
