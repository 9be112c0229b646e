//! Application State

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use agent_core::{ControllerConfig, LlmProvider, Planner, SessionController, SessionId, ToolRegistry};

/// One conversation; turns and resets on it run one at a time
pub type SharedController = Arc<Mutex<SessionController>>;

/// Live sessions, keyed by id
pub struct SessionManager {
    planner: Arc<dyn Planner>,
    config: ControllerConfig,
    sessions: RwLock<HashMap<SessionId, SharedController>>,
}

impl SessionManager {
    pub fn new(planner: Arc<dyn Planner>, config: ControllerConfig) -> Self {
        Self {
            planner,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh session
    pub async fn create(&self) -> (SessionId, SharedController) {
        let controller = SessionController::new(Arc::clone(&self.planner), self.config.clone());
        let id = controller.id().clone();
        let shared = Arc::new(Mutex::new(controller));

        self.sessions.write().await.insert(id.clone(), Arc::clone(&shared));
        tracing::info!(session = %id, "Session created");
        (id, shared)
    }

    pub async fn get(&self, id: &SessionId) -> Option<SharedController> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Model backend, for health reporting
    pub provider: Arc<dyn LlmProvider>,

    /// Dealer tools, for the catalog endpoint
    pub tools: Arc<ToolRegistry>,

    /// Conversations in progress
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        planner: Arc<dyn Planner>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            sessions: Arc::new(SessionManager::new(planner, config)),
        }
    }
}
