//! HTTP/WebSocket Handlers

use std::fmt::Display;

use axum::{
    Json,
    extract::{Path, State, WebSocketUpgrade, ws::Message},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use agent_core::{SessionController, SessionId, ToolSchema, Turn, TurnReport, TurnState, TurnStatus};

use crate::state::{AppState, SharedController};

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
    pub sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub title: String,
    pub state: TurnState,
    pub entries: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SessionController> for SessionResponse {
    fn from(controller: &SessionController) -> Self {
        let session = controller.session();
        Self {
            session_id: session.id.to_string(),
            title: session.title(),
            state: controller.state(),
            entries: session.transcript.entries().to_vec(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Frame sent by a WebSocket client
#[derive(Debug, Default, Deserialize)]
struct ClientFrame {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        provider_connected,
        sessions: state.sessions.len().await,
    })
}

/// Tool catalog
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let (id, _) = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: id.to_string(),
        }),
    )
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let controller = find_session(&state, &id).await?;
    let controller = controller.lock().await;
    Ok(Json(SessionResponse::from(&*controller)))
}

/// Run one turn and return the entries it appended
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<TurnReport>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_MESSAGE",
            "Pesan tidak boleh kosong.",
        ));
    }

    let controller = find_session(&state, &id).await?;
    let mut controller = controller.lock().await;

    let report = controller.submit(&payload.message, &mut ()).await.map_err(|e| {
        tracing::warn!(session = %id, error = %e, "Turn rejected");
        api_error(StatusCode::CONFLICT, "TURN_IN_PROGRESS", e.user_message())
    })?;

    Ok(Json(report))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let controller = find_session(&state, &id).await?;
    controller.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&SessionId::from_string(id)).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found())
    }
}

/// WebSocket turn stream for one session
pub async fn session_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match find_session(&state, &id).await {
        Ok(controller) => ws.on_upgrade(move |socket| {
            let (sender, receiver) = socket.split();
            handle_stream(sender, receiver, controller)
        }),
        Err(e) => e.into_response(),
    }
}

async fn handle_stream<S, R>(mut sender: S, mut receiver: R, controller: SharedController)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let frame: ClientFrame = match serde_json::from_str(&msg) {
            Ok(frame) => frame,
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string()});
                if send_json(&mut sender, &error).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let delivered = match (frame.kind.as_deref(), frame.message) {
            (Some("reset"), _) => {
                controller.lock().await.reset();
                send_json(&mut sender, &serde_json::json!({"type": "reset"})).await
            }
            (_, Some(message)) if !message.trim().is_empty() => {
                stream_turn(&mut sender, &controller, &message).await
            }
            _ => {
                let error = serde_json::json!({
                    "type": "error",
                    "error": "expected {\"message\": ...} or {\"type\": \"reset\"}",
                });
                send_json(&mut sender, &error).await
            }
        };

        if let Err(e) = delivered {
            tracing::debug!(error = %e, "WebSocket client gone");
            break;
        }
    }
}

/// Run a turn, forwarding each entry as soon as it is appended
async fn stream_turn<S>(
    sender: &mut S,
    controller: &SharedController,
    message: &str,
) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Turn>();

    let turn = async move {
        let mut observer = tx;
        let mut controller = controller.lock().await;
        controller.submit(message, &mut observer).await
    };

    let forward = async {
        let mut delivered = Ok(());
        while let Some(entry) = rx.recv().await {
            if delivered.is_ok() {
                delivered = send_json(sender, &serde_json::json!({"type": "entry", "entry": entry})).await;
            }
        }
        delivered
    };

    let (report, delivered) = tokio::join!(turn, forward);
    delivered?;

    let done = match report {
        Ok(TurnReport {
            status: TurnStatus::Completed,
            ..
        }) => serde_json::json!({"type": "done", "status": "completed"}),
        Ok(TurnReport {
            status: TurnStatus::Failed { reason },
            ..
        }) => serde_json::json!({"type": "done", "status": "failed", "reason": reason}),
        Err(e) => serde_json::json!({"type": "error", "error": e.user_message()}),
    };
    send_json(sender, &done).await
}

async fn send_json<S>(sender: &mut S, value: &serde_json::Value) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    sender.send(Message::Text(value.to_string().into())).await
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedController, ApiError> {
    state
        .sessions
        .get(&SessionId::from_string(id))
        .await
        .ok_or_else(session_not_found)
}

fn session_not_found() -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "SESSION_NOT_FOUND",
        "Sesi tidak ditemukan.",
    )
}
