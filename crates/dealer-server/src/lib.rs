//! # dealer-server
//!
//! Outer surfaces of the dealer assistant: an axum HTTP/WebSocket API and
//! a terminal chat, both driving `SessionController`s over the ReAct
//! `Agent` and the car-advisor tools.

pub mod config;
pub mod handlers;
pub mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{Agent, AgentBuilder, LlmProvider, ToolRegistry};
use car_advisor::DEALER_SYSTEM_PROMPT;

use crate::config::ServerConfig;
use crate::handlers::{
    create_session, delete_session, get_session, health_check, list_tools, reset_session,
    send_message, session_stream,
};
use crate::state::AppState;

/// Install the `RUST_LOG`-driven subscriber
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Register the dealer tools and build the planner over `provider`
pub fn build_agent(
    config: &ServerConfig,
    provider: Arc<dyn LlmProvider>,
) -> agent_core::Result<(Arc<ToolRegistry>, Arc<Agent>)> {
    let mut tools = ToolRegistry::new();
    car_advisor::register_tools(&mut tools);
    let tools = Arc::new(tools);

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(Arc::clone(&tools))
        .system_prompt(DEALER_SYSTEM_PROMPT)
        .model(config.provider.model.clone())
        .max_iterations(config.max_iterations)
        .build()?;

    Ok((tools, Arc::new(agent)))
}

/// API routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/messages", post(send_message))
        .route("/api/sessions/{id}/reset", post(reset_session))
        .route("/api/sessions/{id}/stream", get(session_stream))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
