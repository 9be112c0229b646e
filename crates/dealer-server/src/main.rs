//! Dealer assistant HTTP server
//!
//! Axum server exposing chat sessions over REST and WebSocket.

use std::sync::Arc;

use dealer_server::{build_agent, config::ServerConfig, init_tracing, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    init_tracing("info,tower_http=debug");

    let config = ServerConfig::from_env()?;
    let provider = config.provider.build()?;

    // Verify the backend before taking traffic
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {} ({})", provider.name(), config.provider.model),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - turns will fail until it is", provider.name());
        }
    }

    let (tools, agent) = build_agent(&config, Arc::clone(&provider))?;
    let state = AppState::new(provider, tools, agent, config.controller.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚗 dealer assistant running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                    - Health check");
    tracing::info!("  GET    /api/tools                 - Tool catalog");
    tracing::info!("  POST   /api/sessions              - Start a session");
    tracing::info!("  GET    /api/sessions/{{id}}         - Transcript");
    tracing::info!("  POST   /api/sessions/{{id}}/messages - Send message");
    tracing::info!("  POST   /api/sessions/{{id}}/reset   - Reset session");
    tracing::info!("  DELETE /api/sessions/{{id}}         - Close session");
    tracing::info!("  GET    /api/sessions/{{id}}/stream  - WebSocket turns");

    axum::serve(listener, app).await?;

    Ok(())
}
