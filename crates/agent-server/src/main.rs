//! code-assistant HTTP Server
//!
//! Axum-based server exposing the assistant over REST and server-sent
//! events, with one agent per conversation session.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use agent_core::{AgentConfig, LlmProvider};
use agent_runtime::{
    AnthropicProvider,
    logging::{self, LogOptions},
};

use crate::config::ServerConfig;
use crate::state::{AppState, ProviderFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    logging::init(&LogOptions::from_env(true))?;

    let server_config = ServerConfig::from_env();
    let agent_config = AgentConfig::from_env();

    // The credential is checked per session, so the server starts without it
    let provider_factory: ProviderFactory =
        Arc::new(|| -> agent_core::Result<Arc<dyn LlmProvider>> {
            Ok(Arc::new(AnthropicProvider::from_env()?))
        });
    if let Err(e) = AnthropicProvider::from_env() {
        tracing::warn!("⚠ {} - chat requests will fail", e);
        tracing::warn!("  Set ANTHROPIC_API_KEY in .env");
    }

    // Initialize tools
    let tools = file_tools::default_registry();
    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }
    tracing::info!("Model: {}", agent_config.generation.model);

    let state = AppState::new(Arc::new(tools), agent_config, provider_factory);
    let app = routes::router(state, routes::cors_layer(server_config.cors_origins));

    // Start server
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 code-assistant server running on http://{}", server_config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  POST   /api/chat                          - Send message");
    tracing::info!("  POST   /api/chat/stream                   - SSE streaming");
    tracing::info!("  POST   /api/files/read                    - Read a file");
    tracing::info!("  POST   /api/files/list                    - List a directory");
    tracing::info!("  GET    /api/conversation/history/:session - Session history");
    tracing::info!("  DELETE /api/conversation/:session         - Clear a session");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
