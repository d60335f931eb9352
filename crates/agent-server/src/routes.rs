//! Router

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    chat_handler, chat_stream_handler, clear_conversation, conversation_history, health_check,
    list_files, read_file, root,
};
use crate::state::AppState;

/// Credentialed CORS for the listed browser origins
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Health & info
        .route("/", get(root))
        .route("/health", get(health_check))

        // Agent API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", post(chat_stream_handler))
        .route("/api/conversation/history/{session_id}", get(conversation_history))
        .route("/api/conversation/{session_id}", delete(clear_conversation))

        // Files
        .route("/api/files/read", post(read_file))
        .route("/api/files/list", post(list_files))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
