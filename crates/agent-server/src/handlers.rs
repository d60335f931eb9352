//! HTTP/SSE Handlers

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, SessionId, Turn};
use file_tools::{DirEntryInfo, FileToolError};

use crate::state::AppState;

/// Pause between streamed words
const CHUNK_DELAY: Duration = Duration::from_millis(10);

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: SessionId,
}

/// One SSE frame of a streamed reply
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StreamFrame {
    Chunk { chunk: String, done: bool },
    Error { error: String },
}

#[derive(Debug, Deserialize)]
pub struct ReadFileRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ReadFileResponse {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesRequest {
    #[serde(default = "current_dir")]
    pub path: String,
}

fn current_dir() -> String {
    ".".into()
}

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub path: String,
    pub items: Vec<DirEntryInfo>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn agent_error(err: &AgentError) -> ApiError {
    let code = match err {
        AgentError::Config(_) => "CONFIG_ERROR",
        _ => "AGENT_ERROR",
    };
    api_error(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
}

fn file_error(err: &FileToolError) -> ApiError {
    if err.is_not_found() {
        api_error(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
    } else {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", err.to_string())
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "AI Code Assistant API is running",
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: state.tools.names().into_iter().map(String::from).collect(),
    })
}

/// Run one chat exchange on the session's agent
async fn run_chat(state: &AppState, session_id: &SessionId, message: &str) -> Result<String, AgentError> {
    let agent = state.agent_for(session_id).await?;
    let mut agent = agent.lock().await;
    let reply = agent.chat(message).await;
    state
        .record_history(session_id, agent.transcript().turns().to_vec())
        .await;
    Ok(reply)
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    tracing::info!(session = %payload.session_id, "Chat request");

    let response = run_chat(&state, &payload.session_id, &payload.message)
        .await
        .map_err(|e| {
            tracing::error!("Chat error: {}", e);
            agent_error(&e)
        })?;

    Ok(Json(ChatResponse {
        response,
        session_id: payload.session_id,
    }))
}

/// Split a reply into display chunks; every word but the last keeps a
/// trailing space, followed by a terminating empty `done` frame
pub fn word_frames(reply: &str) -> Vec<StreamFrame> {
    let words: Vec<&str> = reply.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| StreamFrame::Chunk {
            chunk: if i == last { (*word).to_owned() } else { format!("{word} ") },
            done: false,
        })
        .chain(std::iter::once(StreamFrame::Chunk {
            chunk: String::new(),
            done: true,
        }))
        .collect()
}

/// Streaming chat endpoint (SSE)
///
/// The full reply is produced first and then re-emitted word by word.
pub async fn chat_stream_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(session = %payload.session_id, "Streaming chat request");

    let frames = match run_chat(&state, &payload.session_id, &payload.message).await {
        Ok(reply) => word_frames(&reply),
        Err(e) => {
            tracing::error!("Streaming chat error: {}", e);
            vec![StreamFrame::Error {
                error: e.to_string(),
            }]
        }
    };

    let events = stream::iter(frames).then(|frame| async move {
        tokio::time::sleep(CHUNK_DELAY).await;
        let event = Event::default()
            .json_data(&frame)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Ok::<_, Infallible>(event)
    });

    Sse::new(events)
}

/// Read a file's contents
pub async fn read_file(Json(payload): Json<ReadFileRequest>) -> Result<Json<ReadFileResponse>, ApiError> {
    let content = file_tools::read_text(&payload.path)
        .await
        .map_err(|e| file_error(&e))?;

    Ok(Json(ReadFileResponse {
        path: payload.path,
        content,
    }))
}

/// List a directory's entries
pub async fn list_files(Json(payload): Json<ListFilesRequest>) -> Result<Json<ListFilesResponse>, ApiError> {
    let items = file_tools::list_entries(&payload.path)
        .await
        .map_err(|e| file_error(&e))?;

    Ok(Json(ListFilesResponse {
        path: payload.path,
        items,
    }))
}

/// Conversation history as of the session's last finished chat
///
/// Turns from a chat still in progress appear once it returns.
pub async fn conversation_history(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.history(&session_id).await,
    })
}

/// Drop a session's agent and its history
pub async fn clear_conversation(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Json<StatusMessage> {
    if state.clear(&session_id).await {
        tracing::info!(session = %session_id, "Conversation cleared");
    }

    Json(StatusMessage {
        message: "Conversation cleared",
    })
}
