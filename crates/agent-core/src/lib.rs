//! # agent-core
//!
//! Conversation loop for a coding assistant: a remote chat model requests
//! local side effects through declared tools, the loop runs them and feeds
//! the results back until the model answers in plain text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ Conversation│  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│  Registry   │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                   │
//! │    Transcript (append-only turns of content blocks)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the loop independent of the HTTP client;
//! `ScriptedProvider` replays canned responses for tests.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{ContentBlock, Role, Transcript, Turn};
pub use provider::{GenerationOptions, LlmProvider, ModelResponse, ScriptedProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use session::{SessionId, SessionStore};
pub use tool::{InputSchema, Tool, ToolDeclaration, ToolError, ToolInput, ToolOutcome, ToolRegistry};
