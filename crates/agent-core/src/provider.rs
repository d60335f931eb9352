//! LLM Provider Strategy Pattern
//!
//! Defines the interface the conversation loop uses to reach a remote chat
//! model. The loop works exclusively through this trait, so the Anthropic
//! client and test doubles are interchangeable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{CompletionRequest, LlmProvider};
//!
//! let request = CompletionRequest {
//!     transcript: transcript.turns(),
//!     tools: registry.declarations(),
//!     options: &options,
//! };
//! let response = provider.complete(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{AgentError, Result};
use crate::message::{ContentBlock, Turn};
use crate::tool::ToolDeclaration;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Fixed system instruction: plain text for a terminal
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful coding assistant operating in a terminal environment. \
Output only plain text without markdown formatting, as your responses appear directly in the terminal. \
Be concise but thorough, providing clear and practical advice with a friendly tone. \
Don't use any asterisk characters in your responses.";

/// Configuration for model generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,

    /// Response size cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System instruction sent alongside the transcript
    #[serde(default)]
    pub system_prompt: Option<String>,
}

const fn default_max_tokens() -> u32 {
    4096
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.into()),
        }
    }
}

/// Everything one remote call needs
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    /// Full transcript, oldest first
    pub transcript: &'a [Turn],

    /// Declarations the model may call
    pub tools: &'a [ToolDeclaration],

    pub options: &'a GenerationOptions,
}

/// Why the model stopped generating
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

/// Token usage statistics
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Parsed model response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Text and tool-use blocks, in emission order
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub stop_reason: Option<StopReason>,

    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    /// Response with content only; stop reason inferred from the blocks
    pub fn from_content(content: Vec<ContentBlock>) -> Self {
        let stop_reason = if content.iter().any(|b| b.as_tool_use().is_some()) {
            StopReason::ToolUse
        } else {
            StopReason::EndTurn
        };
        Self {
            content,
            stop_reason: Some(stop_reason),
            usage: None,
        }
    }
}

/// Strategy trait for remote chat models
///
/// Implement this trait to add support for new backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Send the transcript and tool declarations, get one response
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<ModelResponse>;
}

/// A request as seen by [`ScriptedProvider`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub transcript: Vec<Turn>,
    pub tool_names: Vec<String>,
    pub options: GenerationOptions,
}

enum ScriptStep {
    Respond(ModelResponse),
    Fail(String),
}

/// In-memory provider that replays a fixed script (for development/testing)
///
/// Each `complete` call pops the next step; an exhausted script is a
/// provider error.
#[derive(Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given blocks
    #[must_use]
    pub fn respond(self, content: Vec<ContentBlock>) -> Self {
        self.push_response(content);
        self
    }

    /// Queue a plain-text response
    #[must_use]
    pub fn respond_text(self, text: &str) -> Self {
        self.respond(vec![ContentBlock::text(text)])
    }

    /// Queue a provider failure
    #[must_use]
    pub fn fail(self, message: &str) -> Self {
        self.lock_steps().push_back(ScriptStep::Fail(message.into()));
        self
    }

    /// Queue a response on a shared provider
    pub fn push_response(&self, content: Vec<ContentBlock>) {
        self.lock_steps()
            .push_back(ScriptStep::Respond(ModelResponse::from_content(content)));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_steps(&self) -> std::sync::MutexGuard<'_, VecDeque<ScriptStep>> {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<ModelResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                transcript: request.transcript.to_vec(),
                tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
                options: request.options.clone(),
            });

        match self.lock_steps().pop_front() {
            Some(ScriptStep::Respond(response)) => Ok(response),
            Some(ScriptStep::Fail(message)) => Err(AgentError::Provider(message)),
            None => Err(AgentError::Provider("script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 4096);
        assert_eq!(opts.model, DEFAULT_MODEL);
        assert!(opts.system_prompt.unwrap().contains("plain text"));
    }

    #[test]
    fn test_stop_reason_inferred() {
        let text = ModelResponse::from_content(vec![ContentBlock::text("hi")]);
        assert_eq!(text.stop_reason, Some(StopReason::EndTurn));

        let tool = ModelResponse::from_content(vec![ContentBlock::tool_use(
            "t1",
            "list_files",
            serde_json::json!({}),
        )]);
        assert_eq!(tool.stop_reason, Some(StopReason::ToolUse));
    }

    #[test]
    fn test_unknown_stop_reason_tolerated() {
        let reason: StopReason = serde_json::from_str("\"pause_turn\"").unwrap();
        assert_eq!(reason, StopReason::Other);
    }

    #[tokio::test]
    async fn test_scripted_provider_replays_in_order() {
        let provider = ScriptedProvider::new().respond_text("first").fail("boom");
        let options = GenerationOptions::default();
        let request = CompletionRequest {
            transcript: &[],
            tools: &[],
            options: &options,
        };

        let first = provider.complete(&request).await.unwrap();
        assert_eq!(first.content, vec![ContentBlock::text("first")]);
        assert!(matches!(provider.complete(&request).await, Err(AgentError::Provider(m)) if m == "boom"));
        assert!(provider.complete(&request).await.is_err());
        assert_eq!(provider.requests().len(), 3);
    }
}
