//! Conversation Loop
//!
//! Tool-use orchestration between the remote model and local tools.
//!
//! Each `chat` call appends the user's text, then alternates: ask the model,
//! append its turn, run every requested tool in emission order, append one
//! user turn with the results, ask again. A model turn without tool requests
//! ends the call and its text is the reply.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::message::{ContentBlock, Transcript, Turn};
use crate::provider::{CompletionRequest, GenerationOptions, LlmProvider, StopReason};
use crate::tool::ToolRegistry;

/// Tracing target for loop events
pub const LOG_TARGET: &str = "agent_core::reasoning";

/// Callback fired just before each tool runs
pub type ToolObserver = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Agent configuration
#[derive(Clone, Debug, Default)]
pub struct AgentConfig {
    /// Generation options (model, response cap, system prompt)
    pub generation: GenerationOptions,

    /// Ceiling on tool rounds per `chat` call; `None` means unbounded
    pub max_tool_turns: Option<usize>,
}

impl AgentConfig {
    /// Read `AGENT_MODEL`, `AGENT_MAX_TOKENS` and `AGENT_MAX_TOOL_TURNS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("AGENT_MODEL") {
            config.generation.model = model;
        }
        let max_tokens = std::env::var("AGENT_MAX_TOKENS").ok();
        if let Some(max_tokens) = parse_setting("AGENT_MAX_TOKENS", max_tokens.as_deref()) {
            config.generation.max_tokens = max_tokens;
        }
        let max_tool_turns = std::env::var("AGENT_MAX_TOOL_TURNS").ok();
        config.max_tool_turns = parse_tool_turns(max_tool_turns.as_deref());

        config
    }
}

/// Parse an optional setting; an unparseable value is logged and ignored
fn parse_setting<T: FromStr>(name: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?.trim();
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(target: LOG_TARGET, setting = name, value = raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// A ceiling of zero would skip every tool call, so it is rejected
fn parse_tool_turns(raw: Option<&str>) -> Option<usize> {
    match parse_setting("AGENT_MAX_TOOL_TURNS", raw) {
        Some(0) => {
            tracing::warn!(target: LOG_TARGET, "AGENT_MAX_TOOL_TURNS must be at least 1; leaving tool use unbounded");
            None
        }
        turns => turns,
    }
}

/// A conversational agent owning one transcript
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    transcript: Transcript,
    observer: Option<ToolObserver>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.provider.name())
            .field("tools", &self.tools.names())
            .field("turns", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent with an empty transcript
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
            transcript: Transcript::new(),
            observer: None,
        }
    }

    /// Send user input and return the reply; failures become `Error: ...` text
    pub async fn chat(&mut self, input: &str) -> String {
        match self.try_chat(input).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(target: LOG_TARGET, error = %err, remote = err.is_remote(), "Chat failed");
                format!("Error: {err}")
            }
        }
    }

    /// Send user input and return the reply or the communication error
    ///
    /// On error the transcript keeps every turn committed before the failing
    /// remote call and nothing from it.
    pub async fn try_chat(&mut self, input: &str) -> Result<String> {
        tracing::info!(target: LOG_TARGET, "User input: {input}");
        self.transcript.push(Turn::user_text(input));

        let tools = Arc::clone(&self.tools);
        let mut tool_turns = 0usize;

        loop {
            let response = {
                let request = CompletionRequest {
                    transcript: self.transcript.turns(),
                    tools: tools.declarations(),
                    options: &self.config.generation,
                };
                self.provider.complete(&request).await?
            };

            if response.stop_reason == Some(StopReason::MaxTokens) {
                tracing::warn!(target: LOG_TARGET, "Model response hit the max_tokens cap");
            }

            // An empty content list is stored as-is; the Messages API rejects
            // an empty assistant turn, so later calls in this session will fail
            let assistant = Turn::assistant(response.content);
            if !assistant.has_tool_use() {
                let reply = assistant.text();
                self.transcript.push(assistant);
                return Ok(reply);
            }

            if self.config.max_tool_turns.is_some_and(|max| tool_turns >= max) {
                let limit = tool_turns;
                let skipped = assistant
                    .tool_uses()
                    .map(|call| {
                        ContentBlock::tool_result(
                            call.id,
                            format!("Tool call skipped: tool-turn limit of {limit} reached"),
                        )
                    })
                    .collect();
                self.transcript.push(assistant);
                self.transcript.push(Turn::tool_results(skipped));
                tracing::warn!(target: LOG_TARGET, limit, "Tool-turn limit exceeded");
                return Err(AgentError::ToolTurnLimit(limit));
            }

            let mut results = Vec::new();
            for call in assistant.tool_uses() {
                if let Some(observer) = &self.observer {
                    observer(call.name, call.input);
                }
                let output = tools.invoke(call.name, call.input).await;
                results.push(ContentBlock::tool_result(call.id, output));
            }

            self.transcript.push(assistant);
            self.transcript.push(Turn::tool_results(results));
            tool_turns += 1;
        }
    }

    /// Conversation history, oldest first
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    observer: Option<ToolObserver>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            config: AgentConfig::default(),
            observer: None,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_tool_turns(mut self, max: Option<usize>) -> Self {
        self.config.max_tool_turns = max;
        self
    }

    /// Called with `(name, input)` before each tool runs
    #[must_use]
    pub fn on_tool_use(mut self, observer: impl Fn(&str, &Value) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut agent = Agent::new(provider, self.tools, self.config);
        agent.observer = self.observer;
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::provider::ScriptedProvider;
    use serde_json::json;

    fn agent_with(provider: ScriptedProvider) -> (Agent, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let agent = AgentBuilder::new()
            .provider(provider.clone())
            .build()
            .unwrap();
        (agent, provider)
    }

    #[tokio::test]
    async fn test_plain_reply_adds_two_turns() {
        let (mut agent, _) = agent_with(ScriptedProvider::new().respond_text("Hello!"));

        let reply = agent.chat("Hi").await;

        assert_eq!(reply, "Hello!");
        assert_eq!(agent.transcript().len(), 2);
        assert_eq!(agent.transcript().turns()[0], Turn::user_text("Hi"));
        assert_eq!(agent.transcript().turns()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_empty_response_returns_empty_string() {
        let (mut agent, _) = agent_with(ScriptedProvider::new().respond(Vec::new()));
        assert_eq!(agent.chat("anything").await, "");
        assert_eq!(agent.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_answered_not_fatal() {
        let (mut agent, provider) = agent_with(
            ScriptedProvider::new()
                .respond(vec![ContentBlock::tool_use("t1", "rm_rf", json!({}))])
                .respond_text("That tool does not exist."),
        );

        let reply = agent.chat("clean up").await;

        assert_eq!(reply, "That tool does not exist.");
        let results = &agent.transcript().turns()[2];
        assert_eq!(results.content, vec![ContentBlock::tool_result("t1", "Unknown tool: rm_rf")]);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_committed_turns_only() {
        let (mut agent, _) = agent_with(ScriptedProvider::new().fail("connection reset"));

        let reply = agent.chat("Hi").await;

        assert_eq!(reply, "Error: Provider error: connection reset");
        assert_eq!(agent.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_turn_limit() {
        let (mut agent, _) = agent_with(
            ScriptedProvider::new()
                .respond(vec![ContentBlock::tool_use("t1", "noop", json!({}))])
                .respond(vec![ContentBlock::tool_use("t2", "noop", json!({}))]),
        );
        agent.config.max_tool_turns = Some(1);

        let err = agent.try_chat("loop forever").await.unwrap_err();

        assert!(matches!(err, AgentError::ToolTurnLimit(1)));
        // user, assistant, results, assistant, skipped results
        assert_eq!(agent.transcript().len(), 5);
        let last = agent.transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(matches!(&last.content[0], ContentBlock::ToolResult { tool_use_id, .. } if tool_use_id == "t2"));
    }

    #[tokio::test]
    async fn test_zero_turn_limit_skips_every_call() {
        let (mut agent, provider) = agent_with(
            ScriptedProvider::new().respond(vec![ContentBlock::tool_use("t1", "noop", json!({}))]),
        );
        agent.config.max_tool_turns = Some(0);

        let err = agent.try_chat("do it").await.unwrap_err();

        assert!(matches!(err, AgentError::ToolTurnLimit(0)));
        assert_eq!(err.user_message(), "Tool use is disabled for this assistant.");
        assert_eq!(provider.requests().len(), 1);
    }

    #[test]
    fn test_settings_parsing() {
        assert_eq!(parse_setting::<u32>("AGENT_MAX_TOKENS", Some(" 2048 ")), Some(2048));
        assert_eq!(parse_setting::<u32>("AGENT_MAX_TOKENS", Some("lots")), None);
        assert_eq!(parse_setting::<u32>("AGENT_MAX_TOKENS", None), None);

        assert_eq!(parse_tool_turns(Some("5")), Some(5));
        assert_eq!(parse_tool_turns(Some("ten")), None);
        assert_eq!(parse_tool_turns(Some("0")), None);
        assert_eq!(parse_tool_turns(None), None);
    }

    #[test]
    fn test_builder_model_override() {
        let agent = AgentBuilder::new()
            .provider(Arc::new(ScriptedProvider::new()))
            .model("claude-test")
            .max_tool_turns(Some(3))
            .build()
            .unwrap();

        assert_eq!(agent.config().generation.model, "claude-test");
        assert_eq!(agent.config().max_tool_turns, Some(3));
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));
    }
}
