//! Anthropic LLM Provider
//!
//! Implementation of `LlmProvider` over the Messages API with native tool
//! use. The transcript's content blocks already match the wire format, so
//! requests embed them directly.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, Turn},
    provider::{CompletionRequest, LlmProvider, ModelResponse, StopReason, TokenUsage},
    tool::ToolDeclaration,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API credential
    pub api_key: String,

    /// Base URL without the `/v1/messages` suffix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// `anthropic-version` header value
    pub api_version: String,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
            api_version: API_VERSION.into(),
        }
    }

    /// Credential from `ANTHROPIC_API_KEY`; a missing or empty key is a
    /// configuration error
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AgentError::Config(format!("{API_KEY_ENV} not set")))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create from configuration
    pub fn from_config(config: AnthropicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AnthropicConfig::from_env()?)
    }

    fn build_body<'a>(request: &'a CompletionRequest<'a>) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &request.options.model,
            max_tokens: request.options.max_tokens,
            system: request.options.system_prompt.as_deref(),
            messages: request.transcript,
            tools: request.tools,
        }
    }

    fn convert_response(response: MessagesResponse) -> ModelResponse {
        ModelResponse {
            content: response.content,
            stop_reason: response.stop_reason,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<ModelResponse> {
        let body = Self::build_body(request);

        tracing::debug!(
            model = %request.options.model,
            turns = request.transcript.len(),
            tools = request.tools.len(),
            "Sending Anthropic request"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| AgentError::Parse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = ?parsed.stop_reason,
                "Anthropic response"
            );
        }

        Ok(Self::convert_response(parsed))
    }
}

/// Map a non-2xx response to the error taxonomy
fn classify_failure(status: StatusCode, body: &str) -> AgentError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_owned());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(message),
        _ => AgentError::Provider(format!("{status}: {message}")),
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Turn],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDeclaration],
}

fn no_tools(tools: &&[ToolDeclaration]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::provider::GenerationOptions;
    use agent_core::tool::InputSchema;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = AnthropicConfig::new("sk-test");
        assert_eq!(config.endpoint(), "https://api.anthropic.com/v1/messages");
        assert_eq!(config.api_version, "2023-06-01");
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = AnthropicConfig::new("k").with_base_url("http://localhost:8080/");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_request_body_shape() {
        let transcript = vec![Turn::user_text("list the files")];
        let tools = vec![ToolDeclaration {
            name: "list_files".into(),
            description: "List files".into(),
            input_schema: InputSchema::object().optional("path", "Directory"),
        }];
        let options = GenerationOptions {
            model: "claude-test".into(),
            max_tokens: 4096,
            system_prompt: Some("Plain text only.".into()),
        };
        let request = CompletionRequest {
            transcript: &transcript,
            tools: &tools,
            options: &options,
        };

        let body = serde_json::to_value(AnthropicProvider::build_body(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "claude-test",
                "max_tokens": 4096,
                "system": "Plain text only.",
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": "list the files"}]}
                ],
                "tools": [{
                    "name": "list_files",
                    "description": "List files",
                    "input_schema": {
                        "type": "object",
                        "properties": {"path": {"type": "string", "description": "Directory"}},
                        "required": []
                    }
                }]
            })
        );
    }

    #[test]
    fn test_empty_tools_omitted() {
        let options = GenerationOptions::default();
        let request = CompletionRequest {
            transcript: &[],
            tools: &[],
            options: &options,
        };
        let body = serde_json::to_value(AnthropicProvider::build_body(&request)).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_response_parsing_keeps_block_order() {
        let raw = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_9", "name": "read_file", "input": {"path": "a.rs"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 30}
        });

        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        let response = AnthropicProvider::convert_response(parsed);

        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.content.len(), 2);
        assert!(response.content[1].as_tool_use().is_some());
        assert_eq!(response.usage.unwrap().output_tokens, 30);
    }

    #[test]
    fn test_unknown_block_fails_to_parse() {
        let raw = r#"{"content": [{"type": "mystery", "data": 1}], "stop_reason": "end_turn"}"#;
        assert!(serde_json::from_str::<MessagesResponse>(raw).is_err());
    }

    #[test]
    fn test_failure_classification() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, body),
            AgentError::Auth(m) if m == "invalid x-api-key"
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            AgentError::RateLimited(m) if m == "slow down"
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            AgentError::Provider(m) if m.contains("500") && m.contains("oops")
        ));
    }

    mod over_http {
        use std::sync::Arc;

        use agent_core::{AgentBuilder, ToolRegistry};
        use axum::{Router, http::HeaderMap, routing::post};

        use super::*;

        /// Serve `/v1/messages` with a fixed status and body; returns the base URL
        async fn serve(status: u16, body: &'static str) -> String {
            let status = axum::http::StatusCode::from_u16(status).unwrap();
            let app = Router::new().route(
                "/v1/messages",
                post(move |headers: HeaderMap| async move {
                    if headers.get("x-api-key").is_none_or(|key| key != "sk-test")
                        || headers.get("anthropic-version").is_none()
                    {
                        return (axum::http::StatusCode::BAD_REQUEST, "missing headers");
                    }
                    (status, body)
                }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{addr}")
        }

        fn provider_at(base_url: &str) -> AnthropicProvider {
            AnthropicProvider::from_config(AnthropicConfig::new("sk-test").with_base_url(base_url))
                .unwrap()
        }

        async fn complete(provider: &AnthropicProvider) -> Result<ModelResponse> {
            let transcript = vec![Turn::user_text("hi")];
            let options = GenerationOptions::default();
            let request = CompletionRequest {
                transcript: &transcript,
                tools: &[],
                options: &options,
            };
            provider.complete(&request).await
        }

        #[tokio::test]
        async fn test_complete_parses_reply() {
            let base = serve(
                200,
                r#"{"content":[{"type":"text","text":"Hello."}],"stop_reason":"end_turn","usage":{"input_tokens":3,"output_tokens":2}}"#,
            )
            .await;

            let response = complete(&provider_at(&base)).await.unwrap();

            assert_eq!(response.content, vec![ContentBlock::text("Hello.")]);
            assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        }

        #[tokio::test]
        async fn test_status_mapping() {
            let auth = serve(401, r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#).await;
            let limited = serve(429, r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#).await;
            let broken = serve(500, "upstream exploded").await;

            assert!(matches!(complete(&provider_at(&auth)).await, Err(AgentError::Auth(m)) if m == "invalid x-api-key"));
            assert!(matches!(complete(&provider_at(&limited)).await, Err(AgentError::RateLimited(m)) if m == "slow down"));
            assert!(matches!(
                complete(&provider_at(&broken)).await,
                Err(AgentError::Provider(m)) if m.contains("500") && m.contains("upstream exploded")
            ));
        }

        #[tokio::test]
        async fn test_undecodable_success_is_parse_error() {
            let base = serve(200, "<html>not json</html>").await;
            assert!(matches!(complete(&provider_at(&base)).await, Err(AgentError::Parse(_))));
        }

        #[tokio::test]
        async fn test_unreachable_host_is_unavailable() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let result = complete(&provider_at(&format!("http://{addr}"))).await;
            assert!(matches!(result, Err(AgentError::ProviderUnavailable(_))));
        }

        #[tokio::test]
        async fn test_failed_call_commits_only_user_turn() {
            let base = serve(429, r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#).await;
            let mut agent = AgentBuilder::new()
                .provider(Arc::new(provider_at(&base)))
                .tools(Arc::new(ToolRegistry::new()))
                .build()
                .unwrap();

            let reply = agent.chat("hi").await;

            assert_eq!(reply, "Error: Rate limited: slow down");
            assert_eq!(agent.transcript().turns(), [Turn::user_text("hi")]);
        }
    }
}
