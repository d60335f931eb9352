//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Only communication and configuration failures live here. Tool failures
/// never surface as an `AgentError`; they are rendered to text by the
/// registry and handed back to the model.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Remote model returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Remote model could not be reached
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool-use rounds exceeded the configured ceiling for one `chat` call
    #[error("Tool-turn limit exceeded ({0} rounds)")]
    ToolTurnLimit(usize),

    /// Malformed model response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error (e.g. missing credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AgentError {
    /// True for failures that happened while talking to the remote model.
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::ProviderUnavailable(_)
                | Self::Parse(_)
                | Self::RateLimited(_)
                | Self::Auth(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ToolTurnLimit(0) => "Tool use is disabled for this assistant.".into(),
            Self::ToolTurnLimit(n) => format!(
                "The assistant used tools {n} times without finishing. Please try a narrower request."
            ),
            Self::Parse(_) => "The AI service returned a response that could not be read.".into(),
            Self::Config(msg) => msg.clone(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication failed. Please check your API key.".into(),
        }
    }
}
