//! # agent-runtime
//!
//! Runtime providers and process setup for the code assistant.
//!
//! ## Providers
//!
//! - **Anthropic** (default): Messages API with native tool use
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::AnthropicProvider;
//!
//! let provider = AnthropicProvider::from_env()?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(Arc::new(file_tools::default_registry()))
//!     .build()?;
//! ```

#[cfg(feature = "anthropic")]
pub mod anthropic;
pub mod logging;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentConfig, AgentError, LlmProvider, Result, SessionId, SessionStore,
    ToolRegistry,
};
