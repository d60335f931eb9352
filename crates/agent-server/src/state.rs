//! Application State

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use agent_core::{
    Agent, AgentConfig, LlmProvider, Result, SessionId, SessionStore, ToolRegistry, Turn,
    session::SessionHandle,
};

/// Builds a provider for a new session; fails when the credential is missing
pub type ProviderFactory = Arc<dyn Fn() -> Result<Arc<dyn LlmProvider>> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// One agent per session id
    pub sessions: Arc<SessionStore<Agent>>,

    /// Transcript copies taken after each finished chat; readers never wait
    /// on a session whose chat is still running
    pub histories: Arc<RwLock<HashMap<SessionId, Vec<Turn>>>>,

    /// Tool registry shared by every agent
    pub tools: Arc<ToolRegistry>,

    /// Configuration for newly created agents
    pub agent_config: AgentConfig,

    pub provider_factory: ProviderFactory,
}

impl AppState {
    pub fn new(tools: Arc<ToolRegistry>, agent_config: AgentConfig, provider_factory: ProviderFactory) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            histories: Arc::default(),
            tools,
            agent_config,
            provider_factory,
        }
    }

    /// The session's agent, created on first use
    pub async fn agent_for(&self, id: &SessionId) -> Result<SessionHandle<Agent>> {
        self.sessions
            .get_or_create(id, || {
                let provider = (self.provider_factory)()?;
                Ok(Agent::new(
                    provider,
                    Arc::clone(&self.tools),
                    self.agent_config.clone(),
                ))
            })
            .await
    }

    /// Last recorded transcript; empty for unknown sessions
    pub async fn history(&self, id: &SessionId) -> Vec<Turn> {
        self.histories.read().await.get(id).cloned().unwrap_or_default()
    }

    pub async fn record_history(&self, id: &SessionId, turns: Vec<Turn>) {
        self.histories.write().await.insert(id.clone(), turns);
    }

    /// Drop the session's agent and its recorded history
    pub async fn clear(&self, id: &SessionId) -> bool {
        self.histories.write().await.remove(id);
        self.sessions.remove(id).await
    }
}
