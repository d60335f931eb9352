//! Session Management
//!
//! Explicit per-session store replacing ambient global state. Entries are
//! created on first use and removed on an explicit clear. Each entry sits
//! behind its own async mutex, so calls against one session run one at a
//! time while different sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;

/// Session identifier chosen by the caller
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    /// The session used when a caller does not name one
    fn default() -> Self {
        Self("default".into())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one session's exclusively-owned value
pub type SessionHandle<A> = Arc<Mutex<A>>;

/// In-memory session store
pub struct SessionStore<A> {
    sessions: RwLock<HashMap<SessionId, SessionHandle<A>>>,
}

impl<A> Default for SessionStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> SessionStore<A> {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Existing session, or a new one built by `create`
    ///
    /// `create` runs at most once per missing id and may fail (e.g. a
    /// missing credential); on failure nothing is stored.
    pub async fn get_or_create<F>(&self, id: &SessionId, create: F) -> Result<SessionHandle<A>>
    where
        F: FnOnce() -> Result<A>,
    {
        if let Some(handle) = self.sessions.read().await.get(id) {
            return Ok(Arc::clone(handle));
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(Mutex::new(create()?));
        sessions.insert(id.clone(), Arc::clone(&handle));
        tracing::info!(session = %id, "Session created");
        Ok(handle)
    }

    /// Drop a session entirely; true if it existed
    ///
    /// A call already holding the handle finishes against the detached value.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session cleared");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
