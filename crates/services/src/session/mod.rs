use crate::auth::{AuthError, Profile, StoredToken};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

const SESSION_CACHE_MAX_CAPACITY: u64 = 100_000;

/// Opaque session identifier carried in the browser cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new_random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login state kept server-side for a browser session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// OAuth token serialized as JSON
    pub token: Option<String>,
    /// Raw userinfo profile
    pub profile: Option<Profile>,
}

impl SessionData {
    pub fn new(token: &StoredToken, profile: Profile) -> Result<Self, AuthError> {
        Ok(Self {
            token: Some(token.to_json()?),
            profile: Some(profile),
        })
    }

    /// Parse the session-stored token JSON
    pub fn stored_token(&self) -> Result<StoredToken, AuthError> {
        let raw = self
            .token
            .as_deref()
            .ok_or_else(|| AuthError::InvalidToken("No token in session".to_string()))?;
        StoredToken::from_json(raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session, extending its idle lifetime
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError>;

    async fn store(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError>;

    async fn remove(&self, id: &SessionId) -> Result<bool, SessionError>;
}

/// Process-local session store. Sessions expire after the configured idle time.
///
/// Not shared across instances: running several replicas needs sticky routing or
/// an external store behind [`SessionStore`].
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Cache<SessionId, Arc<SessionData>>,
}

impl InMemorySessionStore {
    pub fn new(idle_lifetime: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(SESSION_CACHE_MAX_CAPACITY)
                .time_to_idle(idle_lifetime)
                .build(),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        Ok(self
            .sessions
            .get(id)
            .await
            .map(|data| data.as_ref().clone()))
    }

    async fn store(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError> {
        self.sessions.insert(id.clone(), Arc::new(data)).await;
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self.sessions.remove(id).await.is_some())
    }
}
