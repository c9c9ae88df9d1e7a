use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::ChatMessage;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Redis connection error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for per-session chat histories.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `None` when the session is unknown or has expired.
    async fn load(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>, SessionError>;

    /// Stores the history and restarts the session's idle timer.
    async fn save(&self, session_id: &str, history: &[ChatMessage]) -> Result<(), SessionError>;
}

struct StoredSession {
    history: Vec<ChatMessage>,
    touched_at: Instant,
}

/// Process-local sessions. Expiry is checked lazily whenever the map is used.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>, SessionError> {
        let mut sessions = self.sessions.lock().await;

        let expired = match sessions.get(session_id) {
            Some(session) => session.touched_at.elapsed() > self.idle_timeout,
            None => return Ok(None),
        };

        if expired {
            debug!("Session {} expired", session_id);
            sessions.remove(session_id);
            return Ok(None);
        }

        Ok(sessions.get(session_id).map(|session| session.history.clone()))
    }

    async fn save(&self, session_id: &str, history: &[ChatMessage]) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        sessions.retain(|_, session| now.duration_since(session.touched_at) <= self.idle_timeout);
        sessions.insert(
            session_id.to_string(),
            StoredSession {
                history: history.to_vec(),
                touched_at: now,
            },
        );
        Ok(())
    }
}

/// Sessions kept in Redis as JSON under `chat:session:{id}`; the key TTL is
/// the idle timeout and is refreshed on every save.
pub struct RedisSessionStore {
    pool: Pool,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub async fn new(redis_url: &str, idle_timeout: Duration) -> Result<Self, SessionError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| SessionError::Pool(format!("Failed to create Redis pool: {}", e)))?;

        let mut conn = pool
            .get()
            .await
            .map_err(|e| SessionError::Pool(format!("Failed to connect to Redis: {}", e)))?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis session store initialized successfully");

        Ok(Self {
            pool,
            ttl_secs: idle_timeout.as_secs().max(1),
        })
    }

    fn key(session_id: &str) -> String {
        format!("chat:session:{}", session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>, SessionError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionError::Pool(e.to_string()))?;

        let data: Option<String> = conn.get(Self::key(session_id)).await?;
        match data {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &str, history: &[ChatMessage]) -> Result<(), SessionError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionError::Pool(e.to_string()))?;

        let data = serde_json::to_string(history)?;
        let _: () = redis::cmd("SET")
            .arg(Self::key(session_id))
            .arg(data)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;

        debug!("Saved {} messages for session {}", history.len(), session_id);
        Ok(())
    }
}
