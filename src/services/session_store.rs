// src/services/session_store.rs
// DOCUMENTATION: Server-side session registry with TTL
// PURPOSE: Map opaque cookie tokens to signed-in users

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::User;

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { user_id: i64, username: String },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// Signed in as someone other than `user_id`
    pub fn can_follow(&self, user_id: i64) -> bool {
        self.user_id().is_some_and(|id| id != user_id)
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Session::Authenticated { user_id, .. } => Some(*user_id),
            Session::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Authenticated { username, .. } => Some(username),
            Session::Anonymous => None,
        }
    }
}

/// Session entry with expiration
#[derive(Clone, Debug)]
struct SessionEntry {
    user_id: i64,
    username: String,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// In-memory session store with TTL
/// DOCUMENTATION: Thread-safe; expired entries resolve as anonymous and
/// are purged by `cleanup` / `start_cleanup_task`
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Start a session for `user`, returning its token
    pub async fn create(&self, user: &User) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let entry = SessionEntry {
            user_id: user.id,
            username: user.username.clone(),
            expires_at: Instant::now() + self.ttl,
        };

        self.sessions.write().await.insert(token.clone(), entry);
        log::debug!("Session started for user {}", user.username);
        token
    }

    /// Resolve a cookie token, if any, to a session
    pub async fn resolve(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::Anonymous;
        };

        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(entry) if !entry.is_expired() => Session::Authenticated {
                user_id: entry.user_id,
                username: entry.username.clone(),
            },
            Some(_) => {
                log::debug!("Session EXPIRED");
                Session::Anonymous
            }
            None => Session::Anonymous,
        }
    }

    /// End a session; unknown tokens are ignored
    pub async fn destroy(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.remove(token) {
            log::debug!("Session ended for user {}", entry.username);
        }
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut sessions = self.sessions.write().await;
        let before_count = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired());
        let after_count = sessions.len();

        if before_count > after_count {
            log::info!(
                "Session cleanup: removed {} expired sessions ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> SessionStats {
        let sessions = self.sessions.read().await;
        let total = sessions.len();
        let expired = sessions.values().filter(|e| e.is_expired()).count();

        SessionStats {
            total_sessions: total,
            expired_sessions: expired,
            active_sessions: total - expired,
        }
    }
}

/// Session statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub expired_sessions: usize,
    pub active_sessions: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired sessions
pub fn start_cleanup_task(sessions: Arc<SessionStore>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            sessions.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 7,
            username: "test_user".to_string(),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let store = SessionStore::new(60);
        let token = store.create(&user()).await;

        let session = store.resolve(Some(&token)).await;
        assert_eq!(session.user_id(), Some(7));
        assert_eq!(session.username(), Some("test_user"));
        assert_eq!(store.resolve(None).await, Session::Anonymous);
        assert_eq!(store.resolve(Some("bogus")).await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = SessionStore::new(60);
        let token = store.create(&user()).await;

        store.destroy(&token).await;
        assert!(!store.resolve(Some(&token)).await.is_authenticated());
        store.destroy(&token).await;
    }

    #[tokio::test]
    async fn test_session_expiration() {
        let store = SessionStore::new(1);
        let token = store.create(&user()).await;

        assert!(store.resolve(Some(&token)).await.is_authenticated());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!store.resolve(Some(&token)).await.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_cleanup() {
        let store = SessionStore::new(1);
        store.create(&user()).await;
        store.create(&user()).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        store.cleanup().await;

        let stats = store.stats().await;
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.active_sessions, 0);
    }
}
