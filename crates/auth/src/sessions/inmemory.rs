//! In-memory session storage for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use campus_core::auth::{Result, Session, SessionId, SessionRepository};

/// In-memory session store.
///
/// Clones share the same map. Everything is lost on restart, so every user
/// has to log in again.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn open(user_id: Uuid) -> Session {
        Session::open(user_id, Utc::now(), Duration::hours(24))
    }

    #[tokio::test]
    async fn test_session_create_and_get() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let session = open(user_id);
        store.create_session(&session).await.unwrap();

        let retrieved = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert_eq!(retrieved.user_id, user_id);
    }

    #[tokio::test]
    async fn test_session_delete() {
        let store = InMemorySessionStore::new();
        let session = open(Uuid::new_v4());
        store.create_session(&session).await.unwrap();

        store.delete_session(&session.id).await.unwrap();

        assert!(store.get_session(&session.id).await.unwrap().is_none());
        assert!(store
            .delete_session(&SessionId::new("nonexistent".to_string()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_sessions_counts() {
        let store = InMemorySessionStore::new();
        let teacher = Uuid::new_v4();
        let parent = Uuid::new_v4();

        let first = open(teacher);
        let second = open(teacher);
        let other = open(parent);
        for session in [&first, &second, &other] {
            store.create_session(session).await.unwrap();
        }

        assert_eq!(store.delete_user_sessions(teacher).await.unwrap(), 2);
        assert_eq!(store.delete_user_sessions(teacher).await.unwrap(), 0);

        assert!(store.get_session(&first.id).await.unwrap().is_none());
        assert!(store.get_session(&second.id).await.unwrap().is_none());
        assert!(store.get_session(&other.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = InMemorySessionStore::new();
        let clone = store.clone();
        let session = open(Uuid::new_v4());

        store.create_session(&session).await.unwrap();

        assert!(clone.get_session(&session.id).await.unwrap().is_some());
    }
}
