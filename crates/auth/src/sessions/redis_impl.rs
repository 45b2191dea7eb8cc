//! Redis session storage implementation.

use std::time::Duration;

use async_trait::async_trait;
use fred::prelude::*;
use uuid::Uuid;

use campus_core::auth::{AuthError, Result, Session, SessionId, SessionRepository};

/// Redis-backed session storage.
///
/// Each session is a JSON value under `campus:session:{id}` expiring with
/// the session. A per-user set under `campus:user-sessions:{user_id}`
/// indexes the ids for revocation and carries the same TTL, refreshed on
/// every login.
pub struct SessionStore {
    pool: Pool,
    session_ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: Pool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    fn session_key(id: &SessionId) -> String {
        format!("campus:session:{}", id)
    }

    fn user_sessions_key(user_id: Uuid) -> String {
        format!("campus:user-sessions:{}", user_id)
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

fn storage(error: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(error.to_string())
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let value = serde_json::to_string(session).map_err(storage)?;
        let ttl = self.ttl_secs();

        self.pool
            .set::<(), _, _>(
                Self::session_key(&session.id),
                value,
                Some(Expiration::EX(ttl)),
                None,
                false,
            )
            .await
            .map_err(storage)?;

        let index = Self::user_sessions_key(session.user_id);
        self.pool
            .sadd::<(), _, _>(&index, session.id.as_str())
            .await
            .map_err(storage)?;
        self.pool
            .expire::<(), _>(&index, ttl, None)
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let value: Option<String> = self
            .pool
            .get(Self::session_key(id))
            .await
            .map_err(storage)?;

        value
            .map(|json| serde_json::from_str(&json).map_err(storage))
            .transpose()
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let Some(session) = self.get_session(id).await? else {
            return Ok(());
        };

        self.pool
            .del::<(), _>(Self::session_key(id))
            .await
            .map_err(storage)?;
        self.pool
            .srem::<(), _, _>(Self::user_sessions_key(session.user_id), id.as_str())
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64> {
        let index = Self::user_sessions_key(user_id);
        let ids: Vec<String> = self.pool.smembers(&index).await.map_err(storage)?;

        // Index members may outlive their session keys; DEL reports only
        // the keys that still existed.
        let removed: i64 = if ids.is_empty() {
            0
        } else {
            let keys: Vec<String> = ids
                .into_iter()
                .map(|id| Self::session_key(&SessionId::new(id)))
                .collect();
            self.pool.del(keys).await.map_err(storage)?
        };

        self.pool.del::<(), _>(&index).await.map_err(storage)?;

        Ok(u64::try_from(removed).unwrap_or(0))
    }
}
