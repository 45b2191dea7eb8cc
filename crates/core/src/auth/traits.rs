use async_trait::async_trait;
use uuid::Uuid;

use super::{AuthError, Session, SessionId};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<()>;

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Deleting an unknown session is not an error.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Revokes every session of a user. Returns how many were removed.
    ///
    /// Used by logout-all and when an account is deleted.
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64>;
}
