//! Cached user repository decorator.
//!
//! Only the public user record is cached. Credential lookups carry the
//! password hash and always read storage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{
    address_key, attendance_key, disciplinary_action_key, health_safety_key,
    student_behavior_key, student_behaviors_scope, student_disciplinary_actions_scope,
    user_address_scope, user_attendance_scope, user_health_safety_scope, user_key, Cache,
};
use campus_core::school::{User, UserCredentials};
use campus_core::storage::{Result, UserCascade, UserRepository};

use super::CacheAside;

pub struct CachedUserRepository<R, C>
where
    R: UserRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedUserRepository<R, C>
where
    R: UserRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    /// Drops every cached record removed along with a user.
    async fn invalidate_cascade(&self, cascade: &UserCascade) {
        let mut keys = vec![user_key(cascade.user_id)];
        keys.extend(cascade.attendance.iter().copied().map(attendance_key));
        keys.extend(cascade.health_safety.iter().copied().map(health_safety_key));
        keys.extend(cascade.addresses.iter().copied().map(address_key));
        keys.extend(cascade.behaviors.iter().copied().map(student_behavior_key));
        keys.extend(
            cascade
                .disciplinary_actions
                .iter()
                .copied()
                .map(disciplinary_action_key),
        );
        self.cache.invalidate(&keys).await;

        self.cache
            .invalidate_scope(&user_attendance_scope(cascade.user_id))
            .await;
        self.cache
            .invalidate_scope(&user_health_safety_scope(cascade.user_id))
            .await;
        self.cache
            .invalidate_scope(&user_address_scope(cascade.user_id))
            .await;

        if let Some(student_id) = cascade.student_id {
            self.cache
                .invalidate_scope(&student_behaviors_scope(student_id))
                .await;
            self.cache
                .invalidate_scope(&student_disciplinary_actions_scope(student_id))
                .await;
        }
    }
}

#[async_trait]
impl<R, C> UserRepository for CachedUserRepository<R, C>
where
    R: UserRepository + 'static,
    C: Cache + 'static,
{
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.cache
            .record(user_key(id), self.repository.get_user(id))
            .await
    }

    async fn get_user_credentials(&self, identifier: &str) -> Result<Option<UserCredentials>> {
        self.repository.get_user_credentials(identifier).await
    }

    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        self.repository.create_user(user, password_hash).await?;

        tracing::debug!(user_id = %user.id, "User created");
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<UserCascade> {
        let cascade = self.repository.delete_user(id).await?;
        self.invalidate_cascade(&cascade).await;

        tracing::debug!(
            user_id = %id,
            attendance = cascade.attendance.len(),
            behaviors = cascade.behaviors.len(),
            "User deleted"
        );
        Ok(cascade)
    }
}
