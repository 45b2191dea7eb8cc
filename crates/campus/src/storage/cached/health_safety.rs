//! Cached health-and-safety repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{health_safety_key, user_health_safety_scope, Cache};
use campus_core::school::HealthSafetyRecord;
use campus_core::storage::{HealthSafetyRepository, ListQuery, Page, Result};

use super::{query_key, CacheAside};

pub struct CachedHealthSafetyRepository<R, C>
where
    R: HealthSafetyRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedHealthSafetyRepository<R, C>
where
    R: HealthSafetyRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    async fn invalidate(&self, record: &HealthSafetyRecord) {
        self.cache.invalidate(&[health_safety_key(record.id)]).await;
        self.cache
            .invalidate_scope(&user_health_safety_scope(record.user_id))
            .await;
    }
}

#[async_trait]
impl<R, C> HealthSafetyRepository for CachedHealthSafetyRepository<R, C>
where
    R: HealthSafetyRepository + 'static,
    C: Cache + 'static,
{
    async fn get_health_safety(&self, id: Uuid) -> Result<Option<HealthSafetyRecord>> {
        self.cache
            .record(health_safety_key(id), self.repository.get_health_safety(id))
            .await
    }

    async fn list_health_safety(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<HealthSafetyRecord>> {
        let key = query_key(&user_health_safety_scope(user_id), query);
        self.cache
            .list(key, self.repository.list_health_safety(user_id, query))
            .await
    }

    async fn create_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        self.repository.create_health_safety(record).await?;
        self.cache
            .invalidate_scope(&user_health_safety_scope(record.user_id))
            .await;

        tracing::debug!(health_safety_id = %record.id, user_id = %record.user_id, "Health-safety record created");
        Ok(())
    }

    async fn update_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        self.repository.update_health_safety(record).await?;
        self.invalidate(record).await;

        tracing::debug!(health_safety_id = %record.id, "Health-safety record updated");
        Ok(())
    }

    async fn delete_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        self.repository.delete_health_safety(record).await?;
        self.invalidate(record).await;

        tracing::debug!(health_safety_id = %record.id, "Health-safety record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::cache::list_key;
    use campus_core::school::{Role, User};
    use campus_core::storage::UserRepository;

    use crate::storage::cached::testing::{settle, MockCache};
    use crate::storage::InMemoryRepository;

    #[tokio::test]
    async fn test_update_refreshes_cached_record_and_list() {
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedHealthSafetyRepository::new(repo.clone(), cache.clone(), Duration::from_secs(60));

        let user = User::new("kim", "kim@school.test", "Kim", "Lee", Role::Student);
        repo.create_user(&user, "hash").await.unwrap();
        let mut record = HealthSafetyRecord::new(user.id, "Pat Lee", "+1 555 0100");
        cached.create_health_safety(&record).await.unwrap();

        cached.get_health_safety(record.id).await.unwrap();
        let before = cached
            .list_health_safety(user.id, &ListQuery::default())
            .await
            .unwrap();
        settle().await;
        assert_eq!(before.items[0].emergency_contact_name, "Pat Lee");

        record.emergency_contact_name = "Sam Lee".to_string();
        cached.update_health_safety(&record).await.unwrap();

        let list = list_key(&user_health_safety_scope(user.id), &ListQuery::default()).unwrap();
        assert!(!cache.contains(&health_safety_key(record.id)).await);
        assert!(!cache.contains(&list).await);

        let after = cached.get_health_safety(record.id).await.unwrap().unwrap();
        assert_eq!(after.emergency_contact_name, "Sam Lee");
        let page = cached
            .list_health_safety(user.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.items[0].emergency_contact_name, "Sam Lee");
    }
}
