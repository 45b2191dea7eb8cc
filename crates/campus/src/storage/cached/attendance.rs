//! Cached attendance repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use campus_core::cache::{attendance_key, user_attendance_scope, Cache};
use campus_core::school::AttendanceRecord;
use campus_core::storage::{AttendanceRepository, ListQuery, Page, Result};

use super::{query_key, CacheAside};

/// Cached attendance repository decorator.
///
/// The day-window lookup that gates clock-in always reads storage, so a
/// stale list can never let a second record through.
pub struct CachedAttendanceRepository<R, C>
where
    R: AttendanceRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedAttendanceRepository<R, C>
where
    R: AttendanceRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    async fn invalidate(&self, record: &AttendanceRecord) {
        self.cache.invalidate(&[attendance_key(record.id)]).await;
        self.cache
            .invalidate_scope(&user_attendance_scope(record.user_id))
            .await;
    }
}

#[async_trait]
impl<R, C> AttendanceRepository for CachedAttendanceRepository<R, C>
where
    R: AttendanceRepository + 'static,
    C: Cache + 'static,
{
    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
        self.cache
            .record(attendance_key(id), self.repository.get_attendance(id))
            .await
    }

    async fn list_attendance(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<AttendanceRecord>> {
        let key = query_key(&user_attendance_scope(user_id), query);
        self.cache
            .list(key, self.repository.list_attendance(user_id, query))
            .await
    }

    async fn find_attendance_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>> {
        self.repository
            .find_attendance_in_window(user_id, start, end)
            .await
    }

    async fn create_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        self.repository.create_attendance(record).await?;
        self.cache
            .invalidate_scope(&user_attendance_scope(record.user_id))
            .await;

        tracing::debug!(attendance_id = %record.id, user_id = %record.user_id, "Attendance created");
        Ok(())
    }

    async fn update_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        self.repository.update_attendance(record).await?;
        self.invalidate(record).await;

        tracing::debug!(attendance_id = %record.id, "Attendance updated");
        Ok(())
    }

    async fn delete_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        self.repository.delete_attendance(record).await?;
        self.invalidate(record).await;

        tracing::debug!(attendance_id = %record.id, "Attendance deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use campus_core::cache::list_key;
    use campus_core::school::AttendanceStatus;
    use campus_core::storage::RepositoryError;
    use chrono::NaiveDate;
    use tokio::sync::RwLock;

    use crate::storage::cached::testing::{settle, MockCache};

    // Mock repository that counts storage reads
    struct MockAttendanceRepository {
        records: RwLock<HashMap<Uuid, AttendanceRecord>>,
        get_calls: AtomicUsize,
        list_calls: AtomicUsize,
        window_calls: AtomicUsize,
    }

    impl MockAttendanceRepository {
        fn new() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
                get_calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
                window_calls: AtomicUsize::new(0),
            }
        }

        async fn insert(&self, record: AttendanceRecord) {
            self.records.write().await.insert(record.id, record);
        }
    }

    #[async_trait]
    impl AttendanceRepository for MockAttendanceRepository {
        async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.read().await.get(&id).cloned())
        }

        async fn list_attendance(
            &self,
            user_id: Uuid,
            query: &ListQuery,
        ) -> Result<Page<AttendanceRecord>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let rows = self
                .records
                .read()
                .await
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            Ok(Page::slice(rows, query))
        }

        async fn find_attendance_in_window(
            &self,
            user_id: Uuid,
            start: NaiveDateTime,
            end: NaiveDateTime,
        ) -> Result<Option<AttendanceRecord>> {
            self.window_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .records
                .read()
                .await
                .values()
                .find(|r| r.user_id == user_id && r.date >= start && r.date < end)
                .cloned())
        }

        async fn create_attendance(&self, record: &AttendanceRecord) -> Result<()> {
            let mut records = self.records.write().await;
            if records
                .values()
                .any(|r| r.user_id == record.user_id && r.attendance_day() == record.attendance_day())
            {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "AttendanceRecord",
                    id: record.user_id.to_string(),
                });
            }
            records.insert(record.id, record.clone());
            Ok(())
        }

        async fn update_attendance(&self, record: &AttendanceRecord) -> Result<()> {
            self.records.write().await.insert(record.id, record.clone());
            Ok(())
        }

        async fn delete_attendance(&self, record: &AttendanceRecord) -> Result<()> {
            self.records.write().await.remove(&record.id);
            Ok(())
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn setup() -> (
        Arc<MockAttendanceRepository>,
        Arc<MockCache>,
        CachedAttendanceRepository<MockAttendanceRepository, MockCache>,
    ) {
        let repo = Arc::new(MockAttendanceRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedAttendanceRepository::new(repo.clone(), cache.clone(), Duration::from_secs(300));
        (repo, cache, cached)
    }

    #[tokio::test]
    async fn test_get_attendance_cache_miss_then_hit() {
        let (repo, _cache, cached) = setup();
        let record = AttendanceRecord::new(Uuid::new_v4(), at(2, 8), AttendanceStatus::Present);
        repo.insert(record.clone()).await;

        let first = cached.get_attendance(record.id).await.unwrap();
        assert_eq!(first, Some(record.clone()));
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);

        settle().await;

        let second = cached.get_attendance(record.id).await.unwrap();
        assert_eq!(second, Some(record));
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_is_cached_per_query() {
        let (repo, _cache, cached) = setup();
        let user_id = Uuid::new_v4();
        repo.insert(AttendanceRecord::new(user_id, at(2, 8), AttendanceStatus::Present))
            .await;

        cached.list_attendance(user_id, &ListQuery::default()).await.unwrap();
        settle().await;
        cached.list_attendance(user_id, &ListQuery::default()).await.unwrap();
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 1);

        cached.list_attendance(user_id, &ListQuery::page(2, 10)).await.unwrap();
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_invalidates_owner_lists_only() {
        let (_repo, cache, cached) = setup();
        let user_id = Uuid::new_v4();
        let other_user = Uuid::new_v4();

        cached.list_attendance(user_id, &ListQuery::default()).await.unwrap();
        cached.list_attendance(user_id, &ListQuery::all()).await.unwrap();
        cached.list_attendance(other_user, &ListQuery::default()).await.unwrap();
        settle().await;

        let record = AttendanceRecord::new(user_id, at(2, 8), AttendanceStatus::Present);
        cached.create_attendance(&record).await.unwrap();

        let mine = format!("{}:q:", user_attendance_scope(user_id));
        let theirs = format!("{}:q:", user_attendance_scope(other_user));
        assert!(cache.keys_with_prefix(&mine).await.is_empty());
        assert_eq!(cache.keys_with_prefix(&theirs).await.len(), 1);

        let page = cached.list_attendance(user_id, &ListQuery::default()).await.unwrap();
        assert_eq!(page.items, vec![record]);
    }

    #[tokio::test]
    async fn test_update_and_delete_invalidate_record_and_lists() {
        let (repo, cache, cached) = setup();
        let mut record = AttendanceRecord::new(Uuid::new_v4(), at(2, 8), AttendanceStatus::Present);
        repo.insert(record.clone()).await;

        cached.get_attendance(record.id).await.unwrap();
        cached.list_attendance(record.user_id, &ListQuery::default()).await.unwrap();
        settle().await;
        let list = list_key(&user_attendance_scope(record.user_id), &ListQuery::default()).unwrap();
        assert!(cache.contains(&attendance_key(record.id)).await);
        assert!(cache.contains(&list).await);

        record.status = AttendanceStatus::Late;
        cached.update_attendance(&record).await.unwrap();
        assert!(!cache.contains(&attendance_key(record.id)).await);
        assert!(!cache.contains(&list).await);

        let reread = cached.get_attendance(record.id).await.unwrap().unwrap();
        assert_eq!(reread.status, AttendanceStatus::Late);
        settle().await;

        cached.delete_attendance(&record).await.unwrap();
        assert!(!cache.contains(&attendance_key(record.id)).await);
        assert!(cached.get_attendance(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let (repo, cache, cached) = setup();
        let user_id = Uuid::new_v4();
        repo.insert(AttendanceRecord::new(user_id, at(2, 8), AttendanceStatus::Present))
            .await;

        cached.list_attendance(user_id, &ListQuery::default()).await.unwrap();
        settle().await;

        let duplicate = AttendanceRecord::new(user_id, at(2, 15), AttendanceStatus::Late);
        let result = cached.create_attendance(&duplicate).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));

        let list = list_key(&user_attendance_scope(user_id), &ListQuery::default()).unwrap();
        assert!(cache.contains(&list).await);
    }

    #[tokio::test]
    async fn test_window_lookup_always_reads_storage() {
        let (repo, _cache, cached) = setup();
        let user_id = Uuid::new_v4();

        for _ in 0..2 {
            cached
                .find_attendance_in_window(user_id, at(2, 0), at(3, 0))
                .await
                .unwrap();
            settle().await;
        }

        assert_eq!(repo.window_calls.load(Ordering::SeqCst), 2);
    }
}
