//! Cached repository decorators.
//!
//! Each decorator wraps a repository trait with the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss fetch from the repository and
//!   populate the cache in the background
//! - **Writes**: Persist to the repository, then invalidate the record's key
//!   and every list query of its owner
//!
//! Cache failures never fail a request. They are logged and the request is
//! served from storage.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let repo = Arc::new(SqliteRepository::new("campus.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let attendance = CachedAttendanceRepository::new(repo, cache, Duration::from_secs(300));
//! ```

mod address;
mod attendance;
mod disciplinary_action;
mod health_safety;
mod student_behavior;
mod term;
mod user;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use campus_core::cache::{deserialize_value, serialize_value, Cache};
use campus_core::storage::{ListQuery, Result};

pub use address::CachedAddressRepository;
pub use attendance::CachedAttendanceRepository;
pub use disciplinary_action::CachedDisciplinaryActionRepository;
pub use health_safety::CachedHealthSafetyRepository;
pub use student_behavior::CachedStudentBehaviorRepository;
pub use term::CachedTermRepository;
pub use user::CachedUserRepository;

/// Cache-aside operations shared by the decorators.
pub struct CacheAside<C: Cache> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C: Cache> Clone for CacheAside<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C: Cache + 'static> CacheAside<C> {
    pub fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Reads a cached value. Misses, cache errors and undecodable bytes all
    /// come back as `None`.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match deserialize_value(&bytes) {
                Ok(value) => {
                    tracing::trace!(cache_key = %key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    tracing::warn!(cache_key = %key, error = %err, "Cached value deserialization failed");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(cache_key = %key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(cache_key = %key, error = %err, "Cache read failed");
                None
            }
        }
    }

    /// Stores a value without waiting for the cache.
    pub fn populate<T: Serialize + ?Sized>(&self, key: String, value: &T) {
        let bytes = match serialize_value(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(cache_key = %key, error = %err, "Failed to serialize value for cache");
                return;
            }
        };

        let cache = Arc::clone(&self.cache);
        let ttl = self.ttl;
        tokio::spawn(async move {
            if let Err(err) = cache.set(&key, &bytes, ttl).await {
                tracing::warn!(cache_key = %key, error = %err, "Failed to populate cache");
            }
        });
    }

    /// Cache-aside read of a single record. Absent records are not cached.
    pub async fn record<T, F>(&self, key: String, load: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<Option<T>>>,
    {
        if let Some(value) = self.read(&key).await {
            return Ok(Some(value));
        }

        let value = load.await?;
        if let Some(ref v) = value {
            self.populate(key, v);
        }
        Ok(value)
    }

    /// Cache-aside read of a list query result.
    pub async fn list<T, F>(&self, key: Option<String>, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        let Some(key) = key else {
            return load.await;
        };

        if let Some(value) = self.read(&key).await {
            return Ok(value);
        }

        let value = load.await?;
        self.populate(key, &value);
        Ok(value)
    }

    /// Deletes single keys.
    pub async fn invalidate(&self, keys: &[String]) {
        match self.cache.delete(keys).await {
            Ok(removed) => tracing::trace!(keys = keys.len(), removed, "Cache keys invalidated"),
            Err(err) => tracing::warn!(keys = ?keys, error = %err, "Failed to invalidate cache keys"),
        }
    }

    /// Deletes every list query cached under a scope.
    pub async fn invalidate_scope(&self, scope: &str) {
        match self.cache.clear_scope(scope).await {
            Ok(removed) => tracing::trace!(cache_scope = %scope, removed, "List cache cleared"),
            Err(err) => tracing::warn!(cache_scope = %scope, error = %err, "Failed to invalidate list cache"),
        }
    }
}

/// Derives a list key from the query's cache identity, logging and skipping
/// the cache when the query cannot be normalized.
fn query_key(scope: &str, query: &ListQuery) -> Option<String> {
    match campus_core::cache::list_key(scope, &query.cache_identity()) {
        Ok(key) => Some(key),
        Err(err) => {
            tracing::warn!(cache_scope = %scope, error = %err, "Failed to derive list cache key");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock cache shared by the decorator tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use campus_core::cache::{list_scope_of_key, Cache, CacheError, Result as CacheResult};

    pub struct MockCache {
        pub store: RwLock<HashMap<String, Vec<u8>>>,
        pub sets: AtomicUsize,
        pub failing: AtomicBool,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self {
                store: RwLock::new(HashMap::new()),
                sets: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        pub fn fail(&self) {
            self.failing.store(true, Ordering::SeqCst);
        }

        pub async fn contains(&self, key: &str) -> bool {
            self.store.read().await.contains_key(key)
        }

        pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
            self.store
                .read()
                .await
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect()
        }

        fn check(&self) -> CacheResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(CacheError::Unavailable("cache is down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            self.check()?;
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Duration) -> CacheResult<()> {
            self.check()?;
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
            self.check()?;
            let mut store = self.store.write().await;
            Ok(keys.iter().filter(|k| store.remove(*k).is_some()).count() as u64)
        }

        async fn clear_scope(&self, scope: &str) -> CacheResult<u64> {
            self.check()?;
            let mut store = self.store.write().await;
            let before = store.len();
            store.retain(|k, _| list_scope_of_key(k) != Some(scope));
            Ok((before - store.len()) as u64)
        }
    }

    /// Lets spawned cache writes run.
    pub async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{settle, MockCache};
    use super::*;
    use std::sync::atomic::Ordering;

    fn aside(cache: &Arc<MockCache>) -> CacheAside<MockCache> {
        CacheAside::new(Arc::clone(cache), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_record_populates_on_miss_and_serves_hit() {
        let cache = Arc::new(MockCache::new());
        let aside = aside(&cache);

        let first: Option<String> = aside
            .record("term:1".to_string(), async { Ok(Some("fall".to_string())) })
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("fall"));
        settle().await;
        assert!(cache.contains("term:1").await);

        let second: Option<String> = aside
            .record("term:1".to_string(), async { Ok(Some("changed".to_string())) })
            .await
            .unwrap();
        assert_eq!(second.as_deref(), Some("fall"));
    }

    #[tokio::test]
    async fn test_absent_record_is_not_cached() {
        let cache = Arc::new(MockCache::new());
        let aside = aside(&cache);

        let missing: Option<String> = aside
            .record("term:2".to_string(), async { Ok(None) })
            .await
            .unwrap();
        settle().await;

        assert!(missing.is_none());
        assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let cache = Arc::new(MockCache::new());
        cache.set("term:3", b"{not json", Duration::from_secs(60)).await.unwrap();
        let aside = aside(&cache);

        let value: Option<String> = aside
            .record("term:3".to_string(), async { Ok(Some("spring".to_string())) })
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("spring"));
    }

    #[tokio::test]
    async fn test_cache_outage_falls_through_to_storage() {
        let cache = Arc::new(MockCache::new());
        cache.fail();
        let aside = aside(&cache);

        let value: Vec<u32> = aside
            .list(Some("term:all:q:page=1".to_string()), async { Ok(vec![1, 2]) })
            .await
            .unwrap();
        assert_eq!(value, vec![1, 2]);

        aside.invalidate(&["term:1".to_string()]).await;
        aside.invalidate_scope("term:all").await;
    }

    #[test]
    fn test_equivalent_queries_share_a_list_key() {
        let all_p1: ListQuery = serde_json::from_str(r#"{"fetchAll": true, "page": 1}"#).unwrap();
        let all_p2: ListQuery = serde_json::from_str(r#"{"fetchAll": true, "page": 2}"#).unwrap();
        assert_eq!(query_key("term:all", &all_p1), query_key("term:all", &all_p2));

        let trimmed = ListQuery::default().with_search("flu");
        let padded = ListQuery::default().with_search(" flu ");
        assert_eq!(query_key("term:all", &trimmed), query_key("term:all", &padded));

        assert_ne!(
            query_key("term:all", &ListQuery::page(1, 10)),
            query_key("term:all", &ListQuery::page(2, 10))
        );
    }

    #[tokio::test]
    async fn test_invalidate_scope_leaves_records() {
        let cache = Arc::new(MockCache::new());
        cache.set("term:all:q:page=1", b"[]", Duration::from_secs(60)).await.unwrap();
        cache.set("term:all:q:page=2", b"[]", Duration::from_secs(60)).await.unwrap();
        cache.set("term:1", b"\"fall\"", Duration::from_secs(60)).await.unwrap();

        aside(&cache).invalidate_scope("term:all").await;

        assert!(cache.keys_with_prefix("term:all:q:").await.is_empty());
        assert!(cache.contains("term:1").await);
    }
}
