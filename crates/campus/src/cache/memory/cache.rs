//! Bounded LRU cache with per-entry expiry.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use campus_core::cache::{list_scope_of_key, Cache, Result};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Entries and the scope index share one lock so they never disagree.
struct Inner {
    entries: LruCache<String, Entry>,
    scopes: HashMap<String, HashSet<String>>,
}

impl Inner {
    fn forget(&mut self, key: &str) {
        let Some(scope) = list_scope_of_key(key) else {
            return;
        };
        if let Some(keys) = self.scopes.get_mut(scope) {
            keys.remove(key);
            if keys.is_empty() {
                self.scopes.remove(scope);
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        self.forget(key);
        self.entries.pop(key).is_some()
    }
}

/// In-memory [`Cache`] holding at most `max_entries` values.
///
/// Expired entries are dropped when read. Evicted list keys also leave the
/// scope index.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCache {
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: LruCache::new(capacity),
                scopes: HashMap::new(),
            })),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.lock().await;
        match inner.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }
        inner.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };

        let mut inner = self.inner.lock().await;
        if let Some((evicted, _)) = inner.entries.push(key.to_string(), entry) {
            if evicted != key {
                inner.forget(&evicted);
            }
        }
        if let Some(scope) = list_scope_of_key(key) {
            inner
                .scopes
                .entry(scope.to_string())
                .or_default()
                .insert(key.to_string());
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        Ok(keys.iter().filter(|key| inner.remove(key)).count() as u64)
    }

    async fn clear_scope(&self, scope: &str) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let Some(keys) = inner.scopes.remove(scope) else {
            return Ok(0);
        };
        Ok(keys.iter().filter(|key| inner.entries.pop(*key).is_some()).count() as u64)
    }
}
