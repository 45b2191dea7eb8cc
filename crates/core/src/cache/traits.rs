use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Byte store behind the cached repositories.
///
/// Keys come from [`super::list_key`] and the per-entity key builders.
/// Backends remember every list key they store under its scope, so one
/// write can drop all cached pages of its owner with [`Cache::clear_scope`].
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Removes the given keys. Returns how many were present.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Removes every list key stored under `scope`. Returns how many were present.
    async fn clear_scope(&self, scope: &str) -> Result<u64>;
}
