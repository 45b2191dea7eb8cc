//! Each list key is also added to a Redis set named by
//! [`scope_tracking_key`]; clearing a scope deletes that set's members.
//! Writes to a value and its index go through one `MULTI` pipeline.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use campus_core::cache::{list_scope_of_key, scope_tracking_key, Cache, Result};

use super::error::map_redis_error;

pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to `url`, e.g. `redis://localhost:6379`.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        // SET EX takes whole seconds.
        let seconds = ttl.as_secs().max(1);

        let mut pipe = redis::pipe();
        pipe.atomic().set_ex(key, value, seconds).ignore();
        if let Some(scope) = list_scope_of_key(key) {
            // The index never outlives the newest page it lists.
            let index = scope_tracking_key(scope);
            pipe.sadd(&index, key)
                .ignore()
                .expire(&index, i64::try_from(seconds).unwrap_or(i64::MAX))
                .ignore();
        }

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            if let Some(scope) = list_scope_of_key(key) {
                pipe.srem(scope_tracking_key(scope), key).ignore();
            }
        }
        pipe.del(keys);

        let mut conn = self.conn.clone();
        let (removed,): (u64,) = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(removed)
    }

    async fn clear_scope(&self, scope: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let index = scope_tracking_key(scope);

        let members: Vec<String> = conn.smembers(&index).await.map_err(map_redis_error)?;
        if members.is_empty() {
            return Ok(0);
        }

        // SREM rather than DEL on the index: a page cached after SMEMBERS
        // stays indexed.
        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .del(&members)
            .srem(&index, &members)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(removed)
    }
}
