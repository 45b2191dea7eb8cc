//! Cache backends, one per feature.
//!
//! - `memory` (default): [`MemoryCache`], an LRU inside the process
//! - `redis`: [`RedisCache`]
//!
//! Exactly one must be enabled. Tests can always use [`MemoryCache`].

#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' cache features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Enable a cache backend: 'memory' or 'redis'");

#[cfg(any(feature = "memory", test))]
mod memory;

#[cfg(feature = "redis")]
mod redis_impl;

#[cfg(any(feature = "memory", test))]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
