//! Process-local cache for single-instance deployments.

mod cache;

pub use cache::MemoryCache;
