//! Login session stores.
//!
//! The in-memory store is always compiled; the binary falls back to it when
//! neither `auth-sqlite` nor `auth-redis` is enabled.

mod inmemory;
#[cfg(feature = "redis")]
mod redis_impl;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use inmemory::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use redis_impl::SessionStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SessionStore;
