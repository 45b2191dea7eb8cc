//! Application state.
//!
//! Storage, cache and session backends are picked at compile time through
//! feature flags; every combination ends up as the same set of trait
//! objects behind `Services` and `AuthState`.

use std::sync::Arc;

use campus_auth::{AuthConfig, AuthState};
use campus_core::auth::SessionRepository;
use campus_core::clock::{Clock, SystemClock};
use campus_core::school::Geofence;

use crate::config::Config;
use crate::services::{Repositories, Services};

// Storage and cache exclusivity is checked in `storage` and `cache`.
#[cfg(all(feature = "auth-sqlite", feature = "auth-redis"))]
compile_error!("Cannot enable both 'auth-sqlite' and 'auth-redis' session features");

/// Shared application state.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub auth: AuthState,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Connects the configured backends and builds the state.
    pub async fn new(config: &Config, auth_config: AuthConfig) -> Result<Self, anyhow::Error> {
        let repos = backends::repositories(config).await?;
        let sessions = sessions::store(config, &auth_config).await?;

        tracing::info!(
            cache_ttl_secs = config.cache_ttl_seconds,
            geofence_radius_m = config.geofence_radius_meters,
            "Backends ready"
        );

        Ok(Self::build(
            &repos,
            sessions,
            auth_config,
            config.geofence(),
            Arc::new(SystemClock),
        ))
    }

    fn build(
        repos: &Repositories,
        sessions: Arc<dyn SessionRepository>,
        auth_config: AuthConfig,
        geofence: Geofence,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let services = Services::new(repos, clock.clone(), geofence, auth_config.bcrypt_cost);
        let auth = AuthState::new(sessions, repos.users.clone(), auth_config).with_clock(clock);
        Self { services, auth }
    }
}

// ============================================================================
// Storage and cache backends
// ============================================================================

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod backends {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    /// In-memory storage and LRU cache. Nothing survives a restart.
    pub async fn repositories(config: &Config) -> Result<Repositories, anyhow::Error> {
        tracing::warn!("Using in-memory storage, data is lost on shutdown");
        let storage = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        Ok(Repositories::cached(storage, cache, config.cache_ttl()))
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod backends {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::InMemoryRepository;

    pub async fn repositories(config: &Config) -> Result<Repositories, anyhow::Error> {
        let storage = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
        Ok(Repositories::cached(storage, cache, config.cache_ttl()))
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod backends {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::SqliteRepository;

    pub async fn repositories(config: &Config) -> Result<Repositories, anyhow::Error> {
        let storage = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        tracing::info!(path = %config.sqlite_path, "SQLite storage opened");
        Ok(Repositories::cached(storage, cache, config.cache_ttl()))
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod backends {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::SqliteRepository;

    pub async fn repositories(config: &Config) -> Result<Repositories, anyhow::Error> {
        let storage = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
        let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
        tracing::info!(path = %config.sqlite_path, "SQLite storage opened");
        Ok(Repositories::cached(storage, cache, config.cache_ttl()))
    }
}

// ============================================================================
// Session stores
// ============================================================================

#[cfg(not(any(feature = "auth-sqlite", feature = "auth-redis")))]
mod sessions {
    use super::*;
    use campus_auth::InMemorySessionStore;

    pub async fn store(
        _config: &Config,
        _auth: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        Ok(Arc::new(InMemorySessionStore::new()))
    }
}

#[cfg(feature = "auth-sqlite")]
mod sessions {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;
    use campus_auth::SessionStore;

    /// Sessions live in the same database file as the records.
    pub async fn store(
        config: &Config,
        _auth: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.sqlite_path))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = SessionStore::new(pool);
        store.migrate().await?;

        let purged = store.purge_expired(chrono::Utc::now()).await?;
        tracing::info!(purged, "SQLite session store ready");
        Ok(Arc::new(store))
    }
}

#[cfg(feature = "auth-redis")]
mod sessions {
    use std::sync::Arc;

    use fred::prelude::{Builder, ClientLike, Config as RedisConfig};

    use campus_auth::{AuthConfig, SessionStore};
    use campus_core::auth::SessionRepository;

    use crate::config::Config;

    const POOL_SIZE: usize = 4;

    pub async fn store(
        config: &Config,
        auth: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        let redis_config = RedisConfig::from_url(&config.redis_url)?;
        let pool = Builder::from_config(redis_config).build_pool(POOL_SIZE)?;
        pool.init().await?;

        Ok(Arc::new(SessionStore::new(pool, auth.session_ttl)))
    }
}

// ============================================================================
// Test support
// ============================================================================
