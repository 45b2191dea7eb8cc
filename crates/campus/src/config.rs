use std::{env, time::Duration};

use campus_core::school::{GeoPoint, Geofence, DEFAULT_RADIUS_METERS};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "campus.db")
    /// Note: Only used by the `sqlite` storage and `auth-sqlite` session features.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` or `auth-redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Reference point for on-site clock-ins.
    pub geofence_latitude: f64,
    pub geofence_longitude: f64,
    /// Permitted distance from the reference point (default: 100 m)
    pub geofence_radius_meters: f64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "campus.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `GEOFENCE_LATITUDE` / `GEOFENCE_LONGITUDE` - School location (default: 0, 0)
    /// - `GEOFENCE_RADIUS_METERS` - Permitted radius (default: 100)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS").unwrap_or(300),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "campus.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            geofence_latitude: env_parse("GEOFENCE_LATITUDE").unwrap_or(0.0),
            geofence_longitude: env_parse("GEOFENCE_LONGITUDE").unwrap_or(0.0),
            geofence_radius_meters: env_parse("GEOFENCE_RADIUS_METERS")
                .filter(|radius: &f64| *radius > 0.0)
                .unwrap_or(DEFAULT_RADIUS_METERS),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn geofence(&self) -> Geofence {
        Geofence::new(
            GeoPoint::new(self.geofence_latitude, self.geofence_longitude),
            self.geofence_radius_meters,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
