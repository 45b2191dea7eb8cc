use std::time::Duration;

use crate::error::AuthError;

const MIN_SECRET_LEN: usize = 32;

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens.
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// Clock skew tolerated when checking token expiry.
    pub jwt_leeway_secs: i64,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Creates a configuration with default lifetimes around a signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_ttl: Duration::from_secs(24 * 60 * 60),
            jwt_leeway_secs: 30,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_name: "session".to_string(),
            cookie_secure: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: Token signing secret, at least 32 bytes (required)
    /// - `JWT_TTL_HOURS`: Bearer token lifetime in hours (default: 24)
    /// - `SESSION_TTL_DAYS`: Session TTL in days (default: 7)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: true)
    /// - `BCRYPT_COST`: bcrypt work factor (default: 12)
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or too short.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET must be set".to_string()))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let mut config = Self::new(jwt_secret);

        if let Some(hours) = env_parse::<u64>("JWT_TTL_HOURS") {
            config.jwt_ttl = Duration::from_secs(hours * 60 * 60);
        }

        if let Some(days) = env_parse::<u64>("SESSION_TTL_DAYS") {
            config.session_ttl = Duration::from_secs(days * 24 * 60 * 60);
        }

        config.cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        if let Some(cost) = env_parse::<u32>("BCRYPT_COST") {
            config.bcrypt_cost = cost;
        }

        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}
