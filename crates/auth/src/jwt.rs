//! HS256 bearer tokens.
//!
//! Signature checking is left to `jsonwebtoken`; expiry is checked here
//! against the injected clock so tests can pin time.

use campus_core::auth::AuthError as CoreError;
use campus_core::school::{Role, User};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, now: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user.id.to_string(),
            role: user.role,
            iat,
            exp: iat + ttl_secs,
        }
    }
}

/// Signs a token for `user`.
pub fn issue_token(config: &AuthConfig, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
    let claims = Claims::for_user(user, now, config.jwt_ttl.as_secs() as i64);
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Config(format!("failed to sign token: {}", e)))
}

/// Verifies the signature and expiry of a token and returns its claims.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Claims, CoreError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                CoreError::InvalidToken("signature is invalid".to_string())
            }
            _ => CoreError::InvalidToken(e.to_string()),
        })?
        .claims;

    if claims.exp < now.timestamp() - config.jwt_leeway_secs {
        return Err(CoreError::InvalidToken("token expired".to_string()));
    }

    Ok(claims)
}
