use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{calculate_expiry, generate_session_id, is_session_expired, SESSION_ID_LEN};

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Accepts a cookie value only if it has the shape of a generated id.
    ///
    /// Anything else cannot name a stored session, so callers can skip the
    /// lookup.
    pub fn parse(value: &str) -> Option<Self> {
        (value.len() == SESSION_ID_LEN && value.chars().all(|c| c.is_ascii_alphanumeric()))
            .then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logged-in user's cookie session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Opens a fresh session for `user_id` lasting `ttl` from `now`.
    pub fn open(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: generate_session_id(),
            user_id,
            created_at: now,
            expires_at: calculate_expiry(now, ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_session_expired(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sets_expiry() {
        let now = Utc::now();
        let session = Session::open(Uuid::new_v4(), now, Duration::days(7));

        assert_eq!(session.expires_at, now + Duration::days(7));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::days(7)));
    }

    #[test]
    fn test_parse_rejects_foreign_values() {
        let generated = generate_session_id();
        assert_eq!(SessionId::parse(generated.as_str()), Some(generated));

        assert_eq!(SessionId::parse(""), None);
        assert_eq!(SessionId::parse("short"), None);
        assert_eq!(SessionId::parse(&"a".repeat(SESSION_ID_LEN - 1)), None);
        assert_eq!(SessionId::parse(&format!("{}!", "a".repeat(SESSION_ID_LEN - 1))), None);
    }
}
