use thiserror::Error;

/// Why a caller could not be authenticated.
///
/// Every variant except `Storage` ends the request with 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("session not found")]
    SessionNotFound,

    #[error("session expired")]
    SessionExpired,

    /// The token or session is valid but its user has been deleted.
    #[error("account no longer exists")]
    AccountRemoved,

    #[error("storage error: {0}")]
    Storage(String),
}
