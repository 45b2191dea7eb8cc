use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Auth errors for the campus_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for I/O operations that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (credentials, tokens, sessions)
    #[error(transparent)]
    Core(#[from] campus_core::auth::AuthError),

    /// No credentials were presented
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed request body
    #[error("{0}")]
    BadRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Password hashing failed
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    pub fn storage(error: impl ToString) -> Self {
        Self::Core(campus_core::auth::AuthError::Storage(error.to_string()))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use campus_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidCredentials
                | CoreError::InvalidToken(_)
                | CoreError::SessionNotFound
                | CoreError::SessionExpired
                | CoreError::AccountRemoved => (StatusCode::UNAUTHORIZED, self.to_string()),
                CoreError::Storage(_) => {
                    tracing::error!(error = %self, "Auth storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Config(_) | AuthError::Hashing(_) => {
                tracing::error!(error = %self, "Auth error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
