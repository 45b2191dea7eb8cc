//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use campus_core::auth::{parse_bearer, AuthError as CoreError, SessionId};
use campus_core::school::User;
use uuid::Uuid;

use crate::error::AuthError;
use crate::jwt::validate_token;
use crate::AuthState;

/// Extractor for authenticated user. Returns 401 if not authenticated.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        authenticate(parts, &auth_state)
            .await?
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor for optionally authenticated user. Returns None if not authenticated.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        match authenticate(parts, &auth_state).await {
            Ok(user) => Ok(OptionalUser(user)),
            Err(AuthError::Core(CoreError::Storage(e))) => Err(AuthError::storage(e)),
            Err(_) => Ok(OptionalUser(None)),
        }
    }
}

/// Resolves the caller from a bearer token, falling back to the session cookie.
///
/// Returns `Ok(None)` when the request carries no credentials at all.
async fn authenticate(parts: &Parts, state: &AuthState) -> Result<Option<User>, AuthError> {
    // Try Authorization header first (for API/mobile clients)
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(parse_bearer)
            .ok_or_else(|| CoreError::InvalidToken("malformed authorization header".into()))?;

        let claims = validate_token(&state.config, token, state.clock.now_utc())?;
        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| CoreError::InvalidToken("subject is not a user id".into()))?;
        return load_user(state, user_id).await.map(Some);
    }

    // Fall back to cookie (for web clients)
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(&state.config.cookie_name) else {
        return Ok(None);
    };

    let session_id = SessionId::parse(cookie.value()).ok_or(CoreError::SessionNotFound)?;
    let session = state
        .sessions
        .get_session(&session_id)
        .await?
        .ok_or(CoreError::SessionNotFound)?;

    if session.is_expired(state.clock.now_utc()) {
        return Err(CoreError::SessionExpired.into());
    }

    load_user(state, session.user_id).await.map(Some)
}

/// Deleted accounts fail authentication even with a still-valid token.
async fn load_user(state: &AuthState, user_id: Uuid) -> Result<User, AuthError> {
    state
        .users
        .get_user(user_id)
        .await
        .map_err(AuthError::storage)?
        .ok_or(CoreError::AccountRemoved.into())
}
