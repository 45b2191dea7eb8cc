//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use campus_core::auth::{AuthError as CoreError, Session, SessionId};
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AuthError;
use crate::extractors::CurrentUser;
use crate::jwt::issue_token;
use crate::password::verify_password;
use crate::AuthState;

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `POST /auth/login` - Verify credentials, start a session, issue a bearer token
/// - `POST /auth/logout` - End current session
/// - `POST /auth/logout-all` - End all sessions for current user
/// - `GET /auth/me` - Get current authenticated user
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/logout-all", post(logout_all))
        .route("/auth/me", get(me))
}

async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let Json(request) = body.map_err(|e| AuthError::BadRequest(e.body_text()))?;

    let credentials = state
        .users
        .get_user_credentials(request.identifier.trim())
        .await
        .map_err(AuthError::storage)?;

    let Some(credentials) = credentials else {
        tracing::info!(identifier = %request.identifier, "Login for unknown account");
        return Err(CoreError::InvalidCredentials.into());
    };

    if !verify_password(&request.password, &credentials.password_hash).await? {
        tracing::info!(user_id = %credentials.user.id, "Login with wrong password");
        return Err(CoreError::InvalidCredentials.into());
    }

    let user = credentials.user;
    let now = state.clock.now_utc();
    let ttl_secs = state.config.session_ttl.as_secs() as i64;

    let session = Session::open(user.id, now, Duration::seconds(ttl_secs));
    state.sessions.create_session(&session).await?;

    let token = issue_token(&state.config, &user, now)?;

    let cookie = Cookie::build((state.config.cookie_name.clone(), session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_secs))
        .build();

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok((
        jar.add(cookie),
        Json(json!({
            "message": "Login successful",
            "data": { "user": user, "token": token },
        })),
    ))
}

async fn logout(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let session_id = jar
        .get(&state.config.cookie_name)
        .and_then(|cookie| SessionId::parse(cookie.value()));
    if let Some(session_id) = session_id {
        state.sessions.delete_session(&session_id).await?;
    }

    tracing::info!(user_id = %user.id, "User logged out");

    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    Ok((jar, Json(json!({ "message": "Logged out", "data": null }))))
}

async fn logout_all(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let ended = state.sessions.delete_user_sessions(user.id).await?;

    tracing::info!(user_id = %user.id, sessions = ended, "All sessions ended");

    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    Ok((
        jar,
        Json(json!({ "message": "Logged out of all sessions", "data": null })),
    ))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "message": "Current user", "data": user }))
}
