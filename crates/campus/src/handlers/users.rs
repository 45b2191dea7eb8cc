//! User account handlers.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use campus_auth::CurrentUser;

use super::authz::{require_role, ADMIN_ONLY};
use super::{response, AppError};
use crate::state::AppState;

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let user = state.services.users.get(id).await?;
    Ok(response::ok("User", user))
}

/// DELETE /users/{id} - Removes the account and everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, ADMIN_ONLY)?;

    if caller.id == id {
        return Err(AppError::BadRequest(
            "Administrators cannot delete their own account".to_string(),
        ));
    }

    let cascade = state.services.users.delete(id).await?;

    // The account is gone, so its credentials no longer resolve. Revoking
    // only clears the stored sessions.
    match state.auth.sessions.delete_user_sessions(id).await {
        Ok(revoked) => tracing::debug!(user_id = %id, sessions = revoked, "Sessions revoked"),
        Err(err) => tracing::warn!(user_id = %id, error = %err, "Failed to revoke sessions"),
    }

    Ok(response::ok(
        "User deleted",
        json!({
            "id": cascade.user_id,
            "studentId": cascade.student_id,
        }),
    ))
}
