//! Disciplinary action handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use campus_auth::CurrentUser;
use campus_core::school::{CreateDisciplinaryActionRequest, UpdateDisciplinaryActionRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_role, ADMIN_ONLY, STAFF_ROLES};
use super::{response, AppError};
use crate::state::AppState;

/// POST /disciplinary-actions/{student_id}
pub async fn create_disciplinary_action(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateDisciplinaryActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(student_id) = path?;
    let Json(request) = body?;
    require_role(&caller, STAFF_ROLES)?;

    let action = state
        .services
        .disciplinary_actions
        .create(student_id, request)
        .await?;
    Ok(response::created("Disciplinary action created", action))
}

/// GET /disciplinary-actions/{id}
pub async fn get_disciplinary_action(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let action = state.services.disciplinary_actions.get(id).await?;
    Ok(response::ok("Disciplinary action", action))
}

/// GET /disciplinary-actions/student/{student_id}
pub async fn list_disciplinary_actions(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(student_id) = path?;
    let Query(query) = query?;
    let page = state
        .services
        .disciplinary_actions
        .list(student_id, &query)
        .await?;
    response::list("Disciplinary actions", "disciplinaryActions", page, &query)
}

/// PUT /disciplinary-actions/{id}
pub async fn update_disciplinary_action(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateDisciplinaryActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    require_role(&caller, STAFF_ROLES)?;

    let action = state.services.disciplinary_actions.update(id, request).await?;
    Ok(response::ok("Disciplinary action updated", action))
}

/// DELETE /disciplinary-actions/{id}
pub async fn delete_disciplinary_action(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, ADMIN_ONLY)?;

    let action = state.services.disciplinary_actions.delete(id).await?;
    Ok(response::ok("Disciplinary action deleted", action))
}
