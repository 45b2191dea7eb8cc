//! Student behavior handlers.

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
use campus_core::school::{CreateStudentBehaviorRequest, UpdateStudentBehaviorRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_role, ADMIN_ONLY, STAFF_ROLES};
use super::{response, AppError};
use crate::state::AppState;

/// POST /student-behaviors/{student_id} - The caller is recorded as reporter.
pub async fn create_student_behavior(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateStudentBehaviorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(student_id) = path?;
    let Json(request) = body?;
    require_role(&caller, STAFF_ROLES)?;

    let behavior = state
        .services
        .behaviors
        .create(student_id, &caller, request)
        .await?;
    Ok(response::created("Student behavior recorded", behavior))
}

/// GET /student-behaviors/{id}
pub async fn get_student_behavior(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let behavior = state.services.behaviors.get(id).await?;
    Ok(response::ok("Student behavior", behavior))
}

/// GET /student-behaviors/student/{student_id}
pub async fn list_student_behaviors(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(student_id) = path?;
    let Query(query) = query?;
    let page = state.services.behaviors.list(student_id, &query).await?;
    response::list("Student behaviors", "studentBehaviors", page, &query)
}

/// PUT /student-behaviors/{id}
pub async fn update_student_behavior(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateStudentBehaviorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    require_role(&caller, STAFF_ROLES)?;

    let behavior = state.services.behaviors.update(id, request).await?;
    Ok(response::ok("Student behavior updated", behavior))
}

/// DELETE /student-behaviors/{id} - Also removes the behavior's actions.
pub async fn delete_student_behavior(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, ADMIN_ONLY)?;

    let behavior = state.services.behaviors.delete(id).await?;
    Ok(response::ok("Student behavior deleted", behavior))
}
