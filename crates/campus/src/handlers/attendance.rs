//! Attendance handlers.

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
use campus_core::school::{CreateAttendanceRequest, UpdateAttendanceRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_role, require_self_or_role, ADMIN_ONLY, STAFF_ROLES};
use super::{response, AppError};
use crate::state::AppState;

/// POST /attendance/{user_id} - Clock in, for yourself or as a recorder.
pub async fn create_attendance(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateAttendanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let Json(request) = body?;
    require_self_or_role(&caller, user_id, STAFF_ROLES)?;

    let recorder_id = (caller.id != user_id).then_some(caller.id);
    let record = state
        .services
        .attendance
        .create(user_id, recorder_id, request)
        .await?;

    Ok(response::created("Attendance recorded", record))
}

/// GET /attendance/{id}
pub async fn get_attendance(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let record = state.services.attendance.get(id).await?;
    Ok(response::ok("Attendance record", record))
}

/// GET /attendance/user/{user_id}
pub async fn list_attendance(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let page = state.services.attendance.list(user_id, &query).await?;
    response::list("Attendance records", "attendance", page, &query)
}

/// PUT /attendance/{id}
pub async fn update_attendance(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateAttendanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    require_role(&caller, STAFF_ROLES)?;

    let record = state.services.attendance.update(id, request).await?;
    Ok(response::ok("Attendance updated", record))
}

/// DELETE /attendance/{id}
pub async fn delete_attendance(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, ADMIN_ONLY)?;

    let record = state.services.attendance.delete(id).await?;
    Ok(response::ok("Attendance deleted", record))
}
