//! Health-and-safety handlers.

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
use campus_core::school::{CreateHealthSafetyRequest, Role, UpdateHealthSafetyRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_role, require_self_or_role, STAFF_ROLES};
use super::{response, AppError};
use crate::state::AppState;

const DELETE_ROLES: &[Role] = &[Role::Admin, Role::Staff];

/// POST /health-safety/{user_id}
pub async fn create_health_safety(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateHealthSafetyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    require_self_or_role(&caller, user_id, STAFF_ROLES)?;
    let Json(request) = body?;
    let record = state.services.health_safety.create(user_id, request).await?;
    Ok(response::created("Health and safety record created", record))
}

/// GET /health-safety/{id}
pub async fn get_health_safety(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let record = state.services.health_safety.get(id).await?;
    require_self_or_role(&caller, record.user_id, STAFF_ROLES)?;
    Ok(response::ok("Health and safety record", record))
}

/// GET /health-safety/user/{user_id}
pub async fn list_health_safety(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    require_self_or_role(&caller, user_id, STAFF_ROLES)?;
    let Query(query) = query?;
    let page = state.services.health_safety.list(user_id, &query).await?;
    response::list(
        "Health and safety records",
        "healthSafetyRecords",
        page,
        &query,
    )
}

/// PUT /health-safety/{id}
pub async fn update_health_safety(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateHealthSafetyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    let existing = state.services.health_safety.get(id).await?;
    require_self_or_role(&caller, existing.user_id, STAFF_ROLES)?;

    let record = state.services.health_safety.update(id, request).await?;
    Ok(response::ok("Health and safety record updated", record))
}

/// DELETE /health-safety/{id}
pub async fn delete_health_safety(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, DELETE_ROLES)?;

    let record = state.services.health_safety.delete(id).await?;
    Ok(response::ok("Health and safety record deleted", record))
}
