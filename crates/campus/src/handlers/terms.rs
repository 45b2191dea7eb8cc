//! Academic term handlers.

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
use campus_core::school::{CreateTermRequest, UpdateTermRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_role, ADMIN_ONLY};
use super::{response, AppError};
use crate::state::AppState;

/// POST /terms
pub async fn create_term(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    body: Result<Json<CreateTermRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;
    require_role(&caller, ADMIN_ONLY)?;

    let term = state.services.terms.create(request).await?;
    Ok(response::created("Term created", term))
}

/// GET /terms
pub async fn list_terms(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let page = state.services.terms.list(&query).await?;
    response::list("Terms", "terms", page, &query)
}

/// GET /terms/{id}
pub async fn get_term(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let term = state.services.terms.get(id).await?;
    Ok(response::ok("Term", term))
}

/// PUT /terms/{id}
pub async fn update_term(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateTermRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    require_role(&caller, ADMIN_ONLY)?;

    let term = state.services.terms.update(id, request).await?;
    Ok(response::ok("Term updated", term))
}

/// DELETE /terms/{id}
pub async fn delete_term(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    require_role(&caller, ADMIN_ONLY)?;

    let term = state.services.terms.delete(id).await?;
    Ok(response::ok("Term deleted", term))
}
