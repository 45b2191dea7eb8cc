//! Address handlers.

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
use campus_core::school::{CreateAddressRequest, UpdateAddressRequest};
use campus_core::storage::ListQuery;

use super::authz::{require_self_or_role, STAFF_ROLES};
use super::{response, AppError};
use crate::state::AppState;

/// POST /addresses/{user_id}
pub async fn create_address(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateAddressRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    require_self_or_role(&caller, user_id, STAFF_ROLES)?;
    let Json(request) = body?;
    let address = state.services.addresses.create(user_id, request).await?;
    Ok(response::created("Address created", address))
}

/// GET /addresses/{id}
pub async fn get_address(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let address = state.services.addresses.get(id).await?;
    require_self_or_role(&caller, address.user_id, STAFF_ROLES)?;
    Ok(response::ok("Address", address))
}

/// GET /addresses/user/{user_id}
pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    require_self_or_role(&caller, user_id, STAFF_ROLES)?;
    let Query(query) = query?;
    let page = state.services.addresses.list(user_id, &query).await?;
    response::list("Addresses", "addresses", page, &query)
}

/// PUT /addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateAddressRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    let existing = state.services.addresses.get(id).await?;
    require_self_or_role(&caller, existing.user_id, STAFF_ROLES)?;

    let address = state.services.addresses.update(id, request).await?;
    Ok(response::ok("Address updated", address))
}

/// DELETE /addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let existing = state.services.addresses.get(id).await?;
    require_self_or_role(&caller, existing.user_id, STAFF_ROLES)?;

    let address = state.services.addresses.delete(id).await?;
    Ok(response::ok("Address deleted", address))
}
