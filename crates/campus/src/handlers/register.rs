//! Account registration handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use campus_auth::{CurrentUser, OptionalUser};
use campus_core::school::{RegisterStudentRequest, RegisterUserRequest, Role, Student, User};

use super::authz::{require_role, ADMIN_ONLY};
use super::{response, AppError};
use crate::state::AppState;

/// Roles allowed to enrol students.
const ENROLMENT_ROLES: &[Role] = &[Role::Admin, Role::Staff];

#[derive(Debug, Serialize)]
pub struct StudentAccount {
    pub user: User,
    pub student: Student,
}

/// POST /register
///
/// Open to anyone, except that ADMIN accounts can only be created by an
/// authenticated ADMIN.
pub async fn register_user(
    State(state): State<AppState>,
    OptionalUser(caller): OptionalUser,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;

    if request.role == Role::Admin {
        match caller.as_ref() {
            Some(caller) => require_role(caller, ADMIN_ONLY)?,
            None => {
                return Err(AppError::Forbidden(
                    "Only an administrator can register ADMIN accounts".to_string(),
                ))
            }
        }
    }

    let user = state.services.registration.register_user(request).await?;
    Ok(response::created("User registered", user))
}

/// POST /register/student
pub async fn register_student(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    body: Result<Json<RegisterStudentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;
    require_role(&caller, ENROLMENT_ROLES)?;

    let (user, student) = state.services.registration.register_student(request).await?;
    Ok(response::created(
        "Student registered",
        StudentAccount { user, student },
    ))
}
