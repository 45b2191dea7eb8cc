//! Role checks for API handlers.
//!
//! Authentication happens in the `CurrentUser` extractor; these helpers only
//! decide whether an authenticated caller may proceed. Failures are 403.

use uuid::Uuid;

use campus_core::school::{Role, User};

use super::AppError;

/// Roles allowed to write records about other people.
pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Teacher, Role::Staff];

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Requires the caller to hold one of `allowed`.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %user.id,
        role = %user.role,
        "Authorization denied: insufficient role"
    );
    Err(AppError::Forbidden(format!(
        "Requires one of: {}",
        allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Allows the caller to act on their own records, or on anyone's with one
/// of `allowed`.
pub fn require_self_or_role(user: &User, target: Uuid, allowed: &[Role]) -> Result<(), AppError> {
    if user.id == target {
        Ok(())
    } else {
        require_role(user, allowed)
    }
}
