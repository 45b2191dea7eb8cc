//! Account registration.

use std::sync::Arc;

use campus_auth::hash_password;
use campus_core::school::{
    RegisterStudentRequest, RegisterUserRequest, Role, ServiceError, ServiceResult, Student, User,
};
use campus_core::storage::{RepositoryError, StudentRepository, UserRepository};

#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    students: Arc<dyn StudentRepository>,
    bcrypt_cost: u32,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        students: Arc<dyn StudentRepository>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            students,
            bcrypt_cost,
        }
    }

    /// Registers an account of any role.
    ///
    /// Whether the caller may create the requested role is decided by the
    /// HTTP layer.
    pub async fn register_user(&self, request: RegisterUserRequest) -> ServiceResult<User> {
        request.validate()?;

        let user = request.to_user();
        let hash = self.hash(&request.password).await?;
        self.users
            .create_user(&user, &hash)
            .await
            .map_err(duplicate_account)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Registers a STUDENT account together with its student profile.
    pub async fn register_student(
        &self,
        request: RegisterStudentRequest,
    ) -> ServiceResult<(User, Student)> {
        request.validate()?;

        if let Some(parent_id) = request.parent_id {
            let parent = self
                .users
                .get_user(parent_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", parent_id))?;
            if parent.role != Role::Parent {
                return Err(ServiceError::validation(
                    "parentId",
                    "parentId must reference a PARENT account",
                ));
            }
        }

        let account = request.account();
        let user = account.to_user();
        let student = request.to_student(user.id);
        let hash = self.hash(&account.password).await?;

        self.students
            .create_student_account(&user, &hash, &student)
            .await
            .map_err(duplicate_account)?;

        tracing::info!(user_id = %user.id, student_id = %student.id, "Student registered");
        Ok((user, student))
    }

    async fn hash(&self, password: &str) -> ServiceResult<String> {
        hash_password(password, self.bcrypt_cost)
            .await
            .map_err(|e| ServiceError::Storage(RepositoryError::QueryFailed(e.to_string())))
    }
}

/// Duplicate usernames, emails and admission numbers all read as one conflict.
fn duplicate_account(error: RepositoryError) -> ServiceError {
    match error {
        RepositoryError::AlreadyExists { entity_type, .. } => ServiceError::Conflict(format!(
            "{entity_type} with the same username, email or admission number already exists"
        )),
        other => other.into(),
    }
}
