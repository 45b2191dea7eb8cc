//! User lookup and removal.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{ServiceResult, User};
use campus_core::storage::{UserCascade, UserRepository};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        super::require_user(self.users.as_ref(), id).await
    }

    /// Deletes a user and everything they own.
    ///
    /// A user who still recorded someone else's attendance or reported a
    /// behavior is refused with a conflict.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<UserCascade> {
        let cascade = self.users.delete_user(id).await?;

        tracing::info!(
            user_id = %id,
            attendance = cascade.attendance.len(),
            health_safety = cascade.health_safety.len(),
            addresses = cascade.addresses.len(),
            behaviors = cascade.behaviors.len(),
            "User deleted"
        );
        Ok(cascade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use campus_core::school::ServiceError;
    use crate::storage::cached::testing::settle;
    use campus_core::cache::{attendance_key, user_key, Cache};
    use campus_core::school::{AttendanceStatus, CreateAttendanceRequest, Role};

    #[tokio::test]
    async fn test_delete_clears_owned_records_from_cache() {
        let fx = Fixture::new();
        let student = fx.user("sam", Role::Student).await;
        let record = fx
            .services
            .attendance
            .create(
                student.id,
                None,
                CreateAttendanceRequest {
                    status: AttendanceStatus::Present,
                    absence_reason: None,
                    latitude: None,
                    longitude: None,
                },
            )
            .await
            .unwrap();

        fx.services.users.get(student.id).await.unwrap();
        fx.services.attendance.get(record.id).await.unwrap();
        settle().await;

        let cascade = fx.services.users.delete(student.id).await.unwrap();
        assert_eq!(cascade.attendance, vec![record.id]);

        assert!(fx.cache.get(&user_key(student.id)).await.unwrap().is_none());
        assert!(fx.cache.get(&attendance_key(record.id)).await.unwrap().is_none());
        assert!(matches!(
            fx.services.attendance.get(record.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_recorder_with_records_conflicts() {
        let fx = Fixture::new();
        let staff = fx.user("stu", Role::Admin).await;
        let student = fx.user("sam", Role::Student).await;
        fx.services
            .attendance
            .create(
                student.id,
                Some(staff.id),
                CreateAttendanceRequest {
                    status: AttendanceStatus::Late,
                    absence_reason: None,
                    latitude: None,
                    longitude: None,
                },
            )
            .await
            .unwrap();

        let result = fx.services.users.delete(staff.id).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        fx.services.users.get(staff.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let fx = Fixture::new();
        let ghost = Uuid::new_v4();
        assert_eq!(
            fx.services.users.delete(ghost).await.unwrap_err(),
            ServiceError::not_found("User", ghost)
        );
    }
}
