use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::school::{
    Address, AttendanceRecord, DisciplinaryAction, HealthSafetyRecord, Student, StudentBehavior,
    Term, User, UserCredentials,
};

use super::{ListQuery, Page, Result, UserCascade};

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user and password hash by username or email.
    async fn get_user_credentials(&self, identifier: &str) -> Result<Option<UserCredentials>>;

    /// Creates a new user. Username and email must be unique.
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()>;

    /// Deletes a user and every record it owns.
    ///
    /// Fails with `Referenced` while the user is still the recorder of
    /// someone else's attendance or the reporter of a behavior.
    async fn delete_user(&self, id: Uuid) -> Result<UserCascade>;
}

/// Repository for student profiles.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>>;

    async fn get_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>>;

    /// Creates the STUDENT account and its profile in one transaction.
    async fn create_student_account(
        &self,
        user: &User,
        password_hash: &str,
        student: &Student,
    ) -> Result<()>;
}

/// Repository for attendance records.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>>;

    /// Lists a user's attendance, newest first.
    async fn list_attendance(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<AttendanceRecord>>;

    /// Finds a user's record dated within `[start, end)`.
    async fn find_attendance_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>>;

    /// Creates a record. A second record on the same day is `AlreadyExists`.
    async fn create_attendance(&self, record: &AttendanceRecord) -> Result<()>;

    async fn update_attendance(&self, record: &AttendanceRecord) -> Result<()>;

    async fn delete_attendance(&self, record: &AttendanceRecord) -> Result<()>;
}

/// Repository for health-and-safety records.
#[async_trait]
pub trait HealthSafetyRepository: Send + Sync {
    async fn get_health_safety(&self, id: Uuid) -> Result<Option<HealthSafetyRecord>>;

    async fn list_health_safety(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<HealthSafetyRecord>>;

    async fn create_health_safety(&self, record: &HealthSafetyRecord) -> Result<()>;

    async fn update_health_safety(&self, record: &HealthSafetyRecord) -> Result<()>;

    async fn delete_health_safety(&self, record: &HealthSafetyRecord) -> Result<()>;
}

/// Repository for disciplinary actions.
#[async_trait]
pub trait DisciplinaryActionRepository: Send + Sync {
    async fn get_disciplinary_action(&self, id: Uuid) -> Result<Option<DisciplinaryAction>>;

    async fn list_disciplinary_actions(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<DisciplinaryAction>>;

    /// Every action raised in response to a behavior.
    async fn list_actions_by_behavior(&self, behavior_id: Uuid) -> Result<Vec<DisciplinaryAction>>;

    async fn create_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()>;

    async fn update_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()>;

    async fn delete_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()>;

    /// Deletes a batch of actions by id in one statement.
    async fn delete_disciplinary_actions(&self, actions: &[DisciplinaryAction]) -> Result<()>;
}

/// Repository for student behavior records.
#[async_trait]
pub trait StudentBehaviorRepository: Send + Sync {
    async fn get_student_behavior(&self, id: Uuid) -> Result<Option<StudentBehavior>>;

    async fn list_student_behaviors(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<StudentBehavior>>;

    async fn create_student_behavior(&self, behavior: &StudentBehavior) -> Result<()>;

    async fn update_student_behavior(&self, behavior: &StudentBehavior) -> Result<()>;

    /// Deletes the behavior row only. Fails with `Referenced` while actions
    /// still point at it.
    async fn delete_student_behavior(&self, behavior: &StudentBehavior) -> Result<()>;
}

/// Repository for academic terms.
#[async_trait]
pub trait TermRepository: Send + Sync {
    async fn get_term(&self, id: Uuid) -> Result<Option<Term>>;

    /// Lists terms ordered by start date.
    async fn list_terms(&self, query: &ListQuery) -> Result<Page<Term>>;

    async fn create_term(&self, term: &Term) -> Result<()>;

    async fn update_term(&self, term: &Term) -> Result<()>;

    async fn delete_term(&self, term: &Term) -> Result<()>;
}

/// Repository for postal addresses.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>>;

    async fn list_addresses(&self, user_id: Uuid, query: &ListQuery) -> Result<Page<Address>>;

    async fn create_address(&self, address: &Address) -> Result<()>;

    async fn update_address(&self, address: &Address) -> Result<()>;

    async fn delete_address(&self, address: &Address) -> Result<()>;
}
