//! Entity services.
//!
//! Each service validates its payload, resolves the parent records the
//! operation hangs off, and makes one call into a (cached) repository.
//! Cache invalidation happens inside the decorators, so services never
//! touch the cache directly.

mod address;
mod attendance;
mod disciplinary_action;
mod health_safety;
mod registration;
mod student_behavior;
mod term;
mod users;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use campus_core::cache::Cache;
use campus_core::clock::Clock;
use campus_core::school::{Geofence, ServiceError, ServiceResult, Student, User};
use campus_core::storage::{
    AddressRepository, AttendanceRepository, DisciplinaryActionRepository,
    HealthSafetyRepository, StudentBehaviorRepository, StudentRepository, TermRepository,
    UserRepository,
};

use crate::storage::{
    CachedAddressRepository, CachedAttendanceRepository, CachedDisciplinaryActionRepository,
    CachedHealthSafetyRepository, CachedStudentBehaviorRepository, CachedTermRepository,
    CachedUserRepository,
};

pub use address::AddressService;
pub use attendance::AttendanceService;
pub use disciplinary_action::DisciplinaryActionService;
pub use health_safety::HealthSafetyService;
pub use registration::RegistrationService;
pub use student_behavior::StudentBehaviorService;
pub use term::TermService;
pub use users::UserService;

/// Repository handles shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub health_safety: Arc<dyn HealthSafetyRepository>,
    pub disciplinary_actions: Arc<dyn DisciplinaryActionRepository>,
    pub behaviors: Arc<dyn StudentBehaviorRepository>,
    pub terms: Arc<dyn TermRepository>,
    pub addresses: Arc<dyn AddressRepository>,
}

impl Repositories {
    /// Wraps one storage backend in the cache-aside decorators.
    ///
    /// Student profiles are only read to resolve parents and go straight to
    /// storage.
    pub fn cached<R, C>(storage: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self
    where
        R: UserRepository
            + StudentRepository
            + AttendanceRepository
            + HealthSafetyRepository
            + DisciplinaryActionRepository
            + StudentBehaviorRepository
            + TermRepository
            + AddressRepository
            + 'static,
        C: Cache + 'static,
    {
        Self {
            users: Arc::new(CachedUserRepository::new(storage.clone(), cache.clone(), ttl)),
            students: storage.clone(),
            attendance: Arc::new(CachedAttendanceRepository::new(
                storage.clone(),
                cache.clone(),
                ttl,
            )),
            health_safety: Arc::new(CachedHealthSafetyRepository::new(
                storage.clone(),
                cache.clone(),
                ttl,
            )),
            disciplinary_actions: Arc::new(CachedDisciplinaryActionRepository::new(
                storage.clone(),
                cache.clone(),
                ttl,
            )),
            behaviors: Arc::new(CachedStudentBehaviorRepository::new(
                storage.clone(),
                cache.clone(),
                ttl,
            )),
            terms: Arc::new(CachedTermRepository::new(storage.clone(), cache.clone(), ttl)),
            addresses: Arc::new(CachedAddressRepository::new(storage, cache, ttl)),
        }
    }
}

/// Every entity service, built over one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub attendance: AttendanceService,
    pub health_safety: HealthSafetyService,
    pub disciplinary_actions: DisciplinaryActionService,
    pub behaviors: StudentBehaviorService,
    pub terms: TermService,
    pub addresses: AddressService,
    pub registration: RegistrationService,
    pub users: UserService,
}

impl Services {
    pub fn new(
        repos: &Repositories,
        clock: Arc<dyn Clock>,
        geofence: Geofence,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            attendance: AttendanceService::new(
                repos.users.clone(),
                repos.attendance.clone(),
                clock,
                geofence,
            ),
            health_safety: HealthSafetyService::new(
                repos.users.clone(),
                repos.health_safety.clone(),
            ),
            disciplinary_actions: DisciplinaryActionService::new(
                repos.students.clone(),
                repos.behaviors.clone(),
                repos.disciplinary_actions.clone(),
            ),
            behaviors: StudentBehaviorService::new(
                repos.students.clone(),
                repos.behaviors.clone(),
                repos.disciplinary_actions.clone(),
            ),
            terms: TermService::new(repos.terms.clone()),
            addresses: AddressService::new(repos.users.clone(), repos.addresses.clone()),
            registration: RegistrationService::new(
                repos.users.clone(),
                repos.students.clone(),
                bcrypt_cost,
            ),
            users: UserService::new(repos.users.clone()),
        }
    }
}

/// Loads a user or fails with `NotFound`.
pub(crate) async fn require_user(users: &dyn UserRepository, id: Uuid) -> ServiceResult<User> {
    users
        .get_user(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))
}

/// Loads a student profile or fails with `NotFound`.
pub(crate) async fn require_student(
    students: &dyn StudentRepository,
    id: Uuid,
) -> ServiceResult<Student> {
    students
        .get_student(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student", id))
}
