mod error;
mod geofence;
mod operations;
mod requests;
mod types;
mod validation;

pub use error::{service_error_to_status_code, ServiceError, ServiceResult};
pub use geofence::{
    haversine_distance, GeoPoint, Geofence, DEFAULT_RADIUS_METERS, EARTH_RADIUS_METERS,
};
pub use operations::{contains_ignore_case, day_window, Searchable};
pub use requests::{
    CreateAddressRequest, CreateAttendanceRequest, CreateDisciplinaryActionRequest,
    CreateHealthSafetyRequest, CreateStudentBehaviorRequest, CreateTermRequest,
    RegisterStudentRequest, RegisterUserRequest, UpdateAddressRequest, UpdateAttendanceRequest,
    UpdateDisciplinaryActionRequest, UpdateHealthSafetyRequest, UpdateStudentBehaviorRequest,
    UpdateTermRequest,
};
pub use types::{
    Address, AttendanceRecord, AttendanceStatus, BehaviorType, DisciplinaryAction,
    DisciplinaryStatus, HealthSafetyRecord, Role, Student, StudentBehavior, Term, UnknownVariant,
    User, UserCredentials,
};
pub use validation::{
    validate_address, validate_attendance, validate_disciplinary_action, validate_health_safety,
    validate_student_behavior, validate_term, FieldError, FieldErrors, ValidationError, NAME_MAX,
    TEXT_MAX,
};
