//! Cache keys, value encoding and the backend trait.

mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    address_key, attendance_key, disciplinary_action_key, health_safety_key, list_key,
    list_scope_of_key, normalize_query, scope_tracking_key, student_behavior_key,
    student_behaviors_scope, student_disciplinary_actions_scope, term_key, terms_scope,
    user_address_scope, user_attendance_scope, user_health_safety_scope, user_key,
};
pub use serialization::{deserialize_value, serialize_value, SerializationError};
pub use traits::Cache;
