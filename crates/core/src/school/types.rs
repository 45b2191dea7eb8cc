use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when parsing an enumeration from its stored text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` over the upper-case wire names.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Returns the upper-case name used on the wire and in storage.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Student,
    Teacher,
    Parent,
    Staff,
}

text_enum!(Role, "role", {
    Admin => "ADMIN",
    Student => "STUDENT",
    Teacher => "TEACHER",
    Parent => "PARENT",
    Staff => "STAFF",
});

impl Role {
    /// Returns true for roles that must clock in from inside the geofence.
    pub fn requires_on_site(&self) -> bool {
        matches!(self, Role::Teacher | Role::Staff)
    }
}

/// A registered account. The password hash is kept out of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A user together with the stored password hash, used only for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Student profile attached to a STUDENT user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admission_number: String,
    pub grade: String,
    pub date_of_birth: NaiveDate,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn new(
        user_id: Uuid,
        admission_number: impl Into<String>,
        grade: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            admission_number: admission_number.into(),
            grade: grade.into(),
            date_of_birth,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

text_enum!(AttendanceStatus, "attendance status", {
    Present => "PRESENT",
    Absent => "ABSENT",
    Late => "LATE",
    Excused => "EXCUSED",
});

/// One clock-in for a user on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Staff member who recorded the attendance on the user's behalf.
    pub recorder_id: Option<Uuid>,
    /// Server-local wall-clock time of the clock-in.
    pub date: NaiveDateTime,
    pub status: AttendanceStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub absence_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(user_id: Uuid, date: NaiveDateTime, status: AttendanceStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            recorder_id: None,
            date,
            status,
            latitude: None,
            longitude: None,
            absence_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The calendar day this record occupies.
    pub fn attendance_day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Emergency contact and medical information for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSafetyRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relationship: Option<String>,
    pub allergies: Vec<String>,
    pub medical_conditions: Vec<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthSafetyRecord {
    pub fn new(
        user_id: Uuid,
        emergency_contact_name: impl Into<String>,
        emergency_contact_phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            emergency_contact_name: emergency_contact_name.into(),
            emergency_contact_phone: emergency_contact_phone.into(),
            emergency_contact_relationship: None,
            allergies: Vec::new(),
            medical_conditions: Vec::new(),
            medications: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisciplinaryStatus {
    Pending,
    InProgress,
    Resolved,
    Appealed,
}

text_enum!(DisciplinaryStatus, "disciplinary status", {
    Pending => "PENDING",
    InProgress => "IN_PROGRESS",
    Resolved => "RESOLVED",
    Appealed => "APPEALED",
});

/// A sanction applied to a student, optionally in response to a behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplinaryAction {
    pub id: Uuid,
    pub student_id: Uuid,
    pub behavior_id: Option<Uuid>,
    pub action: String,
    pub reason: String,
    pub status: DisciplinaryStatus,
    pub remarks: Option<String>,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DisciplinaryAction {
    pub fn new(student_id: Uuid, action: impl Into<String>, reason: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            behavior_id: None,
            action: action.into(),
            reason: reason.into(),
            status: DisciplinaryStatus::Pending,
            remarks: None,
            date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_behavior(mut self, behavior_id: Uuid) -> Self {
        self.behavior_id = Some(behavior_id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorType {
    Positive,
    Negative,
    Neutral,
}

text_enum!(BehaviorType, "behavior type", {
    Positive => "POSITIVE",
    Negative => "NEGATIVE",
    Neutral => "NEUTRAL",
});

/// An observed student behavior, reported by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBehavior {
    pub id: Uuid,
    pub student_id: Uuid,
    pub reporter_id: Uuid,
    pub behavior_date: NaiveDate,
    pub behavior_type: BehaviorType,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentBehavior {
    pub fn new(
        student_id: Uuid,
        reporter_id: Uuid,
        behavior_date: NaiveDate,
        behavior_type: BehaviorType,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            reporter_id,
            behavior_date,
            behavior_type,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An academic term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Term {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A postal address belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn new(
        user_id: Uuid,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
        assert_eq!("PARENT".parse::<Role>().unwrap(), Role::Parent);
        assert!("teacher".parse::<Role>().is_err());
    }

    #[test]
    fn test_on_site_roles() {
        assert!(Role::Teacher.requires_on_site());
        assert!(Role::Staff.requires_on_site());
        assert!(!Role::Student.requires_on_site());
        assert!(!Role::Parent.requires_on_site());
        assert!(!Role::Admin.requires_on_site());
    }

    #[test]
    fn test_disciplinary_status_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&DisciplinaryStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            "IN_PROGRESS".parse::<DisciplinaryStatus>().unwrap(),
            DisciplinaryStatus::InProgress
        );
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = "LATEISH".parse::<AttendanceStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown attendance status: LATEISH");
    }

    #[test]
    fn test_attendance_record_serializes_camel_case() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut record = AttendanceRecord::new(Uuid::nil(), date, AttendanceStatus::Absent);
        record.absence_reason = Some("flu".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["absenceReason"], "flu");
        assert_eq!(json["status"], "ABSENT");
        assert!(json["recorderId"].is_null());
        assert_eq!(record.attendance_day(), date.date());
    }
}
