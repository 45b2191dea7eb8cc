//! Field-level validation for incoming payloads.
//!
//! Every failing field is collected so a client sees all problems at once.

use serde::Serialize;
use thiserror::Error;

use super::{
    Address, AttendanceRecord, AttendanceStatus, DisciplinaryAction, HealthSafetyRecord,
    StudentBehavior, Term,
};

/// Maximum length of names and other short labels.
pub const NAME_MAX: usize = 100;
/// Maximum length of free-text fields such as notes and descriptions.
pub const TEXT_MAX: usize = 1000;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 8;
const PHONE_MIN: usize = 7;
const PHONE_MAX: usize = 20;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failing fields of one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// A validation error for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Returns true if the given field failed.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates field errors while a payload is checked.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Non-blank text no longer than `max` characters.
    pub fn required_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required", field));
        } else if value.chars().count() > max {
            self.push(field, format!("{} must be at most {} characters", field, max));
        }
    }

    /// Text that may be absent, but when present is non-blank and bounded.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.required_text(field, value, max);
        }
    }

    /// Every list element must be non-blank and bounded.
    pub fn text_list(&mut self, field: &str, values: &[String], max: usize) {
        if values.iter().any(|v| v.trim().is_empty()) {
            self.push(field, format!("{} must not contain blank entries", field));
        } else if values.iter().any(|v| v.chars().count() > max) {
            self.push(
                field,
                format!("{} entries must be at most {} characters", field, max),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.push(field, format!("{} must be a valid email address", field));
        }
    }

    pub fn phone(&mut self, field: &str, value: &str) {
        if !is_phone(value) {
            self.push(field, format!("{} must be a valid phone number", field));
        }
    }

    pub fn username(&mut self, field: &str, value: &str) {
        let len = value.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            self.push(
                field,
                format!(
                    "{} must be between {} and {} characters",
                    field, USERNAME_MIN, USERNAME_MAX
                ),
            );
        } else if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.push(
                field,
                format!("{} may only contain letters, digits, '_' and '.'", field),
            );
        }
    }

    /// Password strength plus the confirmation cross-check.
    pub fn password(&mut self, password: &str, confirm: &str) {
        if password.chars().count() < PASSWORD_MIN {
            self.push(
                "password",
                format!("password must be at least {} characters", PASSWORD_MIN),
            );
        }
        if password != confirm {
            self.push("confirmPassword", "passwords do not match");
        }
    }

    /// Latitude/longitude ranges, and both-or-neither.
    pub fn coordinates(&mut self, latitude: Option<f64>, longitude: Option<f64>) {
        match (latitude, longitude) {
            (Some(_), None) => self.push("longitude", "longitude is required with latitude"),
            (None, Some(_)) => self.push("latitude", "latitude is required with longitude"),
            _ => {}
        }
        if let Some(lat) = latitude {
            if !(-90.0..=90.0).contains(&lat) {
                self.push("latitude", "latitude must be between -90 and 90");
            }
        }
        if let Some(lon) = longitude {
            if !(-180.0..=180.0).contains(&lon) {
                self.push("longitude", "longitude must be between -180 and 180");
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) || value.chars().count() > NAME_MAX * 2 {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn is_phone(value: &str) -> bool {
    let len = value.chars().count();
    (PHONE_MIN..=PHONE_MAX).contains(&len)
        && value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
}

pub fn validate_attendance(record: &AttendanceRecord) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.coordinates(record.latitude, record.longitude);
    errors.optional_text("absenceReason", record.absence_reason.as_deref(), TEXT_MAX);
    if record.status == AttendanceStatus::Absent && record.absence_reason.is_none() {
        errors.push("absenceReason", "absenceReason is required when status is ABSENT");
    }
    errors.finish()
}

pub fn validate_health_safety(record: &HealthSafetyRecord) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.required_text("emergencyContactName", &record.emergency_contact_name, NAME_MAX);
    errors.phone("emergencyContactPhone", &record.emergency_contact_phone);
    errors.optional_text(
        "emergencyContactRelationship",
        record.emergency_contact_relationship.as_deref(),
        NAME_MAX,
    );
    errors.text_list("allergies", &record.allergies, NAME_MAX);
    errors.text_list("medicalConditions", &record.medical_conditions, NAME_MAX);
    errors.optional_text("medications", record.medications.as_deref(), TEXT_MAX);
    errors.optional_text("notes", record.notes.as_deref(), TEXT_MAX);
    errors.finish()
}

pub fn validate_disciplinary_action(action: &DisciplinaryAction) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.required_text("action", &action.action, NAME_MAX);
    errors.required_text("reason", &action.reason, TEXT_MAX);
    errors.optional_text("remarks", action.remarks.as_deref(), TEXT_MAX);
    errors.finish()
}

pub fn validate_student_behavior(behavior: &StudentBehavior) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.required_text("description", &behavior.description, TEXT_MAX);
    errors.finish()
}

pub fn validate_term(term: &Term) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.required_text("name", &term.name, NAME_MAX);
    if term.start_date > term.end_date {
        errors.push("endDate", "endDate must not be before startDate");
    }
    errors.finish()
}

pub fn validate_address(address: &Address) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.required_text("street", &address.street, NAME_MAX * 2);
    errors.required_text("city", &address.city, NAME_MAX);
    errors.required_text("state", &address.state, NAME_MAX);
    errors.required_text("postalCode", &address.postal_code, 20);
    errors.required_text("country", &address.country, NAME_MAX);
    errors.finish()
}
