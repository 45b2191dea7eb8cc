//! Request payloads accepted by the HTTP layer.
//!
//! Create payloads become records via `into_*`; update payloads are partial
//! and merge into an existing record via `apply_to`. The merged record is
//! validated as a whole.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::validation::{FieldErrors, ValidationError, NAME_MAX};
use super::{
    Address, AttendanceRecord, AttendanceStatus, BehaviorType, DisciplinaryAction,
    DisciplinaryStatus, HealthSafetyRecord, Role, Student, StudentBehavior, Term, User,
};
use crate::serde::deserialize_optional_string;

/// Account fields shared by every registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        self.check(&mut errors);
        errors.finish()
    }

    fn check(&self, errors: &mut FieldErrors) {
        errors.username("username", &self.username);
        errors.email("email", &self.email);
        errors.password(&self.password, &self.confirm_password);
        errors.required_text("firstName", &self.first_name, NAME_MAX);
        errors.required_text("lastName", &self.last_name, NAME_MAX);
    }

    /// Builds the user record. Username and email are trimmed, email is lower-cased.
    pub fn to_user(&self) -> User {
        User::new(
            self.username.trim(),
            self.email.trim().to_lowercase(),
            self.first_name.trim(),
            self.last_name.trim(),
            self.role,
        )
    }
}

/// Registers a STUDENT account together with its student profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub admission_number: String,
    pub grade: String,
    pub date_of_birth: NaiveDate,
    pub parent_id: Option<Uuid>,
}

impl RegisterStudentRequest {
    /// The account part of the registration, with the role fixed to STUDENT.
    pub fn account(&self) -> RegisterUserRequest {
        RegisterUserRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: Role::Student,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        self.account().check(&mut errors);
        errors.required_text("admissionNumber", &self.admission_number, 30);
        errors.required_text("grade", &self.grade, 30);
        if self.date_of_birth > Utc::now().date_naive() {
            errors.push("dateOfBirth", "dateOfBirth must not be in the future");
        }
        errors.finish()
    }

    pub fn to_student(&self, user_id: Uuid) -> Student {
        let student = Student::new(
            user_id,
            self.admission_number.trim(),
            self.grade.trim(),
            self.date_of_birth,
        );
        match self.parent_id {
            Some(parent_id) => student.with_parent(parent_id),
            None => student,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttendanceRequest {
    pub status: AttendanceStatus,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub absence_reason: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreateAttendanceRequest {
    pub fn into_record(
        self,
        user_id: Uuid,
        recorder_id: Option<Uuid>,
        date: NaiveDateTime,
    ) -> AttendanceRecord {
        let mut record = AttendanceRecord::new(user_id, date, self.status);
        record.recorder_id = recorder_id;
        record.absence_reason = self.absence_reason;
        record.latitude = self.latitude;
        record.longitude = self.longitude;
        record
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub absence_reason: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UpdateAttendanceRequest {
    pub fn apply_to(self, record: &mut AttendanceRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if self.absence_reason.is_some() {
            record.absence_reason = self.absence_reason;
        }
        if self.latitude.is_some() {
            record.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            record.longitude = self.longitude;
        }
        record.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHealthSafetyRequest {
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub emergency_contact_relationship: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub medications: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl CreateHealthSafetyRequest {
    pub fn into_record(self, user_id: Uuid) -> HealthSafetyRecord {
        let mut record = HealthSafetyRecord::new(
            user_id,
            self.emergency_contact_name,
            self.emergency_contact_phone,
        );
        record.emergency_contact_relationship = self.emergency_contact_relationship;
        record.allergies = self.allergies;
        record.medical_conditions = self.medical_conditions;
        record.medications = self.medications;
        record.notes = self.notes;
        record
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHealthSafetyRequest {
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub emergency_contact_relationship: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub medications: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl UpdateHealthSafetyRequest {
    pub fn apply_to(self, record: &mut HealthSafetyRecord) {
        if let Some(name) = self.emergency_contact_name {
            record.emergency_contact_name = name;
        }
        if let Some(phone) = self.emergency_contact_phone {
            record.emergency_contact_phone = phone;
        }
        if self.emergency_contact_relationship.is_some() {
            record.emergency_contact_relationship = self.emergency_contact_relationship;
        }
        if let Some(allergies) = self.allergies {
            record.allergies = allergies;
        }
        if let Some(conditions) = self.medical_conditions {
            record.medical_conditions = conditions;
        }
        if self.medications.is_some() {
            record.medications = self.medications;
        }
        if self.notes.is_some() {
            record.notes = self.notes;
        }
        record.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisciplinaryActionRequest {
    pub action: String,
    pub reason: String,
    #[serde(default)]
    pub status: Option<DisciplinaryStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub remarks: Option<String>,
    pub date: Option<NaiveDate>,
    /// Behavior this action responds to. Must belong to the same student.
    pub behavior_id: Option<Uuid>,
}

impl CreateDisciplinaryActionRequest {
    pub fn into_action(self, student_id: Uuid) -> DisciplinaryAction {
        let mut action = DisciplinaryAction::new(student_id, self.action, self.reason);
        action.behavior_id = self.behavior_id;
        if let Some(status) = self.status {
            action.status = status;
        }
        action.remarks = self.remarks;
        action.date = self.date;
        action
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDisciplinaryActionRequest {
    pub action: Option<String>,
    pub reason: Option<String>,
    pub status: Option<DisciplinaryStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub remarks: Option<String>,
    pub date: Option<NaiveDate>,
}

impl UpdateDisciplinaryActionRequest {
    pub fn apply_to(self, action: &mut DisciplinaryAction) {
        if let Some(text) = self.action {
            action.action = text;
        }
        if let Some(reason) = self.reason {
            action.reason = reason;
        }
        if let Some(status) = self.status {
            action.status = status;
        }
        if self.remarks.is_some() {
            action.remarks = self.remarks;
        }
        if self.date.is_some() {
            action.date = self.date;
        }
        action.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentBehaviorRequest {
    pub behavior_date: NaiveDate,
    pub behavior_type: BehaviorType,
    pub description: String,
}

impl CreateStudentBehaviorRequest {
    pub fn into_behavior(self, student_id: Uuid, reporter_id: Uuid) -> StudentBehavior {
        StudentBehavior::new(
            student_id,
            reporter_id,
            self.behavior_date,
            self.behavior_type,
            self.description,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentBehaviorRequest {
    pub behavior_date: Option<NaiveDate>,
    pub behavior_type: Option<BehaviorType>,
    pub description: Option<String>,
}

impl UpdateStudentBehaviorRequest {
    pub fn apply_to(self, behavior: &mut StudentBehavior) {
        if let Some(date) = self.behavior_date {
            behavior.behavior_date = date;
        }
        if let Some(kind) = self.behavior_type {
            behavior.behavior_type = kind;
        }
        if let Some(description) = self.description {
            behavior.description = description;
        }
        behavior.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTermRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreateTermRequest {
    pub fn into_term(self) -> Term {
        Term::new(self.name, self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTermRequest {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateTermRequest {
    pub fn apply_to(self, term: &mut Term) {
        if let Some(name) = self.name {
            term.name = name;
        }
        if let Some(start) = self.start_date {
            term.start_date = start;
        }
        if let Some(end) = self.end_date {
            term.end_date = end;
        }
        term.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl CreateAddressRequest {
    pub fn into_address(self, user_id: Uuid) -> Address {
        Address::new(
            user_id,
            self.street,
            self.city,
            self.state,
            self.postal_code,
            self.country,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl UpdateAddressRequest {
    pub fn apply_to(self, address: &mut Address) {
        if let Some(street) = self.street {
            address.street = street;
        }
        if let Some(city) = self.city {
            address.city = city;
        }
        if let Some(state) = self.state {
            address.state = state;
        }
        if let Some(postal_code) = self.postal_code {
            address.postal_code = postal_code;
        }
        if let Some(country) = self.country {
            address.country = country;
        }
        address.updated_at = Utc::now();
    }
}
