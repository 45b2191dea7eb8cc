//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use campus_core::school::{
    Address, AttendanceRecord, DisciplinaryAction, HealthSafetyRecord, Student, StudentBehavior,
    Term, User, UserCredentials,
};
use campus_core::storage::RepositoryError;

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// ============================================================================
// User conversions
// ============================================================================

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, email, first_name, last_name, role, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: parse_text(row, 5)?,
        created_at: parse_datetime(row, 6)?,
        updated_at: parse_datetime(row, 7)?,
    })
}

/// Convert a row to a user plus password hash (column 8).
pub fn row_to_credentials(row: &Row) -> rusqlite::Result<UserCredentials> {
    Ok(UserCredentials {
        user: row_to_user(row)?,
        password_hash: row.get(8)?,
    })
}

/// Expected columns: id, user_id, admission_number, grade, date_of_birth, parent_id, created_at, updated_at
pub fn row_to_student(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: parse_uuid(row, 0)?,
        user_id: parse_uuid(row, 1)?,
        admission_number: row.get(2)?,
        grade: row.get(3)?,
        date_of_birth: parse_date(row, 4)?,
        parent_id: parse_optional_uuid(row, 5)?,
        created_at: parse_datetime(row, 6)?,
        updated_at: parse_datetime(row, 7)?,
    })
}

// ============================================================================
// Record conversions
// ============================================================================

/// Expected columns: id, user_id, recorder_id, date, status, latitude, longitude, absence_reason, created_at, updated_at
pub fn row_to_attendance(row: &Row) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: parse_uuid(row, 0)?,
        user_id: parse_uuid(row, 1)?,
        recorder_id: parse_optional_uuid(row, 2)?,
        date: parse_local_datetime(row, 3)?,
        status: parse_text(row, 4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        absence_reason: row.get(7)?,
        created_at: parse_datetime(row, 8)?,
        updated_at: parse_datetime(row, 9)?,
    })
}

/// Expected columns: id, user_id, emergency_contact_name, emergency_contact_phone,
/// emergency_contact_relationship, allergies, medical_conditions, medications, notes,
/// created_at, updated_at
pub fn row_to_health_safety(row: &Row) -> rusqlite::Result<HealthSafetyRecord> {
    Ok(HealthSafetyRecord {
        id: parse_uuid(row, 0)?,
        user_id: parse_uuid(row, 1)?,
        emergency_contact_name: row.get(2)?,
        emergency_contact_phone: row.get(3)?,
        emergency_contact_relationship: row.get(4)?,
        allergies: parse_list(row, 5)?,
        medical_conditions: parse_list(row, 6)?,
        medications: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_datetime(row, 9)?,
        updated_at: parse_datetime(row, 10)?,
    })
}

/// Expected columns: id, student_id, behavior_id, action, reason, status, remarks, date, created_at, updated_at
pub fn row_to_disciplinary_action(row: &Row) -> rusqlite::Result<DisciplinaryAction> {
    let date: Option<String> = row.get(7)?;
    Ok(DisciplinaryAction {
        id: parse_uuid(row, 0)?,
        student_id: parse_uuid(row, 1)?,
        behavior_id: parse_optional_uuid(row, 2)?,
        action: row.get(3)?,
        reason: row.get(4)?,
        status: parse_text(row, 5)?,
        remarks: row.get(6)?,
        date: date
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| conversion_error(7, e)))
            .transpose()?,
        created_at: parse_datetime(row, 8)?,
        updated_at: parse_datetime(row, 9)?,
    })
}

/// Expected columns: id, student_id, reporter_id, behavior_date, behavior_type, description, created_at, updated_at
pub fn row_to_student_behavior(row: &Row) -> rusqlite::Result<StudentBehavior> {
    Ok(StudentBehavior {
        id: parse_uuid(row, 0)?,
        student_id: parse_uuid(row, 1)?,
        reporter_id: parse_uuid(row, 2)?,
        behavior_date: parse_date(row, 3)?,
        behavior_type: parse_text(row, 4)?,
        description: row.get(5)?,
        created_at: parse_datetime(row, 6)?,
        updated_at: parse_datetime(row, 7)?,
    })
}

/// Expected columns: id, name, start_date, end_date, created_at, updated_at
pub fn row_to_term(row: &Row) -> rusqlite::Result<Term> {
    Ok(Term {
        id: parse_uuid(row, 0)?,
        name: row.get(1)?,
        start_date: parse_date(row, 2)?,
        end_date: parse_date(row, 3)?,
        created_at: parse_datetime(row, 4)?,
        updated_at: parse_datetime(row, 5)?,
    })
}

/// Expected columns: id, user_id, street, city, state, postal_code, country, created_at, updated_at
pub fn row_to_address(row: &Row) -> rusqlite::Result<Address> {
    Ok(Address {
        id: parse_uuid(row, 0)?,
        user_id: parse_uuid(row, 1)?,
        street: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        postal_code: row.get(5)?,
        country: row.get(6)?,
        created_at: parse_datetime(row, 7)?,
        updated_at: parse_datetime(row, 8)?,
    })
}

/// Reads a single id column.
pub fn row_to_id(row: &Row) -> rusqlite::Result<Uuid> {
    parse_uuid(row, 0)
}

/// Serialize a string list column to JSON text.
pub fn list_to_json(items: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(items).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

// ============================================================================
// Helper functions
// ============================================================================

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_uuid(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

fn parse_optional_uuid(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn parse_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

fn parse_local_datetime(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, LOCAL_DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_datetime(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Parses an enum stored as its wire name.
fn parse_text<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion_error(idx, e))
}

fn parse_list(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_error(idx, e))
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Format a local wall-clock time so that text order matches time order.
pub fn format_local_datetime(dt: &NaiveDateTime) -> String {
    dt.format(LOCAL_DATETIME_FORMAT).to_string()
}

/// Format a NaiveDate for SQLite storage (YYYY-MM-DD).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
