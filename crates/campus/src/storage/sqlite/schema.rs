//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Each list query and its count share one `WHERE`
//! fragment so the page and the total always agree.

/// SQL statement to enable foreign keys and create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    admission_number TEXT NOT NULL UNIQUE,
    grade TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    parent_id TEXT REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Recorder references are restricted: a user who recorded someone else's
-- attendance cannot be deleted.
CREATE TABLE IF NOT EXISTS attendance (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    recorder_id TEXT REFERENCES users(id),
    date TEXT NOT NULL,
    attendance_day TEXT NOT NULL,
    status TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    absence_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, attendance_day)
);

CREATE TABLE IF NOT EXISTS health_safety (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    emergency_contact_name TEXT NOT NULL,
    emergency_contact_phone TEXT NOT NULL,
    emergency_contact_relationship TEXT,
    allergies TEXT NOT NULL,
    medical_conditions TEXT NOT NULL,
    medications TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS student_behaviors (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    reporter_id TEXT NOT NULL REFERENCES users(id),
    behavior_date TEXT NOT NULL,
    behavior_type TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS disciplinary_actions (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    behavior_id TEXT REFERENCES student_behaviors(id),
    action TEXT NOT NULL,
    reason TEXT NOT NULL,
    status TEXT NOT NULL,
    remarks TEXT,
    date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS terms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS addresses (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    country TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_attendance_user_date ON attendance(user_id, date);
CREATE INDEX IF NOT EXISTS idx_attendance_recorder ON attendance(recorder_id);
CREATE INDEX IF NOT EXISTS idx_health_safety_user ON health_safety(user_id);
CREATE INDEX IF NOT EXISTS idx_behaviors_student ON student_behaviors(student_id);
CREATE INDEX IF NOT EXISTS idx_behaviors_reporter ON student_behaviors(reporter_id);
CREATE INDEX IF NOT EXISTS idx_actions_student ON disciplinary_actions(student_id);
CREATE INDEX IF NOT EXISTS idx_actions_behavior ON disciplinary_actions(behavior_id);
CREATE INDEX IF NOT EXISTS idx_addresses_user ON addresses(user_id);
CREATE INDEX IF NOT EXISTS idx_students_parent ON students(parent_id);
"#;

/// Name of the Unicode-aware lowercase function registered on every connection.
///
/// SQLite's builtin `lower()` only folds ASCII, so accented names would miss
/// searches typed in a different case.
pub const LOWER_FN: &str = "unicode_lower";

/// Case-insensitive substring test against the optional search parameter.
macro_rules! search_column {
    ($col:literal, $param:literal) => {
        concat!(
            "instr(unicode_lower(coalesce(", $col, ", '')), unicode_lower(", $param, ")) > 0"
        )
    };
}

macro_rules! user_columns {
    () => {
        "id, username, email, first_name, last_name, role, created_at, updated_at"
    };
}

macro_rules! student_columns {
    () => {
        "id, user_id, admission_number, grade, date_of_birth, parent_id, created_at, updated_at"
    };
}

macro_rules! attendance_columns {
    () => {
        "id, user_id, recorder_id, date, status, latitude, longitude, absence_reason, created_at, updated_at"
    };
}

macro_rules! health_safety_columns {
    () => {
        "id, user_id, emergency_contact_name, emergency_contact_phone, emergency_contact_relationship, \
         allergies, medical_conditions, medications, notes, created_at, updated_at"
    };
}

macro_rules! action_columns {
    () => {
        "id, student_id, behavior_id, action, reason, status, remarks, date, created_at, updated_at"
    };
}

macro_rules! behavior_columns {
    () => {
        "id, student_id, reporter_id, behavior_date, behavior_type, description, created_at, updated_at"
    };
}

macro_rules! term_columns {
    () => {
        "id, name, start_date, end_date, created_at, updated_at"
    };
}

macro_rules! address_columns {
    () => {
        "id, user_id, street, city, state, postal_code, country, created_at, updated_at"
    };
}

// Shared list predicates: ?1 owner id (where owned), then the search needle.

macro_rules! attendance_filter {
    () => {
        concat!(
            "WHERE user_id = ?1 AND (?2 IS NULL OR ",
            search_column!("status", "?2"),
            " OR ",
            search_column!("absence_reason", "?2"),
            ")"
        )
    };
}

macro_rules! health_safety_filter {
    () => {
        concat!(
            "WHERE user_id = ?1 AND (?2 IS NULL OR ",
            search_column!("emergency_contact_name", "?2"),
            " OR ",
            search_column!("allergies", "?2"),
            " OR ",
            search_column!("medical_conditions", "?2"),
            " OR ",
            search_column!("notes", "?2"),
            ")"
        )
    };
}

macro_rules! action_filter {
    () => {
        concat!(
            "WHERE student_id = ?1 AND (?2 IS NULL OR ",
            search_column!("action", "?2"),
            " OR ",
            search_column!("reason", "?2"),
            " OR ",
            search_column!("status", "?2"),
            " OR ",
            search_column!("remarks", "?2"),
            ")"
        )
    };
}

macro_rules! behavior_filter {
    () => {
        concat!(
            "WHERE student_id = ?1 AND (?2 IS NULL OR ",
            search_column!("behavior_type", "?2"),
            " OR ",
            search_column!("description", "?2"),
            ")"
        )
    };
}

macro_rules! term_filter {
    () => {
        concat!("WHERE (?1 IS NULL OR ", search_column!("name", "?1"), ")")
    };
}

macro_rules! address_filter {
    () => {
        concat!(
            "WHERE user_id = ?1 AND (?2 IS NULL OR ",
            search_column!("street", "?2"),
            " OR ",
            search_column!("city", "?2"),
            " OR ",
            search_column!("state", "?2"),
            " OR ",
            search_column!("country", "?2"),
            ")"
        )
    };
}

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_USER_BY_ID: &str = concat!("SELECT ", user_columns!(), " FROM users WHERE id = ?1");

pub const SELECT_CREDENTIALS_BY_IDENTIFIER: &str = concat!(
    "SELECT ",
    user_columns!(),
    ", password_hash FROM users WHERE username = ?1 OR email = ?1 COLLATE NOCASE"
);

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?1";

// Student queries
pub const INSERT_STUDENT: &str = r#"
INSERT INTO students (id, user_id, admission_number, grade, date_of_birth, parent_id, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub const SELECT_STUDENT_BY_ID: &str =
    concat!("SELECT ", student_columns!(), " FROM students WHERE id = ?1");

pub const SELECT_STUDENT_BY_USER: &str =
    concat!("SELECT ", student_columns!(), " FROM students WHERE user_id = ?1");

// Ids removed along with a user
pub const SELECT_ATTENDANCE_IDS_BY_USER: &str = "SELECT id FROM attendance WHERE user_id = ?1";
pub const SELECT_HEALTH_SAFETY_IDS_BY_USER: &str =
    "SELECT id FROM health_safety WHERE user_id = ?1";
pub const SELECT_ADDRESS_IDS_BY_USER: &str = "SELECT id FROM addresses WHERE user_id = ?1";
pub const SELECT_BEHAVIOR_IDS_BY_STUDENT: &str =
    "SELECT id FROM student_behaviors WHERE student_id = ?1";
pub const SELECT_ACTION_IDS_BY_STUDENT: &str =
    "SELECT id FROM disciplinary_actions WHERE student_id = ?1";

// Attendance queries
pub const INSERT_ATTENDANCE: &str = r#"
INSERT INTO attendance (id, user_id, recorder_id, date, attendance_day, status, latitude, longitude, absence_reason, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub const SELECT_ATTENDANCE_BY_ID: &str =
    concat!("SELECT ", attendance_columns!(), " FROM attendance WHERE id = ?1");

pub const SELECT_ATTENDANCE_PAGE: &str = concat!(
    "SELECT ",
    attendance_columns!(),
    " FROM attendance ",
    attendance_filter!(),
    " ORDER BY date DESC, id LIMIT ?3 OFFSET ?4"
);

pub const COUNT_ATTENDANCE: &str =
    concat!("SELECT COUNT(*) FROM attendance ", attendance_filter!());

pub const SELECT_ATTENDANCE_IN_WINDOW: &str = concat!(
    "SELECT ",
    attendance_columns!(),
    " FROM attendance WHERE user_id = ?1 AND date >= ?2 AND date < ?3 LIMIT 1"
);

pub const UPDATE_ATTENDANCE: &str = r#"
UPDATE attendance
SET status = ?2, latitude = ?3, longitude = ?4, absence_reason = ?5, updated_at = ?6
WHERE id = ?1
"#;

pub const DELETE_ATTENDANCE: &str = "DELETE FROM attendance WHERE id = ?1";

// Health-and-safety queries
pub const INSERT_HEALTH_SAFETY: &str = r#"
INSERT INTO health_safety (id, user_id, emergency_contact_name, emergency_contact_phone, emergency_contact_relationship, allergies, medical_conditions, medications, notes, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub const SELECT_HEALTH_SAFETY_BY_ID: &str =
    concat!("SELECT ", health_safety_columns!(), " FROM health_safety WHERE id = ?1");

pub const SELECT_HEALTH_SAFETY_PAGE: &str = concat!(
    "SELECT ",
    health_safety_columns!(),
    " FROM health_safety ",
    health_safety_filter!(),
    " ORDER BY created_at DESC, id LIMIT ?3 OFFSET ?4"
);

pub const COUNT_HEALTH_SAFETY: &str =
    concat!("SELECT COUNT(*) FROM health_safety ", health_safety_filter!());

pub const UPDATE_HEALTH_SAFETY: &str = r#"
UPDATE health_safety
SET emergency_contact_name = ?2, emergency_contact_phone = ?3, emergency_contact_relationship = ?4,
    allergies = ?5, medical_conditions = ?6, medications = ?7, notes = ?8, updated_at = ?9
WHERE id = ?1
"#;

pub const DELETE_HEALTH_SAFETY: &str = "DELETE FROM health_safety WHERE id = ?1";

// Disciplinary action queries
pub const INSERT_ACTION: &str = r#"
INSERT INTO disciplinary_actions (id, student_id, behavior_id, action, reason, status, remarks, date, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#;

pub const SELECT_ACTION_BY_ID: &str =
    concat!("SELECT ", action_columns!(), " FROM disciplinary_actions WHERE id = ?1");

pub const SELECT_ACTIONS_BY_BEHAVIOR: &str = concat!(
    "SELECT ",
    action_columns!(),
    " FROM disciplinary_actions WHERE behavior_id = ?1"
);

pub const SELECT_ACTION_PAGE: &str = concat!(
    "SELECT ",
    action_columns!(),
    " FROM disciplinary_actions ",
    action_filter!(),
    " ORDER BY created_at DESC, id LIMIT ?3 OFFSET ?4"
);

pub const COUNT_ACTIONS: &str =
    concat!("SELECT COUNT(*) FROM disciplinary_actions ", action_filter!());

pub const UPDATE_ACTION: &str = r#"
UPDATE disciplinary_actions
SET action = ?2, reason = ?3, status = ?4, remarks = ?5, date = ?6, updated_at = ?7
WHERE id = ?1
"#;

pub const DELETE_ACTION: &str = "DELETE FROM disciplinary_actions WHERE id = ?1";

// Student behavior queries
pub const INSERT_BEHAVIOR: &str = r#"
INSERT INTO student_behaviors (id, student_id, reporter_id, behavior_date, behavior_type, description, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub const SELECT_BEHAVIOR_BY_ID: &str =
    concat!("SELECT ", behavior_columns!(), " FROM student_behaviors WHERE id = ?1");

pub const SELECT_BEHAVIOR_PAGE: &str = concat!(
    "SELECT ",
    behavior_columns!(),
    " FROM student_behaviors ",
    behavior_filter!(),
    " ORDER BY behavior_date DESC, created_at DESC, id LIMIT ?3 OFFSET ?4"
);

pub const COUNT_BEHAVIORS: &str =
    concat!("SELECT COUNT(*) FROM student_behaviors ", behavior_filter!());

pub const UPDATE_BEHAVIOR: &str = r#"
UPDATE student_behaviors
SET behavior_date = ?2, behavior_type = ?3, description = ?4, updated_at = ?5
WHERE id = ?1
"#;

pub const DELETE_BEHAVIOR: &str = "DELETE FROM student_behaviors WHERE id = ?1";

// Term queries
pub const INSERT_TERM: &str = r#"
INSERT INTO terms (id, name, start_date, end_date, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_TERM_BY_ID: &str = concat!("SELECT ", term_columns!(), " FROM terms WHERE id = ?1");

pub const SELECT_TERM_PAGE: &str = concat!(
    "SELECT ",
    term_columns!(),
    " FROM terms ",
    term_filter!(),
    " ORDER BY start_date, id LIMIT ?2 OFFSET ?3"
);

pub const COUNT_TERMS: &str = concat!("SELECT COUNT(*) FROM terms ", term_filter!());

pub const UPDATE_TERM: &str = r#"
UPDATE terms
SET name = ?2, start_date = ?3, end_date = ?4, updated_at = ?5
WHERE id = ?1
"#;

pub const DELETE_TERM: &str = "DELETE FROM terms WHERE id = ?1";

// Address queries
pub const INSERT_ADDRESS: &str = r#"
INSERT INTO addresses (id, user_id, street, city, state, postal_code, country, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_ADDRESS_BY_ID: &str =
    concat!("SELECT ", address_columns!(), " FROM addresses WHERE id = ?1");

pub const SELECT_ADDRESS_PAGE: &str = concat!(
    "SELECT ",
    address_columns!(),
    " FROM addresses ",
    address_filter!(),
    " ORDER BY created_at DESC, id LIMIT ?3 OFFSET ?4"
);

pub const COUNT_ADDRESSES: &str = concat!("SELECT COUNT(*) FROM addresses ", address_filter!());

pub const UPDATE_ADDRESS: &str = r#"
UPDATE addresses
SET street = ?2, city = ?3, state = ?4, postal_code = ?5, country = ?6, updated_at = ?7
WHERE id = ?1
"#;

pub const DELETE_ADDRESS: &str = "DELETE FROM addresses WHERE id = ?1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_enables_foreign_keys() {
        assert!(CREATE_TABLES.starts_with("\nPRAGMA foreign_keys = ON;"));
        assert!(CREATE_TABLES.contains("UNIQUE (user_id, attendance_day)"));
    }

    #[test]
    fn test_page_and_count_share_the_predicate() {
        let pairs = [
            (SELECT_ATTENDANCE_PAGE, COUNT_ATTENDANCE),
            (SELECT_HEALTH_SAFETY_PAGE, COUNT_HEALTH_SAFETY),
            (SELECT_ACTION_PAGE, COUNT_ACTIONS),
            (SELECT_BEHAVIOR_PAGE, COUNT_BEHAVIORS),
            (SELECT_TERM_PAGE, COUNT_TERMS),
            (SELECT_ADDRESS_PAGE, COUNT_ADDRESSES),
        ];

        for (page, count) in pairs {
            let page_where = &page[page.find("WHERE").unwrap()..page.find(" ORDER BY").unwrap()];
            let count_where = &count[count.find("WHERE").unwrap()..];
            assert_eq!(page_where, count_where);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        assert!(COUNT_TERMS
            .contains("instr(unicode_lower(coalesce(name, '')), unicode_lower(?1)) > 0"));
        assert!(COUNT_TERMS.contains(LOWER_FN));
    }
}
