//! SQLite repository implementation.
//!
//! Implements the repository traits from `campus_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use campus_core::school::{
    Address, AttendanceRecord, DisciplinaryAction, HealthSafetyRecord, Student, StudentBehavior,
    Term, User, UserCredentials,
};
use campus_core::storage::{
    AddressRepository, AttendanceRepository, DisciplinaryActionRepository,
    HealthSafetyRepository, ListQuery, Page, RepositoryError, Result, StudentBehaviorRepository,
    StudentRepository, TermRepository, UserCascade, UserRepository,
};

use super::conversions::{
    format_date, format_datetime, format_local_datetime, list_to_json, row_to_address,
    row_to_attendance, row_to_credentials, row_to_disciplinary_action, row_to_health_safety,
    row_to_id, row_to_student, row_to_student_behavior, row_to_term, row_to_user,
};
use super::error::{map_error, Op};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
/// Installs the scalar functions the search predicates rely on.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        schema::LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Treats "no row changed" as not found.
fn expect_changed(rows: usize) -> rusqlite::Result<()> {
    if rows == 0 {
        Err(rusqlite::Error::QueryReturnedNoRows)
    } else {
        Ok(())
    }
}

fn collect<T>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[&dyn ToSql],
    map: fn(&Row) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    let items = rows.collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(items)
}

/// Runs a count and a page query over the same filter parameters.
///
/// `LIMIT -1` is SQLite for "no limit" and serves fetch-all queries.
fn load_page<T>(
    conn: &rusqlite::Connection,
    page_sql: &str,
    count_sql: &str,
    filter: &[&dyn ToSql],
    query: &ListQuery,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> rusqlite::Result<Page<T>> {
    let total: i64 = conn.query_row(count_sql, filter, |row| row.get(0))?;

    let (limit, offset): (i64, i64) = if query.fetch_all {
        (-1, 0)
    } else {
        (
            i64::from(query.limit),
            i64::try_from(query.offset()).unwrap_or(i64::MAX),
        )
    };

    let mut params: Vec<&dyn ToSql> = filter.to_vec();
    params.push(&limit);
    params.push(&offset);

    Ok(Page {
        items: collect(conn, page_sql, &params, map)?,
        total: u64::try_from(total).unwrap_or(0),
    })
}

fn get_by_id<T>(
    conn: &rusqlite::Connection,
    sql: &str,
    id: &str,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
    conn.query_row(sql, [id], map).optional()
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Registers the search functions and initializes the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            register_functions(conn).map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Runs a closure on the connection and maps its error.
    async fn run<T, F>(&self, entity_type: &'static str, id: String, op: Op, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| f(conn).map_err(wrap_err))
            .await
            .map_err(|e| map_error(e, entity_type, id, op))
    }
}

fn insert_user(conn: &rusqlite::Connection, user: &User, password_hash: &str) -> rusqlite::Result<()> {
    conn.execute(
        schema::INSERT_USER,
        params![
            user.id.to_string(),
            user.username,
            user.email,
            password_hash,
            user.first_name,
            user.last_name,
            user.role.as_str(),
            format_datetime(&user.created_at),
            format_datetime(&user.updated_at),
        ],
    )?;
    Ok(())
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();
        self.run("User", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_USER_BY_ID, &id_str, row_to_user)
        })
        .await
    }

    async fn get_user_credentials(&self, identifier: &str) -> Result<Option<UserCredentials>> {
        let identifier = identifier.to_string();
        self.run("User", identifier.clone(), Op::Write, move |conn| {
            conn.query_row(
                schema::SELECT_CREDENTIALS_BY_IDENTIFIER,
                [&identifier],
                row_to_credentials,
            )
            .optional()
        })
        .await
    }

    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let user = user.clone();
        let password_hash = password_hash.to_string();
        self.run("User", user.username.clone(), Op::Write, move |conn| {
            insert_user(conn, &user, &password_hash)
        })
        .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<UserCascade> {
        let id_str = id.to_string();
        self.run("User", id.to_string(), Op::Delete, move |conn| {
            let tx = conn.transaction()?;

            if get_by_id(&tx, schema::SELECT_USER_BY_ID, &id_str, row_to_user)?.is_none() {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            let student = get_by_id(&tx, schema::SELECT_STUDENT_BY_USER, &id_str, row_to_student)?;

            let mut cascade = UserCascade {
                user_id: id,
                student_id: student.as_ref().map(|s| s.id),
                attendance: collect(&tx, schema::SELECT_ATTENDANCE_IDS_BY_USER, &[&id_str], row_to_id)?,
                health_safety: collect(&tx, schema::SELECT_HEALTH_SAFETY_IDS_BY_USER, &[&id_str], row_to_id)?,
                addresses: collect(&tx, schema::SELECT_ADDRESS_IDS_BY_USER, &[&id_str], row_to_id)?,
                ..UserCascade::default()
            };
            if let Some(student) = student {
                let student_id = student.id.to_string();
                cascade.behaviors =
                    collect(&tx, schema::SELECT_BEHAVIOR_IDS_BY_STUDENT, &[&student_id], row_to_id)?;
                cascade.disciplinary_actions =
                    collect(&tx, schema::SELECT_ACTION_IDS_BY_STUDENT, &[&student_id], row_to_id)?;
            }

            tx.execute(schema::DELETE_USER, [&id_str])?;
            tx.commit()?;
            Ok(cascade)
        })
        .await
    }
}

// ============================================================================
// StudentRepository implementation
// ============================================================================

#[async_trait]
impl StudentRepository for SqliteRepository {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        let id_str = id.to_string();
        self.run("Student", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_STUDENT_BY_ID, &id_str, row_to_student)
        })
        .await
    }

    async fn get_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>> {
        let id_str = user_id.to_string();
        self.run("Student", user_id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_STUDENT_BY_USER, &id_str, row_to_student)
        })
        .await
    }

    async fn create_student_account(
        &self,
        user: &User,
        password_hash: &str,
        student: &Student,
    ) -> Result<()> {
        let user = user.clone();
        let password_hash = password_hash.to_string();
        let student = student.clone();
        self.run("User", user.username.clone(), Op::Write, move |conn| {
            let tx = conn.transaction()?;
            insert_user(&tx, &user, &password_hash)?;
            tx.execute(
                schema::INSERT_STUDENT,
                params![
                    student.id.to_string(),
                    student.user_id.to_string(),
                    student.admission_number,
                    student.grade,
                    format_date(&student.date_of_birth),
                    student.parent_id.map(|id| id.to_string()),
                    format_datetime(&student.created_at),
                    format_datetime(&student.updated_at),
                ],
            )?;
            tx.commit()
        })
        .await
    }
}

// ============================================================================
// AttendanceRepository implementation
// ============================================================================

#[async_trait]
impl AttendanceRepository for SqliteRepository {
    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
        let id_str = id.to_string();
        self.run("AttendanceRecord", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_ATTENDANCE_BY_ID, &id_str, row_to_attendance)
        })
        .await
    }

    async fn list_attendance(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<AttendanceRecord>> {
        let owner = user_id.to_string();
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("AttendanceRecord", owner.clone(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_ATTENDANCE_PAGE,
                schema::COUNT_ATTENDANCE,
                &[&owner, &needle],
                &query,
                row_to_attendance,
            )
        })
        .await
    }

    async fn find_attendance_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>> {
        let owner = user_id.to_string();
        let start = format_local_datetime(&start);
        let end = format_local_datetime(&end);
        self.run("AttendanceRecord", owner.clone(), Op::Write, move |conn| {
            conn.query_row(
                schema::SELECT_ATTENDANCE_IN_WINDOW,
                [&owner, &start, &end],
                row_to_attendance,
            )
            .optional()
        })
        .await
    }

    async fn create_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let r = record.clone();
        let key = format!("{}@{}", record.user_id, record.attendance_day());
        self.run("AttendanceRecord", key, Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_ATTENDANCE,
                params![
                    r.id.to_string(),
                    r.user_id.to_string(),
                    r.recorder_id.map(|id| id.to_string()),
                    format_local_datetime(&r.date),
                    format_date(&r.attendance_day()),
                    r.status.as_str(),
                    r.latitude,
                    r.longitude,
                    r.absence_reason,
                    format_datetime(&r.created_at),
                    format_datetime(&r.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let r = record.clone();
        self.run("AttendanceRecord", record.id.to_string(), Op::Write, move |conn| {
            let rows = conn.execute(
                schema::UPDATE_ATTENDANCE,
                params![
                    r.id.to_string(),
                    r.status.as_str(),
                    r.latitude,
                    r.longitude,
                    r.absence_reason,
                    format_datetime(&r.updated_at),
                ],
            )?;
            expect_changed(rows)
        })
        .await
    }

    async fn delete_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let id_str = record.id.to_string();
        self.run("AttendanceRecord", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_ATTENDANCE, [&id_str])?)
        })
        .await
    }
}

// ============================================================================
// HealthSafetyRepository implementation
// ============================================================================

#[async_trait]
impl HealthSafetyRepository for SqliteRepository {
    async fn get_health_safety(&self, id: Uuid) -> Result<Option<HealthSafetyRecord>> {
        let id_str = id.to_string();
        self.run("HealthSafetyRecord", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_HEALTH_SAFETY_BY_ID, &id_str, row_to_health_safety)
        })
        .await
    }

    async fn list_health_safety(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<HealthSafetyRecord>> {
        let owner = user_id.to_string();
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("HealthSafetyRecord", owner.clone(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_HEALTH_SAFETY_PAGE,
                schema::COUNT_HEALTH_SAFETY,
                &[&owner, &needle],
                &query,
                row_to_health_safety,
            )
        })
        .await
    }

    async fn create_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let r = record.clone();
        let allergies = list_to_json(&record.allergies)?;
        let conditions = list_to_json(&record.medical_conditions)?;
        self.run("HealthSafetyRecord", record.id.to_string(), Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_HEALTH_SAFETY,
                params![
                    r.id.to_string(),
                    r.user_id.to_string(),
                    r.emergency_contact_name,
                    r.emergency_contact_phone,
                    r.emergency_contact_relationship,
                    allergies,
                    conditions,
                    r.medications,
                    r.notes,
                    format_datetime(&r.created_at),
                    format_datetime(&r.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let r = record.clone();
        let allergies = list_to_json(&record.allergies)?;
        let conditions = list_to_json(&record.medical_conditions)?;
        self.run("HealthSafetyRecord", record.id.to_string(), Op::Write, move |conn| {
            let rows = conn.execute(
                schema::UPDATE_HEALTH_SAFETY,
                params![
                    r.id.to_string(),
                    r.emergency_contact_name,
                    r.emergency_contact_phone,
                    r.emergency_contact_relationship,
                    allergies,
                    conditions,
                    r.medications,
                    r.notes,
                    format_datetime(&r.updated_at),
                ],
            )?;
            expect_changed(rows)
        })
        .await
    }

    async fn delete_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let id_str = record.id.to_string();
        self.run("HealthSafetyRecord", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_HEALTH_SAFETY, [&id_str])?)
        })
        .await
    }
}

// ============================================================================
// DisciplinaryActionRepository implementation
// ============================================================================

#[async_trait]
impl DisciplinaryActionRepository for SqliteRepository {
    async fn get_disciplinary_action(&self, id: Uuid) -> Result<Option<DisciplinaryAction>> {
        let id_str = id.to_string();
        self.run("DisciplinaryAction", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_ACTION_BY_ID, &id_str, row_to_disciplinary_action)
        })
        .await
    }

    async fn list_disciplinary_actions(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<DisciplinaryAction>> {
        let owner = student_id.to_string();
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("DisciplinaryAction", owner.clone(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_ACTION_PAGE,
                schema::COUNT_ACTIONS,
                &[&owner, &needle],
                &query,
                row_to_disciplinary_action,
            )
        })
        .await
    }

    async fn list_actions_by_behavior(&self, behavior_id: Uuid) -> Result<Vec<DisciplinaryAction>> {
        let id_str = behavior_id.to_string();
        self.run("DisciplinaryAction", id_str.clone(), Op::Write, move |conn| {
            collect(
                conn,
                schema::SELECT_ACTIONS_BY_BEHAVIOR,
                &[&id_str],
                row_to_disciplinary_action,
            )
        })
        .await
    }

    async fn create_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let a = action.clone();
        self.run("DisciplinaryAction", action.id.to_string(), Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_ACTION,
                params![
                    a.id.to_string(),
                    a.student_id.to_string(),
                    a.behavior_id.map(|id| id.to_string()),
                    a.action,
                    a.reason,
                    a.status.as_str(),
                    a.remarks,
                    a.date.as_ref().map(format_date),
                    format_datetime(&a.created_at),
                    format_datetime(&a.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let a = action.clone();
        self.run("DisciplinaryAction", action.id.to_string(), Op::Write, move |conn| {
            let rows = conn.execute(
                schema::UPDATE_ACTION,
                params![
                    a.id.to_string(),
                    a.action,
                    a.reason,
                    a.status.as_str(),
                    a.remarks,
                    a.date.as_ref().map(format_date),
                    format_datetime(&a.updated_at),
                ],
            )?;
            expect_changed(rows)
        })
        .await
    }

    async fn delete_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let id_str = action.id.to_string();
        self.run("DisciplinaryAction", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_ACTION, [&id_str])?)
        })
        .await
    }

    async fn delete_disciplinary_actions(&self, actions: &[DisciplinaryAction]) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = actions.iter().map(|a| a.id.to_string()).collect();
        let sql = format!(
            "DELETE FROM disciplinary_actions WHERE id IN ({})",
            vec!["?"; ids.len()].join(", ")
        );
        self.run("DisciplinaryAction", ids.join(","), Op::Delete, move |conn| {
            conn.execute(&sql, rusqlite::params_from_iter(ids.iter()))?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// StudentBehaviorRepository implementation
// ============================================================================

#[async_trait]
impl StudentBehaviorRepository for SqliteRepository {
    async fn get_student_behavior(&self, id: Uuid) -> Result<Option<StudentBehavior>> {
        let id_str = id.to_string();
        self.run("StudentBehavior", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_BEHAVIOR_BY_ID, &id_str, row_to_student_behavior)
        })
        .await
    }

    async fn list_student_behaviors(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<StudentBehavior>> {
        let owner = student_id.to_string();
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("StudentBehavior", owner.clone(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_BEHAVIOR_PAGE,
                schema::COUNT_BEHAVIORS,
                &[&owner, &needle],
                &query,
                row_to_student_behavior,
            )
        })
        .await
    }

    async fn create_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let b = behavior.clone();
        self.run("StudentBehavior", behavior.id.to_string(), Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_BEHAVIOR,
                params![
                    b.id.to_string(),
                    b.student_id.to_string(),
                    b.reporter_id.to_string(),
                    format_date(&b.behavior_date),
                    b.behavior_type.as_str(),
                    b.description,
                    format_datetime(&b.created_at),
                    format_datetime(&b.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let b = behavior.clone();
        self.run("StudentBehavior", behavior.id.to_string(), Op::Write, move |conn| {
            let rows = conn.execute(
                schema::UPDATE_BEHAVIOR,
                params![
                    b.id.to_string(),
                    format_date(&b.behavior_date),
                    b.behavior_type.as_str(),
                    b.description,
                    format_datetime(&b.updated_at),
                ],
            )?;
            expect_changed(rows)
        })
        .await
    }

    async fn delete_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let id_str = behavior.id.to_string();
        self.run("StudentBehavior", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_BEHAVIOR, [&id_str])?)
        })
        .await
    }
}

// ============================================================================
// TermRepository implementation
// ============================================================================

#[async_trait]
impl TermRepository for SqliteRepository {
    async fn get_term(&self, id: Uuid) -> Result<Option<Term>> {
        let id_str = id.to_string();
        self.run("Term", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_TERM_BY_ID, &id_str, row_to_term)
        })
        .await
    }

    async fn list_terms(&self, query: &ListQuery) -> Result<Page<Term>> {
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("Term", "all".to_string(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_TERM_PAGE,
                schema::COUNT_TERMS,
                &[&needle],
                &query,
                row_to_term,
            )
        })
        .await
    }

    async fn create_term(&self, term: &Term) -> Result<()> {
        let t = term.clone();
        self.run("Term", term.name.clone(), Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_TERM,
                params![
                    t.id.to_string(),
                    t.name,
                    format_date(&t.start_date),
                    format_date(&t.end_date),
                    format_datetime(&t.created_at),
                    format_datetime(&t.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_term(&self, term: &Term) -> Result<()> {
        let t = term.clone();
        let id = term.id;
        let name = term.name.clone();
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_TERM,
                        params![
                            t.id.to_string(),
                            t.name,
                            format_date(&t.start_date),
                            format_date(&t.end_date),
                            format_datetime(&t.updated_at),
                        ],
                    )
                    .map_err(wrap_err)?;
                expect_changed(rows).map_err(wrap_err)
            })
            .await
            .map_err(|e| match map_error(e, "Term", name, Op::Write) {
                // NotFound carries the id, duplicates carry the name
                RepositoryError::NotFound { entity_type, .. } => RepositoryError::NotFound {
                    entity_type,
                    id: id.to_string(),
                },
                other => other,
            })
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        let id_str = term.id.to_string();
        self.run("Term", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_TERM, [&id_str])?)
        })
        .await
    }
}

// ============================================================================
// AddressRepository implementation
// ============================================================================

#[async_trait]
impl AddressRepository for SqliteRepository {
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>> {
        let id_str = id.to_string();
        self.run("Address", id.to_string(), Op::Write, move |conn| {
            get_by_id(conn, schema::SELECT_ADDRESS_BY_ID, &id_str, row_to_address)
        })
        .await
    }

    async fn list_addresses(&self, user_id: Uuid, query: &ListQuery) -> Result<Page<Address>> {
        let owner = user_id.to_string();
        let needle = query.search().map(str::to_string);
        let query = query.clone();
        self.run("Address", owner.clone(), Op::Write, move |conn| {
            load_page(
                conn,
                schema::SELECT_ADDRESS_PAGE,
                schema::COUNT_ADDRESSES,
                &[&owner, &needle],
                &query,
                row_to_address,
            )
        })
        .await
    }

    async fn create_address(&self, address: &Address) -> Result<()> {
        let a = address.clone();
        self.run("Address", address.id.to_string(), Op::Write, move |conn| {
            conn.execute(
                schema::INSERT_ADDRESS,
                params![
                    a.id.to_string(),
                    a.user_id.to_string(),
                    a.street,
                    a.city,
                    a.state,
                    a.postal_code,
                    a.country,
                    format_datetime(&a.created_at),
                    format_datetime(&a.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_address(&self, address: &Address) -> Result<()> {
        let a = address.clone();
        self.run("Address", address.id.to_string(), Op::Write, move |conn| {
            let rows = conn.execute(
                schema::UPDATE_ADDRESS,
                params![
                    a.id.to_string(),
                    a.street,
                    a.city,
                    a.state,
                    a.postal_code,
                    a.country,
                    format_datetime(&a.updated_at),
                ],
            )?;
            expect_changed(rows)
        })
        .await
    }

    async fn delete_address(&self, address: &Address) -> Result<()> {
        let id_str = address.id.to_string();
        self.run("Address", id_str.clone(), Op::Delete, move |conn| {
            expect_changed(conn.execute(schema::DELETE_ADDRESS, [&id_str])?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::school::{AttendanceStatus, BehaviorType, Role};
    use chrono::NaiveDate;

    async fn setup() -> SqliteRepository {
        SqliteRepository::new_in_memory()
            .await
            .expect("Failed to create in-memory repository")
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn user(repo: &SqliteRepository, name: &str, role: Role) -> User {
        let user = User::new(name, format!("{}@school.test", name), "First", "Last", role);
        repo.create_user(&user, "hash").await.unwrap();
        user
    }

    async fn student(repo: &SqliteRepository, name: &str) -> Student {
        let user = User::new(name, format!("{}@school.test", name), "First", "Last", Role::Student);
        let student = Student::new(
            user.id,
            format!("ADM-{}", name),
            "8",
            NaiveDate::from_ymd_opt(2011, 3, 3).unwrap(),
        );
        repo.create_student_account(&user, "hash", &student)
            .await
            .unwrap();
        student
    }

    #[tokio::test]
    async fn test_user_round_trip_and_credentials() {
        let repo = setup().await;
        let created = user(&repo, "alice", Role::Teacher).await;

        let fetched = repo.get_user(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.role, Role::Teacher);

        let creds = repo
            .get_user_credentials("Alice@School.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user.id, created.id);
        assert_eq!(creds.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_already_exists() {
        let repo = setup().await;
        user(&repo, "alice", Role::Teacher).await;

        let dup = User::new("alice", "new@school.test", "A", "B", Role::Staff);
        let result = repo.create_user(&dup, "hash").await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_attendance_unique_per_day() {
        let repo = setup().await;
        let owner = user(&repo, "bea", Role::Staff).await;

        let mut first = AttendanceRecord::new(owner.id, at(2, 8), AttendanceStatus::Present);
        first.latitude = Some(40.0);
        first.longitude = Some(-73.0);
        repo.create_attendance(&first).await.unwrap();

        let second = AttendanceRecord::new(owner.id, at(2, 17), AttendanceStatus::Late);
        let result = repo.create_attendance(&second).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));

        repo.create_attendance(&AttendanceRecord::new(owner.id, at(3, 8), AttendanceStatus::Present))
            .await
            .unwrap();

        let found = repo
            .find_attendance_in_window(owner.id, at(2, 0), at(3, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.latitude, Some(40.0));
    }

    #[tokio::test]
    async fn test_attendance_missing_user_is_invalid_data() {
        let repo = setup().await;
        let orphan = AttendanceRecord::new(Uuid::new_v4(), at(2, 8), AttendanceStatus::Present);

        let result = repo.create_attendance(&orphan).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_pagination_and_search_share_the_predicate() {
        let repo = setup().await;
        let owner = user(&repo, "cody", Role::Student).await;
        for day in 1..=25 {
            let status = if day % 5 == 0 {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            };
            repo.create_attendance(&AttendanceRecord::new(owner.id, at(day, 8), status))
                .await
                .unwrap();
        }

        let page = repo
            .list_attendance(owner.id, &ListQuery::page(2, 10))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.items[0].date, at(15, 8));

        let all = repo
            .list_attendance(owner.id, &ListQuery::all())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 25);

        let late = repo
            .list_attendance(owner.id, &ListQuery::page(1, 2).with_search("late"))
            .await
            .unwrap();
        assert_eq!(late.items.len(), 2);
        assert_eq!(late.total, 5);
    }

    #[tokio::test]
    async fn test_health_safety_lists_round_trip() {
        let repo = setup().await;
        let owner = user(&repo, "dana", Role::Student).await;
        let mut record = HealthSafetyRecord::new(owner.id, "Pat", "+1 555 0100");
        record.allergies = vec!["Peanuts".to_string(), "Dust".to_string()];
        repo.create_health_safety(&record).await.unwrap();

        let fetched = repo.get_health_safety(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.allergies, record.allergies);

        let searched = repo
            .list_health_safety(owner.id, &ListQuery::default().with_search("peanut"))
            .await
            .unwrap();
        assert_eq!(searched.total, 1);
    }

    #[tokio::test]
    async fn test_behavior_delete_is_restricted_by_actions() {
        let repo = setup().await;
        let teacher = user(&repo, "eli", Role::Teacher).await;
        let pupil = student(&repo, "fay").await;

        let behavior = StudentBehavior::new(
            pupil.id,
            teacher.id,
            NaiveDate::from_ymd_opt(2024, 9, 4).unwrap(),
            BehaviorType::Negative,
            "Fighting",
        );
        repo.create_student_behavior(&behavior).await.unwrap();
        for action in ["Detention", "Call parents"] {
            repo.create_disciplinary_action(
                &DisciplinaryAction::new(pupil.id, action, "Fighting").for_behavior(behavior.id),
            )
            .await
            .unwrap();
        }

        let result = repo.delete_student_behavior(&behavior).await;
        assert!(matches!(result, Err(RepositoryError::Referenced { .. })));

        let owned = repo.list_actions_by_behavior(behavior.id).await.unwrap();
        assert_eq!(owned.len(), 2);
        repo.delete_disciplinary_actions(&owned).await.unwrap();
        repo.delete_student_behavior(&behavior).await.unwrap();

        let remaining = repo
            .list_disciplinary_actions(pupil.id, &ListQuery::all())
            .await
            .unwrap();
        assert_eq!(remaining.total, 0);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_and_reports_ids() {
        let repo = setup().await;
        let teacher = user(&repo, "gus", Role::Teacher).await;
        let pupil = student(&repo, "hal").await;

        let behavior = StudentBehavior::new(
            pupil.id,
            teacher.id,
            NaiveDate::from_ymd_opt(2024, 9, 4).unwrap(),
            BehaviorType::Positive,
            "Helped a classmate",
        );
        repo.create_student_behavior(&behavior).await.unwrap();
        let address = Address::new(pupil.user_id, "3 Pine", "Town", "ST", "12345", "USA");
        repo.create_address(&address).await.unwrap();

        let cascade = repo.delete_user(pupil.user_id).await.unwrap();
        assert_eq!(cascade.student_id, Some(pupil.id));
        assert_eq!(cascade.behaviors, vec![behavior.id]);
        assert_eq!(cascade.addresses, vec![address.id]);

        assert!(repo.get_student(pupil.id).await.unwrap().is_none());
        assert!(repo.get_address(address.id).await.unwrap().is_none());

        // Reporter is free to go once their behaviors are gone
        repo.delete_user(teacher.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_reporter_is_referenced() {
        let repo = setup().await;
        let teacher = user(&repo, "ida", Role::Teacher).await;
        let pupil = student(&repo, "jon").await;
        repo.create_student_behavior(&StudentBehavior::new(
            pupil.id,
            teacher.id,
            NaiveDate::from_ymd_opt(2024, 9, 4).unwrap(),
            BehaviorType::Neutral,
            "Observed",
        ))
        .await
        .unwrap();

        let result = repo.delete_user(teacher.id).await;
        assert!(matches!(result, Err(RepositoryError::Referenced { .. })));
        assert!(repo.get_user(teacher.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let repo = setup().await;
        let result = repo.delete_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_terms_order_and_update() {
        let repo = setup().await;
        let spring = Term::new(
            "Spring",
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(),
        );
        let mut fall = Term::new(
            "Fall",
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
        );
        repo.create_term(&spring).await.unwrap();
        repo.create_term(&fall).await.unwrap();

        let page = repo.list_terms(&ListQuery::default()).await.unwrap();
        assert_eq!(page.items[0].name, "Fall");

        fall.name = "Autumn".to_string();
        repo.update_term(&fall).await.unwrap();
        assert_eq!(repo.get_term(fall.id).await.unwrap().unwrap().name, "Autumn");

        fall.name = "Spring".to_string();
        let result = repo.update_term(&fall).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));

        let ghost = Term::new(
            "Ghost",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let result = repo.update_term(&ghost).await;
        assert_eq!(
            result,
            Err(RepositoryError::NotFound {
                entity_type: "Term",
                id: ghost.id.to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_search_folds_accented_letters() {
        let repo = setup().await;
        let term = Term::new(
            "Émile Zoë Seminar",
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(),
        );
        repo.create_term(&term).await.unwrap();

        for needle in ["ÉMILE", "émile", "ZOË", "seminar"] {
            let page = repo
                .list_terms(&ListQuery::default().with_search(needle))
                .await
                .unwrap();
            assert_eq!(page.total, 1, "search for {needle}");
            assert_eq!(page.items.len(), 1, "search for {needle}");
        }

        let page = repo
            .list_terms(&ListQuery::default().with_search("zoe"))
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
