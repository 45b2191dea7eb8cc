//! In-memory repository implementation.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use campus_core::school::{
    Address, AttendanceRecord, DisciplinaryAction, HealthSafetyRecord, Searchable, Student,
    StudentBehavior, Term, User, UserCredentials,
};
use campus_core::storage::{
    AddressRepository, AttendanceRepository, DisciplinaryActionRepository,
    HealthSafetyRepository, ListQuery, Page, RepositoryError, Result, StudentBehaviorRepository,
    StudentRepository, TermRepository, UserCascade, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    students: HashMap<Uuid, Student>,
    attendance: HashMap<Uuid, AttendanceRecord>,
    health_safety: HashMap<Uuid, HealthSafetyRecord>,
    disciplinary_actions: HashMap<Uuid, DisciplinaryAction>,
    behaviors: HashMap<Uuid, StudentBehavior>,
    terms: HashMap<Uuid, Term>,
    addresses: HashMap<Uuid, Address>,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> Result<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference("User", id))
        }
    }

    fn require_student(&self, id: Uuid) -> Result<()> {
        if self.students.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference("Student", id))
        }
    }

    fn check_user_unique(&self, user: &User) -> Result<()> {
        let taken = |existing: &UserCredentials| {
            existing.user.id == user.id
                || existing.user.username == user.username
                || existing.user.email.eq_ignore_ascii_case(&user.email)
        };
        if self.users.values().any(taken) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.username.clone(),
            });
        }
        Ok(())
    }
}

fn missing_reference(entity_type: &str, id: Uuid) -> RepositoryError {
    RepositoryError::InvalidData(format!("{} {} does not exist", entity_type, id))
}

fn not_found(entity_type: &'static str, id: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type,
        id: id.to_string(),
    }
}

/// Filters by the search needle, sorts and cuts one page.
fn page_of<'a, T, I, K, F>(rows: I, query: &ListQuery, sort_key: F) -> Page<T>
where
    T: Searchable + Clone + 'a,
    I: Iterator<Item = &'a T>,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut rows: Vec<T> = rows
        .filter(|row| query.search().is_none_or(|needle| row.matches_search(needle)))
        .cloned()
        .collect();
    rows.sort_by_key(sort_key);
    Page::slice(rows, query)
}

/// In-memory storage backend for testing.
///
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|c| c.user.clone()))
    }

    async fn get_user_credentials(&self, identifier: &str) -> Result<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|c| c.user.username == identifier || c.user.email.eq_ignore_ascii_case(identifier))
            .cloned())
    }

    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(user)?;
        tables.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<UserCascade> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(not_found("User", id));
        }

        let recorded_elsewhere = tables
            .attendance
            .values()
            .any(|a| a.recorder_id == Some(id) && a.user_id != id);
        if recorded_elsewhere || tables.behaviors.values().any(|b| b.reporter_id == id) {
            return Err(RepositoryError::Referenced {
                entity_type: "User",
                id: id.to_string(),
            });
        }

        let student_id = tables
            .students
            .values()
            .find(|s| s.user_id == id)
            .map(|s| s.id);

        let mut cascade = UserCascade {
            user_id: id,
            student_id,
            ..UserCascade::default()
        };

        tables.attendance.retain(|record_id, a| {
            let owned = a.user_id == id;
            if owned {
                cascade.attendance.push(*record_id);
            }
            !owned
        });
        tables.health_safety.retain(|record_id, h| {
            let owned = h.user_id == id;
            if owned {
                cascade.health_safety.push(*record_id);
            }
            !owned
        });
        tables.addresses.retain(|address_id, a| {
            let owned = a.user_id == id;
            if owned {
                cascade.addresses.push(*address_id);
            }
            !owned
        });

        if let Some(student_id) = student_id {
            tables.disciplinary_actions.retain(|action_id, a| {
                let owned = a.student_id == student_id;
                if owned {
                    cascade.disciplinary_actions.push(*action_id);
                }
                !owned
            });
            tables.behaviors.retain(|behavior_id, b| {
                let owned = b.student_id == student_id;
                if owned {
                    cascade.behaviors.push(*behavior_id);
                }
                !owned
            });
            tables.students.remove(&student_id);
        }

        for student in tables.students.values_mut() {
            if student.parent_id == Some(id) {
                student.parent_id = None;
            }
        }

        tables.users.remove(&id);
        Ok(cascade)
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables.students.get(&id).cloned())
    }

    async fn get_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .values()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn create_student_account(
        &self,
        user: &User,
        password_hash: &str,
        student: &Student,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(user)?;
        if tables
            .students
            .values()
            .any(|s| s.admission_number == student.admission_number)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Student",
                id: student.admission_number.clone(),
            });
        }
        if let Some(parent_id) = student.parent_id {
            tables.require_user(parent_id)?;
        }

        tables.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        tables.students.insert(student.id, student.clone());
        Ok(())
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryRepository {
    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.attendance.get(&id).cloned())
    }

    async fn list_attendance(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables.attendance.values().filter(|a| a.user_id == user_id),
            query,
            |a| (Reverse(a.date), a.id),
        ))
    }

    async fn find_attendance_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .values()
            .find(|a| a.user_id == user_id && a.date >= start && a.date < end)
            .cloned())
    }

    async fn create_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_user(record.user_id)?;
        if let Some(recorder_id) = record.recorder_id {
            tables.require_user(recorder_id)?;
        }

        let day = record.attendance_day();
        if tables
            .attendance
            .values()
            .any(|a| a.user_id == record.user_id && a.attendance_day() == day)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "AttendanceRecord",
                id: format!("{}@{}", record.user_id, day),
            });
        }

        tables.attendance.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.attendance.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(not_found("AttendanceRecord", record.id)),
        }
    }

    async fn delete_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .attendance
            .remove(&record.id)
            .map(|_| ())
            .ok_or_else(|| not_found("AttendanceRecord", record.id))
    }
}

#[async_trait]
impl HealthSafetyRepository for InMemoryRepository {
    async fn get_health_safety(&self, id: Uuid) -> Result<Option<HealthSafetyRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.health_safety.get(&id).cloned())
    }

    async fn list_health_safety(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<HealthSafetyRecord>> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables.health_safety.values().filter(|h| h.user_id == user_id),
            query,
            |h| (Reverse(h.created_at), h.id),
        ))
    }

    async fn create_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_user(record.user_id)?;
        tables.health_safety.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.health_safety.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(not_found("HealthSafetyRecord", record.id)),
        }
    }

    async fn delete_health_safety(&self, record: &HealthSafetyRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .health_safety
            .remove(&record.id)
            .map(|_| ())
            .ok_or_else(|| not_found("HealthSafetyRecord", record.id))
    }
}

#[async_trait]
impl DisciplinaryActionRepository for InMemoryRepository {
    async fn get_disciplinary_action(&self, id: Uuid) -> Result<Option<DisciplinaryAction>> {
        let tables = self.tables.read().await;
        Ok(tables.disciplinary_actions.get(&id).cloned())
    }

    async fn list_disciplinary_actions(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<DisciplinaryAction>> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables
                .disciplinary_actions
                .values()
                .filter(|a| a.student_id == student_id),
            query,
            |a| (Reverse(a.created_at), a.id),
        ))
    }

    async fn list_actions_by_behavior(&self, behavior_id: Uuid) -> Result<Vec<DisciplinaryAction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .disciplinary_actions
            .values()
            .filter(|a| a.behavior_id == Some(behavior_id))
            .cloned()
            .collect())
    }

    async fn create_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_student(action.student_id)?;
        if let Some(behavior_id) = action.behavior_id {
            if !tables.behaviors.contains_key(&behavior_id) {
                return Err(missing_reference("StudentBehavior", behavior_id));
            }
        }
        tables.disciplinary_actions.insert(action.id, action.clone());
        Ok(())
    }

    async fn update_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.disciplinary_actions.get_mut(&action.id) {
            Some(existing) => {
                *existing = action.clone();
                Ok(())
            }
            None => Err(not_found("DisciplinaryAction", action.id)),
        }
    }

    async fn delete_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .disciplinary_actions
            .remove(&action.id)
            .map(|_| ())
            .ok_or_else(|| not_found("DisciplinaryAction", action.id))
    }

    async fn delete_disciplinary_actions(&self, actions: &[DisciplinaryAction]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for action in actions {
            tables.disciplinary_actions.remove(&action.id);
        }
        Ok(())
    }
}

#[async_trait]
impl StudentBehaviorRepository for InMemoryRepository {
    async fn get_student_behavior(&self, id: Uuid) -> Result<Option<StudentBehavior>> {
        let tables = self.tables.read().await;
        Ok(tables.behaviors.get(&id).cloned())
    }

    async fn list_student_behaviors(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<StudentBehavior>> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables.behaviors.values().filter(|b| b.student_id == student_id),
            query,
            |b| (Reverse(b.behavior_date), Reverse(b.created_at), b.id),
        ))
    }

    async fn create_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_student(behavior.student_id)?;
        tables.require_user(behavior.reporter_id)?;
        tables.behaviors.insert(behavior.id, behavior.clone());
        Ok(())
    }

    async fn update_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.behaviors.get_mut(&behavior.id) {
            Some(existing) => {
                *existing = behavior.clone();
                Ok(())
            }
            None => Err(not_found("StudentBehavior", behavior.id)),
        }
    }

    async fn delete_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .disciplinary_actions
            .values()
            .any(|a| a.behavior_id == Some(behavior.id))
        {
            return Err(RepositoryError::Referenced {
                entity_type: "StudentBehavior",
                id: behavior.id.to_string(),
            });
        }
        tables
            .behaviors
            .remove(&behavior.id)
            .map(|_| ())
            .ok_or_else(|| not_found("StudentBehavior", behavior.id))
    }
}

#[async_trait]
impl TermRepository for InMemoryRepository {
    async fn get_term(&self, id: Uuid) -> Result<Option<Term>> {
        let tables = self.tables.read().await;
        Ok(tables.terms.get(&id).cloned())
    }

    async fn list_terms(&self, query: &ListQuery) -> Result<Page<Term>> {
        let tables = self.tables.read().await;
        Ok(page_of(tables.terms.values(), query, |t| (t.start_date, t.id)))
    }

    async fn create_term(&self, term: &Term) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.terms.values().any(|t| t.name == term.name) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Term",
                id: term.name.clone(),
            });
        }
        tables.terms.insert(term.id, term.clone());
        Ok(())
    }

    async fn update_term(&self, term: &Term) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .terms
            .values()
            .any(|t| t.id != term.id && t.name == term.name)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Term",
                id: term.name.clone(),
            });
        }
        match tables.terms.get_mut(&term.id) {
            Some(existing) => {
                *existing = term.clone();
                Ok(())
            }
            None => Err(not_found("Term", term.id)),
        }
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .terms
            .remove(&term.id)
            .map(|_| ())
            .ok_or_else(|| not_found("Term", term.id))
    }
}

#[async_trait]
impl AddressRepository for InMemoryRepository {
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>> {
        let tables = self.tables.read().await;
        Ok(tables.addresses.get(&id).cloned())
    }

    async fn list_addresses(&self, user_id: Uuid, query: &ListQuery) -> Result<Page<Address>> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables.addresses.values().filter(|a| a.user_id == user_id),
            query,
            |a| (Reverse(a.created_at), a.id),
        ))
    }

    async fn create_address(&self, address: &Address) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_user(address.user_id)?;
        tables.addresses.insert(address.id, address.clone());
        Ok(())
    }

    async fn update_address(&self, address: &Address) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.addresses.get_mut(&address.id) {
            Some(existing) => {
                *existing = address.clone();
                Ok(())
            }
            None => Err(not_found("Address", address.id)),
        }
    }

    async fn delete_address(&self, address: &Address) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .addresses
            .remove(&address.id)
            .map(|_| ())
            .ok_or_else(|| not_found("Address", address.id))
    }
}
