//! Student behavior reports.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{
    validate_student_behavior, CreateStudentBehaviorRequest, ServiceError, ServiceResult,
    StudentBehavior, UpdateStudentBehaviorRequest, User,
};
use campus_core::storage::{
    DisciplinaryActionRepository, ListQuery, Page, StudentBehaviorRepository, StudentRepository,
};

use super::require_student;

#[derive(Clone)]
pub struct StudentBehaviorService {
    students: Arc<dyn StudentRepository>,
    behaviors: Arc<dyn StudentBehaviorRepository>,
    actions: Arc<dyn DisciplinaryActionRepository>,
}

impl StudentBehaviorService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        behaviors: Arc<dyn StudentBehaviorRepository>,
        actions: Arc<dyn DisciplinaryActionRepository>,
    ) -> Self {
        Self {
            students,
            behaviors,
            actions,
        }
    }

    /// Files a behavior report on a student. The caller is the reporter.
    pub async fn create(
        &self,
        student_id: Uuid,
        reporter: &User,
        request: CreateStudentBehaviorRequest,
    ) -> ServiceResult<StudentBehavior> {
        let behavior = request.into_behavior(student_id, reporter.id);
        validate_student_behavior(&behavior)?;
        require_student(self.students.as_ref(), student_id).await?;

        self.behaviors.create_student_behavior(&behavior).await?;
        tracing::info!(
            student_behavior_id = %behavior.id,
            student_id = %student_id,
            reporter_id = %reporter.id,
            "Student behavior recorded"
        );
        Ok(behavior)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<StudentBehavior> {
        self.behaviors
            .get_student_behavior(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("StudentBehavior", id))
    }

    pub async fn list(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> ServiceResult<Page<StudentBehavior>> {
        query.validate()?;
        require_student(self.students.as_ref(), student_id).await?;
        Ok(self.behaviors.list_student_behaviors(student_id, query).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateStudentBehaviorRequest,
    ) -> ServiceResult<StudentBehavior> {
        let mut behavior = self.get(id).await?;
        request.apply_to(&mut behavior);
        validate_student_behavior(&behavior)?;

        self.behaviors.update_student_behavior(&behavior).await?;
        Ok(behavior)
    }

    /// Deletes a behavior together with every action raised in response to it.
    ///
    /// Actions go first; the behavior row refuses deletion while any remain.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<StudentBehavior> {
        let behavior = self.get(id).await?;

        let actions = self.actions.list_actions_by_behavior(id).await?;
        self.actions.delete_disciplinary_actions(&actions).await?;
        self.behaviors.delete_student_behavior(&behavior).await?;

        tracing::info!(
            student_behavior_id = %id,
            removed_actions = actions.len(),
            "Student behavior deleted"
        );
        Ok(behavior)
    }
}
