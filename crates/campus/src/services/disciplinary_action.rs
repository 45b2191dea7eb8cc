//! Disciplinary actions taken against students.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{
    validate_disciplinary_action, CreateDisciplinaryActionRequest, DisciplinaryAction,
    ServiceError, ServiceResult, UpdateDisciplinaryActionRequest,
};
use campus_core::storage::{
    DisciplinaryActionRepository, ListQuery, Page, StudentBehaviorRepository, StudentRepository,
};

use super::require_student;

#[derive(Clone)]
pub struct DisciplinaryActionService {
    students: Arc<dyn StudentRepository>,
    behaviors: Arc<dyn StudentBehaviorRepository>,
    actions: Arc<dyn DisciplinaryActionRepository>,
}

impl DisciplinaryActionService {
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

    /// Records an action against a student, optionally in response to one
    /// of that student's behaviors.
    pub async fn create(
        &self,
        student_id: Uuid,
        request: CreateDisciplinaryActionRequest,
    ) -> ServiceResult<DisciplinaryAction> {
        let action = request.into_action(student_id);
        validate_disciplinary_action(&action)?;
        require_student(self.students.as_ref(), student_id).await?;

        if let Some(behavior_id) = action.behavior_id {
            let behavior = self
                .behaviors
                .get_student_behavior(behavior_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("StudentBehavior", behavior_id))?;
            if behavior.student_id != student_id {
                return Err(ServiceError::validation(
                    "behaviorId",
                    "behavior belongs to another student",
                ));
            }
        }

        self.actions.create_disciplinary_action(&action).await?;
        tracing::info!(
            disciplinary_action_id = %action.id,
            student_id = %student_id,
            "Disciplinary action created"
        );
        Ok(action)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<DisciplinaryAction> {
        self.actions
            .get_disciplinary_action(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("DisciplinaryAction", id))
    }

    pub async fn list(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> ServiceResult<Page<DisciplinaryAction>> {
        query.validate()?;
        require_student(self.students.as_ref(), student_id).await?;
        Ok(self.actions.list_disciplinary_actions(student_id, query).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDisciplinaryActionRequest,
    ) -> ServiceResult<DisciplinaryAction> {
        let mut action = self.get(id).await?;
        request.apply_to(&mut action);
        validate_disciplinary_action(&action)?;

        self.actions.update_disciplinary_action(&action).await?;
        Ok(action)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<DisciplinaryAction> {
        let action = self.get(id).await?;
        self.actions.delete_disciplinary_action(&action).await?;
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use campus_core::school::{BehaviorType, DisciplinaryStatus, Role, StudentBehavior};
    use chrono::NaiveDate;

    fn detention() -> CreateDisciplinaryActionRequest {
        CreateDisciplinaryActionRequest {
            action: "Detention".to_string(),
            reason: "Late homework".to_string(),
            status: None,
            remarks: None,
            date: NaiveDate::from_ymd_opt(2024, 9, 5),
            behavior_id: None,
        }
    }

    #[tokio::test]
    async fn test_missing_student_is_not_found() {
        let fx = Fixture::new();
        let ghost = Uuid::new_v4();

        let result = fx.services.disciplinary_actions.create(ghost, detention()).await;
        assert_eq!(result.unwrap_err(), ServiceError::not_found("Student", ghost));
    }

    #[tokio::test]
    async fn test_behavior_of_another_student_is_rejected() {
        let fx = Fixture::new();
        let teacher = fx.user("tom", Role::Teacher).await;
        let ann = fx.student("ann").await;
        let ben = fx.student("ben").await;

        let behavior = StudentBehavior::new(
            ben.id,
            teacher.id,
            NaiveDate::from_ymd_opt(2024, 9, 4).unwrap(),
            BehaviorType::Negative,
            "Talking in class",
        );
        fx.storage.create_student_behavior(&behavior).await.unwrap();

        let request = CreateDisciplinaryActionRequest {
            behavior_id: Some(behavior.id),
            ..detention()
        };
        let result = fx.services.disciplinary_actions.create(ann.id, request).await;
        assert!(matches!(result, Err(ServiceError::Validation(e)) if e.has_field("behaviorId")));
    }

    #[tokio::test]
    async fn test_defaults_to_pending_and_updates_status() {
        let fx = Fixture::new();
        let ann = fx.student("ann").await;
        let service = &fx.services.disciplinary_actions;

        let action = service.create(ann.id, detention()).await.unwrap();
        assert_eq!(action.status, DisciplinaryStatus::Pending);

        let update = UpdateDisciplinaryActionRequest {
            status: Some(DisciplinaryStatus::Resolved),
            ..UpdateDisciplinaryActionRequest::default()
        };
        service.update(action.id, update).await.unwrap();

        let resolved = service
            .list(ann.id, &ListQuery::default().with_search("resolved"))
            .await
            .unwrap();
        assert_eq!(resolved.total, 1);
    }
}
