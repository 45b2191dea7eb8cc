//! Cached disciplinary action repository decorator.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{disciplinary_action_key, student_disciplinary_actions_scope, Cache};
use campus_core::school::DisciplinaryAction;
use campus_core::storage::{DisciplinaryActionRepository, ListQuery, Page, Result};

use super::{query_key, CacheAside};

pub struct CachedDisciplinaryActionRepository<R, C>
where
    R: DisciplinaryActionRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedDisciplinaryActionRepository<R, C>
where
    R: DisciplinaryActionRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    async fn invalidate(&self, actions: &[DisciplinaryAction]) {
        let keys: Vec<String> = actions
            .iter()
            .map(|a| disciplinary_action_key(a.id))
            .collect();
        self.cache.invalidate(&keys).await;

        let students: BTreeSet<Uuid> = actions.iter().map(|a| a.student_id).collect();
        for student_id in students {
            self.cache
                .invalidate_scope(&student_disciplinary_actions_scope(student_id))
                .await;
        }
    }
}

#[async_trait]
impl<R, C> DisciplinaryActionRepository for CachedDisciplinaryActionRepository<R, C>
where
    R: DisciplinaryActionRepository + 'static,
    C: Cache + 'static,
{
    async fn get_disciplinary_action(&self, id: Uuid) -> Result<Option<DisciplinaryAction>> {
        self.cache
            .record(
                disciplinary_action_key(id),
                self.repository.get_disciplinary_action(id),
            )
            .await
    }

    async fn list_disciplinary_actions(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<DisciplinaryAction>> {
        let key = query_key(&student_disciplinary_actions_scope(student_id), query);
        self.cache
            .list(
                key,
                self.repository.list_disciplinary_actions(student_id, query),
            )
            .await
    }

    async fn list_actions_by_behavior(&self, behavior_id: Uuid) -> Result<Vec<DisciplinaryAction>> {
        self.repository.list_actions_by_behavior(behavior_id).await
    }

    async fn create_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        self.repository.create_disciplinary_action(action).await?;
        self.cache
            .invalidate_scope(&student_disciplinary_actions_scope(action.student_id))
            .await;

        tracing::debug!(
            disciplinary_action_id = %action.id,
            student_id = %action.student_id,
            "Disciplinary action created"
        );
        Ok(())
    }

    async fn update_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        self.repository.update_disciplinary_action(action).await?;
        self.invalidate(std::slice::from_ref(action)).await;

        tracing::debug!(disciplinary_action_id = %action.id, "Disciplinary action updated");
        Ok(())
    }

    async fn delete_disciplinary_action(&self, action: &DisciplinaryAction) -> Result<()> {
        self.repository.delete_disciplinary_action(action).await?;
        self.invalidate(std::slice::from_ref(action)).await;

        tracing::debug!(disciplinary_action_id = %action.id, "Disciplinary action deleted");
        Ok(())
    }

    async fn delete_disciplinary_actions(&self, actions: &[DisciplinaryAction]) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }

        self.repository.delete_disciplinary_actions(actions).await?;
        self.invalidate(actions).await;

        tracing::debug!(count = actions.len(), "Disciplinary actions deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::school::{Role, Student, User};
    use campus_core::storage::StudentRepository;
    use chrono::NaiveDate;

    use crate::storage::cached::testing::{settle, MockCache};
    use crate::storage::InMemoryRepository;

    async fn student(repo: &InMemoryRepository) -> Student {
        let user = User::new("leo", "leo@school.test", "Leo", "Park", Role::Student);
        let student = Student::new(
            user.id,
            "A-100",
            "7",
            NaiveDate::from_ymd_opt(2012, 4, 1).unwrap(),
        );
        repo.create_student_account(&user, "hash", &student)
            .await
            .unwrap();
        student
    }

    #[tokio::test]
    async fn test_batch_delete_invalidates_every_action() {
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached = CachedDisciplinaryActionRepository::new(
            repo.clone(),
            cache.clone(),
            Duration::from_secs(60),
        );
        let student = student(&repo).await;

        let first = DisciplinaryAction::new(student.id, "Detention", "Late homework");
        let second = DisciplinaryAction::new(student.id, "Warning", "Talking in class");
        cached.create_disciplinary_action(&first).await.unwrap();
        cached.create_disciplinary_action(&second).await.unwrap();

        cached.get_disciplinary_action(first.id).await.unwrap();
        cached.get_disciplinary_action(second.id).await.unwrap();
        cached
            .list_disciplinary_actions(student.id, &ListQuery::default())
            .await
            .unwrap();
        settle().await;
        assert_eq!(cache.keys_with_prefix("disciplinary-action:").await.len(), 3);

        cached
            .delete_disciplinary_actions(&[first.clone(), second.clone()])
            .await
            .unwrap();

        assert!(cache.keys_with_prefix("disciplinary-action:").await.is_empty());
        let page = cached
            .list_disciplinary_actions(student.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
