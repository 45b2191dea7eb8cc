//! Cached student behavior repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{student_behavior_key, student_behaviors_scope, Cache};
use campus_core::school::StudentBehavior;
use campus_core::storage::{ListQuery, Page, Result, StudentBehaviorRepository};

use super::{query_key, CacheAside};

pub struct CachedStudentBehaviorRepository<R, C>
where
    R: StudentBehaviorRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedStudentBehaviorRepository<R, C>
where
    R: StudentBehaviorRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    async fn invalidate(&self, behavior: &StudentBehavior) {
        self.cache
            .invalidate(&[student_behavior_key(behavior.id)])
            .await;
        self.cache
            .invalidate_scope(&student_behaviors_scope(behavior.student_id))
            .await;
    }
}

#[async_trait]
impl<R, C> StudentBehaviorRepository for CachedStudentBehaviorRepository<R, C>
where
    R: StudentBehaviorRepository + 'static,
    C: Cache + 'static,
{
    async fn get_student_behavior(&self, id: Uuid) -> Result<Option<StudentBehavior>> {
        self.cache
            .record(
                student_behavior_key(id),
                self.repository.get_student_behavior(id),
            )
            .await
    }

    async fn list_student_behaviors(
        &self,
        student_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<StudentBehavior>> {
        let key = query_key(&student_behaviors_scope(student_id), query);
        self.cache
            .list(key, self.repository.list_student_behaviors(student_id, query))
            .await
    }

    async fn create_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        self.repository.create_student_behavior(behavior).await?;
        self.cache
            .invalidate_scope(&student_behaviors_scope(behavior.student_id))
            .await;

        tracing::debug!(
            student_behavior_id = %behavior.id,
            student_id = %behavior.student_id,
            "Student behavior created"
        );
        Ok(())
    }

    async fn update_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        self.repository.update_student_behavior(behavior).await?;
        self.invalidate(behavior).await;

        tracing::debug!(student_behavior_id = %behavior.id, "Student behavior updated");
        Ok(())
    }

    async fn delete_student_behavior(&self, behavior: &StudentBehavior) -> Result<()> {
        self.repository.delete_student_behavior(behavior).await?;
        self.invalidate(behavior).await;

        tracing::debug!(student_behavior_id = %behavior.id, "Student behavior deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::school::{BehaviorType, DisciplinaryAction, Role, Student, User};
    use campus_core::storage::{
        DisciplinaryActionRepository, RepositoryError, StudentRepository, UserRepository,
    };
    use chrono::NaiveDate;

    use crate::storage::cached::testing::{settle, MockCache};
    use crate::storage::InMemoryRepository;

    #[tokio::test]
    async fn test_rejected_delete_keeps_cache() {
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedStudentBehaviorRepository::new(repo.clone(), cache.clone(), Duration::from_secs(60));

        let teacher = User::new("mrs.t", "t@school.test", "Tess", "Ng", Role::Teacher);
        repo.create_user(&teacher, "hash").await.unwrap();
        let user = User::new("max", "max@school.test", "Max", "Ro", Role::Student);
        let student = Student::new(user.id, "A-7", "5", NaiveDate::from_ymd_opt(2014, 1, 9).unwrap());
        repo.create_student_account(&user, "hash", &student).await.unwrap();

        let behavior = StudentBehavior::new(
            student.id,
            teacher.id,
            NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            BehaviorType::Negative,
            "Disrupted assembly",
        );
        cached.create_student_behavior(&behavior).await.unwrap();
        repo.create_disciplinary_action(
            &DisciplinaryAction::new(student.id, "Detention", "Assembly").for_behavior(behavior.id),
        )
        .await
        .unwrap();

        cached.get_student_behavior(behavior.id).await.unwrap();
        settle().await;

        let result = cached.delete_student_behavior(&behavior).await;
        assert!(matches!(result, Err(RepositoryError::Referenced { .. })));
        assert!(cache.contains(&student_behavior_key(behavior.id)).await);
    }
}
