//! Health-and-safety records.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{
    validate_health_safety, CreateHealthSafetyRequest, HealthSafetyRecord, ServiceError,
    ServiceResult, UpdateHealthSafetyRequest,
};
use campus_core::storage::{HealthSafetyRepository, ListQuery, Page, UserRepository};

use super::require_user;

#[derive(Clone)]
pub struct HealthSafetyService {
    users: Arc<dyn UserRepository>,
    records: Arc<dyn HealthSafetyRepository>,
}

impl HealthSafetyService {
    pub fn new(users: Arc<dyn UserRepository>, records: Arc<dyn HealthSafetyRepository>) -> Self {
        Self { users, records }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateHealthSafetyRequest,
    ) -> ServiceResult<HealthSafetyRecord> {
        let record = request.into_record(user_id);
        validate_health_safety(&record)?;
        require_user(self.users.as_ref(), user_id).await?;

        self.records.create_health_safety(&record).await?;
        tracing::info!(health_safety_id = %record.id, user_id = %user_id, "Health record created");
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<HealthSafetyRecord> {
        self.records
            .get_health_safety(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("HealthSafetyRecord", id))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> ServiceResult<Page<HealthSafetyRecord>> {
        query.validate()?;
        require_user(self.users.as_ref(), user_id).await?;
        Ok(self.records.list_health_safety(user_id, query).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateHealthSafetyRequest,
    ) -> ServiceResult<HealthSafetyRecord> {
        let mut record = self.get(id).await?;
        request.apply_to(&mut record);
        validate_health_safety(&record)?;

        self.records.update_health_safety(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<HealthSafetyRecord> {
        let record = self.get(id).await?;
        self.records.delete_health_safety(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use campus_core::school::Role;

    fn contact(name: &str) -> CreateHealthSafetyRequest {
        CreateHealthSafetyRequest {
            emergency_contact_name: name.to_string(),
            emergency_contact_phone: "+1 (555) 010-0199".to_string(),
            emergency_contact_relationship: Some("Mother".to_string()),
            allergies: vec!["Peanuts".to_string()],
            medical_conditions: vec![],
            medications: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_for_missing_user_writes_nothing() {
        let fx = Fixture::new();
        let ghost = Uuid::new_v4();

        let result = fx.services.health_safety.create(ghost, contact("Ann")).await;
        assert_eq!(result.unwrap_err(), ServiceError::not_found("User", ghost));
        assert_eq!(
            fx.storage
                .list_health_safety(ghost, &ListQuery::all())
                .await
                .unwrap()
                .total,
            0
        );
    }

    #[tokio::test]
    async fn test_invalid_phone_reports_field() {
        let fx = Fixture::new();
        let user = fx.user("kim", Role::Student).await;
        let mut request = contact("Ann");
        request.emergency_contact_phone = "call me".to_string();

        let result = fx.services.health_safety.create(user.id, request).await;
        assert!(
            matches!(result, Err(ServiceError::Validation(e)) if e.has_field("emergencyContactPhone"))
        );
    }

    #[tokio::test]
    async fn test_search_and_update() {
        let fx = Fixture::new();
        let user = fx.user("kim", Role::Student).await;
        let service = &fx.services.health_safety;

        let record = service.create(user.id, contact("Ann")).await.unwrap();
        service.create(user.id, contact("Bob")).await.unwrap();

        let peanut = service
            .list(user.id, &ListQuery::default().with_search("PEANUT"))
            .await
            .unwrap();
        assert_eq!(peanut.total, 2);

        let update = UpdateHealthSafetyRequest {
            notes: Some("Carries an inhaler".to_string()),
            ..UpdateHealthSafetyRequest::default()
        };
        service.update(record.id, update).await.unwrap();

        let inhaler = service
            .list(user.id, &ListQuery::default().with_search("inhaler"))
            .await
            .unwrap();
        assert_eq!(inhaler.items.len(), 1);
        assert_eq!(inhaler.items[0].id, record.id);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let fx = Fixture::new();
        let id = Uuid::new_v4();
        assert_eq!(
            fx.services.health_safety.delete(id).await.unwrap_err(),
            ServiceError::not_found("HealthSafetyRecord", id)
        );
    }
}
