//! Postal addresses of users.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{
    validate_address, Address, CreateAddressRequest, ServiceError, ServiceResult,
    UpdateAddressRequest,
};
use campus_core::storage::{AddressRepository, ListQuery, Page, UserRepository};

use super::require_user;

#[derive(Clone)]
pub struct AddressService {
    users: Arc<dyn UserRepository>,
    addresses: Arc<dyn AddressRepository>,
}

impl AddressService {
    pub fn new(users: Arc<dyn UserRepository>, addresses: Arc<dyn AddressRepository>) -> Self {
        Self { users, addresses }
    }

    pub async fn create(&self, user_id: Uuid, request: CreateAddressRequest) -> ServiceResult<Address> {
        let address = request.into_address(user_id);
        validate_address(&address)?;
        require_user(self.users.as_ref(), user_id).await?;

        self.addresses.create_address(&address).await?;
        tracing::info!(address_id = %address.id, user_id = %user_id, "Address created");
        Ok(address)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Address> {
        self.addresses
            .get_address(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Address", id))
    }

    pub async fn list(&self, user_id: Uuid, query: &ListQuery) -> ServiceResult<Page<Address>> {
        query.validate()?;
        require_user(self.users.as_ref(), user_id).await?;
        Ok(self.addresses.list_addresses(user_id, query).await?)
    }

    pub async fn update(&self, id: Uuid, request: UpdateAddressRequest) -> ServiceResult<Address> {
        let mut address = self.get(id).await?;
        request.apply_to(&mut address);
        validate_address(&address)?;

        self.addresses.update_address(&address).await?;
        Ok(address)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<Address> {
        let address = self.get(id).await?;
        self.addresses.delete_address(&address).await?;
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use crate::storage::cached::testing::settle;
    use campus_core::cache::{address_key, Cache};
    use campus_core::school::Role;

    fn home() -> CreateAddressRequest {
        CreateAddressRequest {
            street: "12 Elm Street".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "USA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_fields_are_all_reported() {
        let fx = Fixture::new();
        let user = fx.user("lee", Role::Parent).await;
        let request = CreateAddressRequest {
            city: " ".to_string(),
            country: String::new(),
            ..home()
        };

        let Err(ServiceError::Validation(error)) = fx.services.addresses.create(user.id, request).await
        else {
            panic!("expected a validation error");
        };
        assert!(error.has_field("city"));
        assert!(error.has_field("country"));
    }

    #[tokio::test]
    async fn test_update_replaces_cached_record() {
        let fx = Fixture::new();
        let user = fx.user("lee", Role::Parent).await;
        let service = &fx.services.addresses;
        let address = service.create(user.id, home()).await.unwrap();

        service.get(address.id).await.unwrap();
        settle().await;
        assert!(fx.cache.get(&address_key(address.id)).await.unwrap().is_some());

        let update = UpdateAddressRequest {
            city: Some("Shelbyville".to_string()),
            ..UpdateAddressRequest::default()
        };
        service.update(address.id, update).await.unwrap();
        assert!(fx.cache.get(&address_key(address.id)).await.unwrap().is_none());

        assert_eq!(service.get(address.id).await.unwrap().city, "Shelbyville");
    }

    #[tokio::test]
    async fn test_list_for_missing_user_is_not_found() {
        let fx = Fixture::new();
        let ghost = Uuid::new_v4();
        assert_eq!(
            fx.services
                .addresses
                .list(ghost, &ListQuery::default())
                .await
                .unwrap_err(),
            ServiceError::not_found("User", ghost)
        );
    }
}
