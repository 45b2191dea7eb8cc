//! Cached address repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{address_key, user_address_scope, Cache};
use campus_core::school::Address;
use campus_core::storage::{AddressRepository, ListQuery, Page, Result};

use super::{query_key, CacheAside};

pub struct CachedAddressRepository<R, C>
where
    R: AddressRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedAddressRepository<R, C>
where
    R: AddressRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }

    async fn invalidate(&self, address: &Address) {
        self.cache.invalidate(&[address_key(address.id)]).await;
        self.cache
            .invalidate_scope(&user_address_scope(address.user_id))
            .await;
    }
}

#[async_trait]
impl<R, C> AddressRepository for CachedAddressRepository<R, C>
where
    R: AddressRepository + 'static,
    C: Cache + 'static,
{
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>> {
        self.cache
            .record(address_key(id), self.repository.get_address(id))
            .await
    }

    async fn list_addresses(&self, user_id: Uuid, query: &ListQuery) -> Result<Page<Address>> {
        let key = query_key(&user_address_scope(user_id), query);
        self.cache
            .list(key, self.repository.list_addresses(user_id, query))
            .await
    }

    async fn create_address(&self, address: &Address) -> Result<()> {
        self.repository.create_address(address).await?;
        self.cache
            .invalidate_scope(&user_address_scope(address.user_id))
            .await;

        tracing::debug!(address_id = %address.id, user_id = %address.user_id, "Address created");
        Ok(())
    }

    async fn update_address(&self, address: &Address) -> Result<()> {
        self.repository.update_address(address).await?;
        self.invalidate(address).await;

        tracing::debug!(address_id = %address.id, "Address updated");
        Ok(())
    }

    async fn delete_address(&self, address: &Address) -> Result<()> {
        self.repository.delete_address(address).await?;
        self.invalidate(address).await;

        tracing::debug!(address_id = %address.id, "Address deleted");
        Ok(())
    }
}
