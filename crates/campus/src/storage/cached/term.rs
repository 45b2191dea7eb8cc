//! Cached term repository decorator.
//!
//! Terms have no owner, so every term write invalidates the single global
//! list scope.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use campus_core::cache::{term_key, terms_scope, Cache};
use campus_core::school::Term;
use campus_core::storage::{ListQuery, Page, Result, TermRepository};

use super::{query_key, CacheAside};

pub struct CachedTermRepository<R, C>
where
    R: TermRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: CacheAside<C>,
}

impl<R, C> CachedTermRepository<R, C>
where
    R: TermRepository,
    C: Cache + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache: CacheAside::new(cache, ttl),
        }
    }
}

#[async_trait]
impl<R, C> TermRepository for CachedTermRepository<R, C>
where
    R: TermRepository + 'static,
    C: Cache + 'static,
{
    async fn get_term(&self, id: Uuid) -> Result<Option<Term>> {
        self.cache
            .record(term_key(id), self.repository.get_term(id))
            .await
    }

    async fn list_terms(&self, query: &ListQuery) -> Result<Page<Term>> {
        let key = query_key(&terms_scope(), query);
        self.cache.list(key, self.repository.list_terms(query)).await
    }

    async fn create_term(&self, term: &Term) -> Result<()> {
        self.repository.create_term(term).await?;
        self.cache.invalidate_scope(&terms_scope()).await;

        tracing::debug!(term_id = %term.id, "Term created");
        Ok(())
    }

    async fn update_term(&self, term: &Term) -> Result<()> {
        self.repository.update_term(term).await?;
        self.cache.invalidate(&[term_key(term.id)]).await;
        self.cache.invalidate_scope(&terms_scope()).await;

        tracing::debug!(term_id = %term.id, "Term updated");
        Ok(())
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        self.repository.delete_term(term).await?;
        self.cache.invalidate(&[term_key(term.id)]).await;
        self.cache.invalidate_scope(&terms_scope()).await;

        tracing::debug!(term_id = %term.id, "Term deleted");
        Ok(())
    }
}
