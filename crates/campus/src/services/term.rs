//! Academic terms. Terms have no owner and share one list scope.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::school::{
    validate_term, CreateTermRequest, ServiceError, ServiceResult, Term, UpdateTermRequest,
};
use campus_core::storage::{ListQuery, Page, TermRepository};

#[derive(Clone)]
pub struct TermService {
    terms: Arc<dyn TermRepository>,
}

impl TermService {
    pub fn new(terms: Arc<dyn TermRepository>) -> Self {
        Self { terms }
    }

    pub async fn create(&self, request: CreateTermRequest) -> ServiceResult<Term> {
        let term = request.into_term();
        validate_term(&term)?;

        self.terms.create_term(&term).await?;
        tracing::info!(term_id = %term.id, name = %term.name, "Term created");
        Ok(term)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Term> {
        self.terms
            .get_term(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Term", id))
    }

    pub async fn list(&self, query: &ListQuery) -> ServiceResult<Page<Term>> {
        query.validate()?;
        Ok(self.terms.list_terms(query).await?)
    }

    pub async fn update(&self, id: Uuid, request: UpdateTermRequest) -> ServiceResult<Term> {
        let mut term = self.get(id).await?;
        request.apply_to(&mut term);
        validate_term(&term)?;

        self.terms.update_term(&term).await?;
        Ok(term)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<Term> {
        let term = self.get(id).await?;
        self.terms.delete_term(&term).await?;
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use chrono::NaiveDate;

    fn term(name: &str, start: (u32, u32), end: (u32, u32)) -> CreateTermRequest {
        CreateTermRequest {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, start.0, start.1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, end.0, end.1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() {
        let fx = Fixture::new();
        let result = fx.services.terms.create(term("Backwards", (6, 1), (1, 1))).await;
        assert!(matches!(result, Err(ServiceError::Validation(e)) if e.has_field("endDate")));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let fx = Fixture::new();
        let service = &fx.services.terms;
        service.create(term("Fall", (9, 1), (12, 20))).await.unwrap();

        let result = service.create(term("Fall", (9, 2), (12, 21))).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_pagination_over_terms() {
        let fx = Fixture::new();
        let service = &fx.services.terms;
        for month in 1..=12 {
            service
                .create(term(&format!("Block {month}"), (month, 1), (month, 20)))
                .await
                .unwrap();
        }

        let page = service.list(&ListQuery::page(2, 5)).await.unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].name, "Block 6");

        let too_big = service.list(&ListQuery::page(1, 500)).await;
        assert!(matches!(too_big, Err(ServiceError::Validation(_))));
    }
}
