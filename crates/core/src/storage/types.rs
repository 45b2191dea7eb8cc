use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::school::{FieldErrors, ValidationError};
use crate::serde::deserialize_optional_string;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Paging and search parameters of a list request.
///
/// List cache keys are derived from [`ListQuery::cache_identity`], so every
/// field that changes the result must survive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub fetch_all: bool,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search_query: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            fetch_all: false,
            search_query: None,
        }
    }
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            fetch_all: true,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search_query = Some(search.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        if self.page < 1 {
            errors.push("page", "page must be at least 1");
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            errors.push("limit", format!("limit must be between 1 and {}", MAX_LIMIT));
        }
        errors.finish()
    }

    /// Rows to skip. Zero when fetching everything.
    pub fn offset(&self) -> u64 {
        if self.fetch_all {
            0
        } else {
            u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
        }
    }

    /// Search needle with surrounding whitespace removed.
    pub fn search(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The query with fields that cannot change the result reset.
    ///
    /// `page` and `limit` are ignored when fetching everything, and the
    /// search needle is trimmed, so equivalent requests share a cache key.
    pub fn cache_identity(&self) -> Self {
        let (page, limit) = if self.fetch_all {
            (default_page(), DEFAULT_LIMIT)
        } else {
            (self.page, self.limit)
        };
        Self {
            page,
            limit,
            fetch_all: self.fetch_all,
            search_query: self.search().map(str::to_string),
        }
    }
}

/// One page of a list query plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Cuts one page out of an already filtered, ordered set of rows.
    pub fn slice(rows: Vec<T>, query: &ListQuery) -> Self {
        let total = rows.len() as u64;
        let items = if query.fetch_all {
            rows
        } else {
            rows.into_iter()
                .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
                .take(query.limit as usize)
                .collect()
        };
        Self { items, total }
    }
}

/// Pagination metadata returned with list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    /// Returns `None` for fetch-all queries, which carry no pagination.
    pub fn for_query(query: &ListQuery, total: u64) -> Option<Self> {
        if query.fetch_all {
            return None;
        }
        let limit = u64::from(query.limit.max(1));
        Some(Self {
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(limit),
        })
    }
}

/// Ids of everything removed along with a user.
///
/// Returned by [`super::UserRepository::delete_user`] so caches holding the
/// removed rows can be invalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCascade {
    pub user_id: Uuid,
    pub student_id: Option<Uuid>,
    pub attendance: Vec<Uuid>,
    pub health_safety: Vec<Uuid>,
    pub addresses: Vec<Uuid>,
    pub behaviors: Vec<Uuid>,
    pub disciplinary_actions: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, ListQuery::default());
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_query_reads_camel_case() {
        let query: ListQuery =
            serde_json::from_str(r#"{"page": 3, "limit": 5, "fetchAll": false, "searchQuery": "flu"}"#)
                .unwrap();
        assert_eq!(query.offset(), 10);
        assert_eq!(query.search(), Some("flu"));
    }

    #[test]
    fn test_query_bounds() {
        assert!(ListQuery::page(0, 10).validate().is_err());
        assert!(ListQuery::page(1, 0).validate().is_err());
        assert!(ListQuery::page(1, MAX_LIMIT + 1).validate().is_err());
        assert!(ListQuery::page(1, MAX_LIMIT).validate().is_ok());
    }

    #[test]
    fn test_pagination_rounds_up() {
        let pagination = Pagination::for_query(&ListQuery::page(2, 10), 25).unwrap();
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.page, 2);

        let exact = Pagination::for_query(&ListQuery::page(1, 5), 25).unwrap();
        assert_eq!(exact.total_pages, 5);

        let empty = Pagination::for_query(&ListQuery::default(), 0).unwrap();
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_cache_identity_drops_inert_fields() {
        let all_p1: ListQuery = serde_json::from_str(r#"{"fetchAll": true, "page": 1}"#).unwrap();
        let all_p2: ListQuery =
            serde_json::from_str(r#"{"fetchAll": true, "page": 2, "limit": 50}"#).unwrap();
        assert_eq!(all_p1.cache_identity(), all_p2.cache_identity());

        let padded = ListQuery::default().with_search(" flu ");
        assert_eq!(
            padded.cache_identity(),
            ListQuery::default().with_search("flu").cache_identity()
        );
        assert_eq!(
            ListQuery::default().with_search("   ").cache_identity(),
            ListQuery::default()
        );

        assert_ne!(
            ListQuery::page(1, 10).cache_identity(),
            ListQuery::page(2, 10).cache_identity()
        );
    }

    #[test]
    fn test_fetch_all_has_no_pagination() {
        assert_eq!(Pagination::for_query(&ListQuery::all(), 25), None);
    }

    #[test]
    fn test_slice_pages_and_counts() {
        let rows: Vec<u32> = (0..25).collect();

        let page = Page::slice(rows.clone(), &ListQuery::page(3, 10));
        assert_eq!(page.items, (20..25).collect::<Vec<_>>());
        assert_eq!(page.total, 25);

        let all = Page::slice(rows, &ListQuery::all());
        assert_eq!(all.items.len(), 25);
    }

    #[test]
    fn test_pagination_serializes_total_pages() {
        let json = serde_json::to_value(Pagination::for_query(&ListQuery::default(), 11)).unwrap();
        assert_eq!(json["totalPages"], 2);
    }
}
