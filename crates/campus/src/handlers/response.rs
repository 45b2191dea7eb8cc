//! Success envelopes.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use campus_core::storage::{ListQuery, Page, Pagination};

use super::AppError;

/// `{message, data}` body of every successful response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

pub fn ok<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope { message, data })
}

pub fn created<T: Serialize>(message: &'static str, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(message, data))
}

/// Renders a page as `{<collection>: [...], pagination}`.
///
/// `pagination` is null for fetch-all queries.
pub fn list<T: Serialize>(
    message: &'static str,
    collection: &'static str,
    page: Page<T>,
    query: &ListQuery,
) -> Result<Json<Envelope<Value>>, AppError> {
    let pagination = Pagination::for_query(query, page.total);

    let mut data = Map::new();
    data.insert(collection.to_string(), serde_json::to_value(page.items)?);
    data.insert("pagination".to_string(), serde_json::to_value(pagination)?);

    Ok(ok(message, Value::Object(data)))
}
