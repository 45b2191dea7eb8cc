use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use campus_core::school::{service_error_to_status_code, FieldError, ServiceError};

/// Error returned by every API handler.
///
/// Renders as `{success: false, message}`, plus `errors` for validation
/// failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Service(err) => StatusCode::from_u16(service_error_to_status_code(err))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
            if status == StatusCode::SERVICE_UNAVAILABLE {
                "Service unavailable".to_string()
            } else {
                "Internal server error".to_string()
            }
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        let errors = match &self {
            AppError::Service(ServiceError::Validation(err)) => Some(err.errors.as_slice()),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message: &message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::storage::RepositoryError;
    use http_body_util::BodyExt;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let error = ServiceError::validation("latitude", "latitude must be between -90 and 90");
        let (status, body) = render(error.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0]["field"], "latitude");
    }

    #[tokio::test]
    async fn test_not_found_has_no_errors_field() {
        let (status, body) = render(ServiceError::not_found("Term", "t-1").into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Term not found: t-1");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_are_masked() {
        let error = ServiceError::Storage(RepositoryError::QueryFailed("no such table".into()));
        let (status, body) = render(error.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");

        let error = ServiceError::Storage(RepositoryError::ConnectionFailed("refused".into()));
        let (status, body) = render(error.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Service unavailable");
    }

    #[tokio::test]
    async fn test_conflict_keeps_message() {
        let (status, body) =
            render(ServiceError::Conflict("already clocked in today".into()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "already clocked in today");
    }
}
