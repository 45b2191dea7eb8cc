use thiserror::Error;

use super::ValidationError;
use crate::storage::{repository_error_to_status_code, RepositoryError};

/// Errors surfaced by the entity services.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(RepositoryError),
}

impl ServiceError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::field(field, message))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepositoryError::AlreadyExists { .. } | RepositoryError::Referenced { .. } => {
                Self::Conflict(error.to_string())
            }
            RepositoryError::InvalidData(message) => Self::validation("body", message),
            other => Self::Storage(other),
        }
    }
}

/// Maps a [`ServiceError`] to an HTTP status code.
pub fn service_error_to_status_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::NotFound { .. } => 404,
        ServiceError::Conflict(_) => 409,
        ServiceError::Validation(_) => 400,
        ServiceError::Storage(inner) => repository_error_to_status_code(inner),
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
