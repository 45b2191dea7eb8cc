use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} is still referenced: {id}")]
    Referenced {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "AttendanceRecord",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "AttendanceRecord not found: abc-123");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "User",
            id: "jdoe".to_string(),
        };
        assert_eq!(error.to_string(), "User already exists: jdoe");
    }

    #[test]
    fn test_repository_error_referenced_display() {
        let error = RepositoryError::Referenced {
            entity_type: "User",
            id: "u-1".to_string(),
        };
        assert_eq!(error.to_string(), "User is still referenced: u-1");
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("unknown status LATEISH".to_string());
        assert_eq!(error.to_string(), "Invalid data: unknown status LATEISH");
    }
}
