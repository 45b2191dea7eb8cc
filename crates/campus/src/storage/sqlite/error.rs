//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError` from
//! `campus_core::storage`. Constraint violations map to semantic variants:
//! UNIQUE/PRIMARY KEY to `AlreadyExists`, FOREIGN KEY to `InvalidData` on
//! writes and to `Referenced` on deletes.

use campus_core::storage::RepositoryError;

/// What the failing statement was doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Write,
    Delete,
}

fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code)
}

/// Maps a rusqlite error to a RepositoryError.
fn map_rusqlite_error(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: &str,
    op: Op,
) -> RepositoryError {
    if is_constraint(err, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
        || is_constraint(err, rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    {
        return RepositoryError::AlreadyExists {
            entity_type,
            id: id.to_string(),
        };
    }

    if is_constraint(err, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
        return match op {
            Op::Delete => RepositoryError::Referenced {
                entity_type,
                id: id.to_string(),
            },
            Op::Write => RepositoryError::InvalidData(format!(
                "{entity_type} {id} references a record that does not exist"
            )),
        };
    }

    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        },

        rusqlite::Error::FromSqlConversionFailure(..) => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
///
/// This is the main entry point for error mapping in async code.
pub fn map_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
    op: Op,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, &id.into(), op)
        }
        tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        tokio_rusqlite::Error::ConnectionClosed => {
            RepositoryError::ConnectionFailed("Connection closed".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn constraint(extended_code: i32) -> tokio_rusqlite::Error {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, None))
    }

    #[test]
    fn test_unique_constraint_maps_to_already_exists() {
        let result = map_error(
            constraint(ffi::SQLITE_CONSTRAINT_UNIQUE),
            "AttendanceRecord",
            "u-1",
            Op::Write,
        );

        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "AttendanceRecord",
                id: "u-1".to_string(),
            }
        );
    }

    #[test]
    fn test_foreign_key_depends_on_operation() {
        let write = map_error(
            constraint(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            "Address",
            "a-1",
            Op::Write,
        );
        assert!(matches!(write, RepositoryError::InvalidData(_)));

        let delete = map_error(
            constraint(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            "User",
            "u-1",
            Op::Delete,
        );
        assert!(matches!(
            delete,
            RepositoryError::Referenced {
                entity_type: "User",
                ..
            }
        ));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows);

        let result = map_error(err, "Term", "abc-123", Op::Write);

        assert_eq!(
            result,
            RepositoryError::NotFound {
                entity_type: "Term",
                id: "abc-123".to_string(),
            }
        );
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_error(err, "User", "u-1", Op::Write);

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
