//! Serializing domain values to and from cache bytes.
//!
//! Values are stored as JSON so cache contents stay readable from
//! `redis-cli` while debugging.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Serializes any value to JSON bytes.
pub fn serialize_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(value).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes into a value.
pub fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school::{AttendanceRecord, AttendanceStatus};
    use crate::storage::Page;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn sample_record() -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_opt(7, 55, 0)
            .unwrap();
        let mut record = AttendanceRecord::new(Uuid::nil(), date, AttendanceStatus::Late);
        record.created_at = Utc.with_ymd_and_hms(2024, 9, 2, 7, 55, 0).unwrap();
        record.updated_at = record.created_at;
        record
    }

    #[test]
    fn test_cached_page_keeps_total() {
        let page = Page {
            items: vec![sample_record()],
            total: 31,
        };

        let bytes = serialize_value(&page).expect("serialize should succeed");
        let restored: Page<AttendanceRecord> =
            deserialize_value(&bytes).expect("deserialize should succeed");

        assert_eq!(restored, page);
    }

    #[test]
    fn test_deserialize_wrong_shape_fails() {
        let bytes = serialize_value(&sample_record()).unwrap();
        let result: Result<Page<AttendanceRecord>, _> = deserialize_value(&bytes);

        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result: Result<AttendanceRecord, _> = deserialize_value(b"not json");
        assert!(result.is_err());
    }
}
