//! Serde helpers for request deserialization.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating blank strings as None.
///
/// `?searchQuery=` and `"absenceReason": "  "` both mean "not provided".
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        value: Option<String>,
    }

    #[test]
    fn blank_string_becomes_none() {
        let probe: Probe = serde_json::from_str(r#"{"value": "   "}"#).unwrap();
        assert_eq!(probe.value, None);
    }

    #[test]
    fn missing_and_null_become_none() {
        let missing: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(missing.value, None);
        assert_eq!(null.value, None);
    }

    #[test]
    fn text_is_kept_verbatim() {
        let probe: Probe = serde_json::from_str(r#"{"value": " sick "}"#).unwrap();
        assert_eq!(probe.value, Some(" sick ".to_string()));
    }
}
