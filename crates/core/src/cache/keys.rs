//! Cache key derivation.
//!
//! Single records live under `"{entity}:{id}"`. Query results live under
//! `"{scope}:q:{normalized query}"`, where the scope names the owning parent
//! (e.g. `"attendance:user:{id}"`). Writes clear the whole scope of the
//! owner they touch, see [`crate::cache::Cache::clear_scope`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::SerializationError;

const QUERY_SEPARATOR: &str = ":q:";

/// Returns the cache key for a single attendance record.
pub fn attendance_key(id: Uuid) -> String {
    format!("attendance:{}", id)
}

/// Returns the cache key for a single health-and-safety record.
pub fn health_safety_key(id: Uuid) -> String {
    format!("health-safety:{}", id)
}

/// Returns the cache key for a single disciplinary action.
pub fn disciplinary_action_key(id: Uuid) -> String {
    format!("disciplinary-action:{}", id)
}

/// Returns the cache key for a single student behavior record.
pub fn student_behavior_key(id: Uuid) -> String {
    format!("student-behavior:{}", id)
}

/// Returns the cache key for a single term.
pub fn term_key(id: Uuid) -> String {
    format!("term:{}", id)
}

/// Returns the cache key for a single address.
pub fn address_key(id: Uuid) -> String {
    format!("address:{}", id)
}

/// Returns the cache key for a user.
pub fn user_key(id: Uuid) -> String {
    format!("user:{}", id)
}

/// Scope of every attendance list query owned by a user.
pub fn user_attendance_scope(user_id: Uuid) -> String {
    format!("attendance:user:{}", user_id)
}

/// Scope of every health-and-safety list query owned by a user.
pub fn user_health_safety_scope(user_id: Uuid) -> String {
    format!("health-safety:user:{}", user_id)
}

/// Scope of every address list query owned by a user.
pub fn user_address_scope(user_id: Uuid) -> String {
    format!("address:user:{}", user_id)
}

/// Scope of every disciplinary action list query owned by a student.
pub fn student_disciplinary_actions_scope(student_id: Uuid) -> String {
    format!("disciplinary-action:student:{}", student_id)
}

/// Scope of every behavior list query owned by a student.
pub fn student_behaviors_scope(student_id: Uuid) -> String {
    format!("student-behavior:student:{}", student_id)
}

/// Scope of the term list queries. Terms have no owner.
pub fn terms_scope() -> String {
    "term:all".to_string()
}

/// Returns the key under which a scope's list keys are tracked.
///
/// Redis keeps a set of list keys per scope here so clearing a scope never
/// needs `SCAN`.
pub fn scope_tracking_key(scope: &str) -> String {
    format!("{}:_keys", scope)
}

/// Renders query parameters into a canonical string.
///
/// Parameters are sorted by name, null values are dropped, and `%`, `&` and
/// `=` are percent-escaped so distinct queries can never collide. Two query
/// objects with the same non-null parameters produce byte-identical output
/// regardless of field or insertion order.
///
/// # Errors
///
/// Returns an error if the query does not serialize to a JSON object.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use campus_core::cache::normalize_query;
///
/// let mut query = HashMap::new();
/// query.insert("page", Some("2"));
/// query.insert("limit", Some("10"));
/// query.insert("searchQuery", None);
///
/// assert_eq!(normalize_query(&query).unwrap(), "limit=10&page=2");
/// ```
pub fn normalize_query<Q: Serialize + ?Sized>(query: &Q) -> Result<String, SerializationError> {
    let value = serde_json::to_value(query)
        .map_err(|e| SerializationError::SerializeFailed(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(SerializationError::SerializeFailed(
            "query parameters must serialize to an object".to_string(),
        ));
    };

    let sorted: BTreeMap<String, Value> = map.into_iter().filter(|(_, v)| !v.is_null()).collect();

    let pairs: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", escape(name), escape(&render(value))))
        .collect();

    Ok(pairs.join("&"))
}

/// Returns the cache key for a list query within a scope.
///
/// # Examples
///
/// ```
/// use campus_core::cache::list_key;
/// use serde_json::json;
///
/// let a = list_key("attendance:user:42", &json!({"page": 1, "limit": 10})).unwrap();
/// let b = list_key("attendance:user:42", &json!({"limit": 10, "page": 1, "q": null})).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, "attendance:user:42:q:limit=10&page=1");
/// ```
pub fn list_key<Q: Serialize + ?Sized>(scope: &str, query: &Q) -> Result<String, SerializationError> {
    Ok(format!("{}{}{}", scope, QUERY_SEPARATOR, normalize_query(query)?))
}

/// Extracts the scope from a list key. Returns `None` for single-record keys.
///
/// ```
/// use campus_core::cache::list_scope_of_key;
///
/// assert_eq!(list_scope_of_key("term:all:q:page=1"), Some("term:all"));
/// assert_eq!(list_scope_of_key("term:123"), None);
/// ```
pub fn list_scope_of_key(key: &str) -> Option<&str> {
    key.find(QUERY_SEPARATOR).map(|idx| &key[..idx])
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde::Serialize;
    use serde_json::json;

    fn test_uuid() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn test_entity_keys() {
        assert_eq!(
            attendance_key(test_uuid()),
            "attendance:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            student_behavior_key(test_uuid()),
            "student-behavior:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            user_key(test_uuid()),
            "user:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_scopes() {
        assert_eq!(
            user_attendance_scope(test_uuid()),
            "attendance:user:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            student_disciplinary_actions_scope(test_uuid()),
            "disciplinary-action:student:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(terms_scope(), "term:all");
    }

    #[test]
    fn test_normalize_sorts_and_drops_nulls() {
        let query = json!({"searchQuery": null, "page": 2, "limit": 10, "fetchAll": false});
        assert_eq!(
            normalize_query(&query).unwrap(),
            "fetchAll=false&limit=10&page=2"
        );
    }

    #[test]
    fn test_normalize_is_stable_under_permutation() {
        let params = [
            ("page", "3"),
            ("limit", "25"),
            ("searchQuery", "late"),
            ("fetchAll", "false"),
        ];

        let forward: HashMap<&str, &str> = params.iter().copied().collect();
        let backward: HashMap<&str, &str> = params.iter().rev().copied().collect();

        let mut rotated = HashMap::new();
        for i in 0..params.len() {
            let (k, v) = params[(i + 2) % params.len()];
            rotated.insert(k, v);
        }

        let expected = normalize_query(&forward).unwrap();
        assert_eq!(normalize_query(&backward).unwrap(), expected);
        assert_eq!(normalize_query(&rotated).unwrap(), expected);
        assert_eq!(
            expected,
            "fetchAll=false&limit=25&page=3&searchQuery=late"
        );
    }

    #[test]
    fn test_struct_and_map_with_same_fields_share_a_key() {
        #[derive(Serialize)]
        struct Query {
            limit: u32,
            page: u32,
            search: Option<String>,
        }

        let typed = Query {
            limit: 10,
            page: 1,
            search: None,
        };
        let untyped = json!({"page": 1, "limit": 10});

        assert_eq!(
            list_key("term:all", &typed).unwrap(),
            list_key("term:all", &untyped).unwrap()
        );
    }

    #[test]
    fn test_normalize_escapes_separators() {
        let smuggled = json!({"a": "1&b=2"});
        let split = json!({"a": "1", "b": "2"});
        assert_ne!(
            normalize_query(&smuggled).unwrap(),
            normalize_query(&split).unwrap()
        );
        assert_eq!(normalize_query(&smuggled).unwrap(), "a=1%26b%3D2");
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert!(normalize_query(&json!([1, 2, 3])).is_err());
        assert!(normalize_query(&"page=1").is_err());
    }

    #[test]
    fn test_empty_query() {
        let empty: HashMap<String, String> = HashMap::new();
        assert_eq!(
            list_key("term:all", &empty).unwrap(),
            "term:all:q:"
        );
    }

    #[test]
    fn test_list_scope_extraction() {
        let scope = user_health_safety_scope(test_uuid());
        let key = list_key(&scope, &json!({"page": 1})).unwrap();

        assert_eq!(list_scope_of_key(&key), Some(scope.as_str()));
        assert_eq!(list_scope_of_key(&health_safety_key(test_uuid())), None);
        assert_eq!(list_scope_of_key("term:all:q:"), Some("term:all"));
    }

    #[test]
    fn test_scope_tracking_key() {
        assert_eq!(scope_tracking_key("term:all"), "term:all:_keys");
    }
}
