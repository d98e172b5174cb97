//! Structural deduplication of list fields in an extracted analysis.
//!
//! Models frequently repeat bullets. Within each target field, an element is
//! identified by the SHA-256 of its canonical JSON text (object keys sorted at
//! every depth); later elements with an identity already seen are dropped.

use std::collections::HashSet;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::analysis::extract::ParsedResult;

/// Fields whose array values are deduplicated. Everything else passes through.
pub const DEDUPE_TARGET_FIELDS: &[&str] =
    &["keyPoints", "recommendations", "mitreInfo", "knownBreaches"];

/// Deduplicates the default target fields.
pub fn dedupe(result: ParsedResult) -> ParsedResult {
    dedupe_fields(result, DEDUPE_TARGET_FIELDS)
}

/// Deduplicates the array values of `fields`. Missing keys and non-array
/// values are left untouched.
pub fn dedupe_fields(mut result: ParsedResult, fields: &[&str]) -> ParsedResult {
    for field in fields {
        if let Some(Value::Array(items)) = result.get_mut(*field) {
            let before = items.len();
            dedupe_items(items);
            if items.len() != before {
                tracing::debug!(field, removed = before - items.len(), "Removed duplicate entries");
            }
        }
    }
    result
}

fn dedupe_items(items: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(identity(item)));
}

/// SHA-256 hex digest of the element's canonical JSON text.
fn identity(value: &Value) -> String {
    let source =
        serde_json::to_string(&canonicalize(value)).unwrap_or_else(|_| value.to_string());

    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Rebuilds `value` with object keys inserted in sorted order, so the
/// serialized text does not depend on the map's iteration order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ParsedResult {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let input = object(json!({"mitreInfo": [{"a": 1}, {"a": 1}, {"a": 2}]}));
        let out = dedupe(input);
        assert_eq!(out["mitreInfo"], json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn test_string_duplicates_removed() {
        let input = object(json!({"keyPoints": ["b", "a", "b", "c", "a"]}));
        assert_eq!(dedupe(input)["keyPoints"], json!(["b", "a", "c"]));
    }

    #[test]
    fn test_key_order_does_not_affect_identity() {
        let first: Value = serde_json::from_str(r#"{"id": "T1059", "name": "Scripting"}"#).unwrap();
        let second: Value = serde_json::from_str(r#"{"name": "Scripting", "id": "T1059"}"#).unwrap();
        assert_eq!(identity(&first), identity(&second));

        let input = object(json!({"recommendations": [first, second]}));
        assert_eq!(dedupe(input)["recommendations"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_nested_key_order_does_not_affect_identity() {
        let first = json!({"outer": {"b": 1, "a": [{"y": 2, "x": 1}]}});
        let second: Value =
            serde_json::from_str(r#"{"outer": {"a": [{"x": 1, "y": 2}], "b": 1}}"#).unwrap();
        assert_eq!(identity(&first), identity(&second));
    }

    #[test]
    fn test_structurally_different_values_kept() {
        let input = object(json!({"knownBreaches": [1, "1", 1.5, null, [1], {"1": 1}]}));
        assert_eq!(dedupe(input)["knownBreaches"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_non_array_target_is_untouched() {
        let input = object(json!({"keyPoints": "not a list", "recommendations": {"a": 1}}));
        let out = dedupe(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_non_target_fields_untouched() {
        let input = object(json!({"other": ["x", "x"], "keyPoints": ["x", "x"]}));
        let out = dedupe(input);
        assert_eq!(out["other"], json!(["x", "x"]));
        assert_eq!(out["keyPoints"], json!(["x"]));
    }

    #[test]
    fn test_missing_targets_is_noop() {
        let input = object(json!({"summary": "ok"}));
        assert_eq!(dedupe(input.clone()), input);
    }

    #[test]
    fn test_idempotent() {
        let input = object(json!({
            "keyPoints": ["a", "b", "a"],
            "recommendations": [{"step": 1}, {"step": 1}],
            "mitreInfo": [],
            "knownBreaches": "none",
            "summary": "s"
        }));
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_field_set() {
        let input = object(json!({"tags": ["x", "x"], "keyPoints": ["y", "y"]}));
        let out = dedupe_fields(input, &["tags"]);
        assert_eq!(out["tags"], json!(["x"]));
        assert_eq!(out["keyPoints"], json!(["y", "y"]));
    }

    #[test]
    fn test_identity_is_sha256_hex() {
        let id = identity(&json!("a"));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
