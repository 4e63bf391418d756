//! Field-mapping normalizer. Rewrites a partner payload into the canonical shape.
//!
//! Pure transformation: raw text + ordered [`FieldMapping`] rules in, canonical
//! JSON or a [`NormalizeError`] out. No I/O.
//!
//! Rules per object:
//! - a present source field is copied under its target name, in rule order
//!   (a later rule targeting the same field overwrites the earlier value);
//! - an absent required source field aborts the whole payload;
//! - an empty result falls back to the original, unmapped object.
//!
//! Arrays apply the rule set to each object element independently; non-object
//! elements pass through unchanged. With no rules the validated payload is
//! returned as-is.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use tms_core::{FieldMapping, NormalizeError};

/// Parse and normalize a raw partner payload.
pub fn normalize(raw: &str, mappings: &[FieldMapping]) -> Result<Value, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::MalformedPayload("Empty or null data received".to_string()));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| NormalizeError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    normalize_value(value, mappings)
}

/// Normalize an already-parsed payload.
pub fn normalize_value(value: Value, mappings: &[FieldMapping]) -> Result<Value, NormalizeError> {
    validate(&value)?;

    if mappings.is_empty() {
        debug!("no field mappings configured, returning validated raw payload");
        return Ok(value);
    }

    match value {
        Value::Array(items) => {
            let mut normalized = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(object) => normalized.push(Value::Object(normalize_object(object, mappings)?)),
                    other => normalized.push(other),
                }
            }
            Ok(Value::Array(normalized))
        }
        Value::Object(object) => Ok(Value::Object(normalize_object(object, mappings)?)),
        // validate() only lets objects and arrays through
        other => Ok(other),
    }
}

/// Reject empty, null, and scalar payloads.
fn validate(value: &Value) -> Result<(), NormalizeError> {
    match value {
        Value::Null => Err(NormalizeError::MalformedPayload("Empty or null data received".to_string())),
        Value::Object(map) if map.is_empty() => {
            Err(NormalizeError::MalformedPayload("Empty or null data received".to_string()))
        }
        Value::Array(items) if items.is_empty() => {
            Err(NormalizeError::MalformedPayload("Empty or null data received".to_string()))
        }
        Value::Object(_) | Value::Array(_) => Ok(()),
        _ => Err(NormalizeError::MalformedPayload(
            "Invalid data format - expected JSON object or array".to_string(),
        )),
    }
}

fn normalize_object(
    raw: Map<String, Value>,
    mappings: &[FieldMapping],
) -> Result<Map<String, Value>, NormalizeError> {
    let mut normalized = Map::new();

    for mapping in mappings {
        match raw.get(&mapping.source_field) {
            Some(value) => {
                normalized.insert(mapping.target_field.clone(), value.clone());
            }
            None if mapping.required => {
                return Err(NormalizeError::RequiredFieldMissing {
                    field: mapping.source_field.clone(),
                    entity_type: mapping.entity_type,
                    partner_id: mapping.partner_id.clone(),
                });
            }
            None => {}
        }
    }

    // TODO: surface this fallback as a metric once product decides whether a
    // non-matching rule set should fail the attempt instead.
    if normalized.is_empty() {
        if let Some(rule) = mappings.first() {
            warn!(
                partner_id = %rule.partner_id,
                entity_type = %rule.entity_type,
                "no fields were mapped, keeping original data"
            );
        }
        return Ok(raw);
    }

    Ok(normalized)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tms_core::EntityType;

    fn rule(source: &str, target: &str, required: bool) -> FieldMapping {
        FieldMapping {
            partner_id: "P1".to_string(),
            entity_type: EntityType::Theatre,
            source_field: source.to_string(),
            target_field: target.to_string(),
            required,
        }
    }

    fn theatre_rules() -> Vec<FieldMapping> {
        vec![rule("theater_id", "id", true), rule("theater_name", "name", true)]
    }

    #[test]
    fn test_maps_object_fields() {
        let out = normalize(r#"{"theater_id":"T1","theater_name":"Forum"}"#, &theatre_rules()).unwrap();
        assert_eq!(out, json!({"id": "T1", "name": "Forum"}));
    }

    #[test]
    fn test_output_follows_rule_order() {
        let rules = vec![rule("b", "second", false), rule("a", "first", false)];
        let out = normalize(r#"{"a":1,"b":2}"#, &rules).unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["second", "first"]);
    }

    #[test]
    fn test_unmapped_fields_are_dropped() {
        let out = normalize(
            r#"{"theater_id":"T1","theater_name":"Forum","theater_city":"Bangalore"}"#,
            &theatre_rules(),
        )
        .unwrap();
        assert!(out.get("theater_city").is_none());
        assert_eq!(out.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = normalize(r#"{"theater_name":"Forum"}"#, &theatre_rules()).unwrap_err();
        match err {
            NormalizeError::RequiredFieldMissing { field, entity_type, partner_id } => {
                assert_eq!(field, "theater_id");
                assert_eq!(entity_type, EntityType::Theatre);
                assert_eq!(partner_id, "P1");
            }
            other => panic!("expected RequiredFieldMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_optional_field_is_skipped() {
        let rules = vec![rule("theater_id", "id", true), rule("theater_city", "city", false)];
        let out = normalize(r#"{"theater_id":"T1"}"#, &rules).unwrap();
        assert_eq!(out, json!({"id": "T1"}));
    }

    #[test]
    fn test_null_valued_source_field_counts_as_present() {
        let rules = vec![rule("theater_id", "id", true)];
        let out = normalize(r#"{"theater_id":null}"#, &rules).unwrap();
        assert_eq!(out, json!({"id": null}));
    }

    #[test]
    fn test_empty_mappings_pass_through_object() {
        let raw = r#"{"theater_id":"T1","extra":[1,2]}"#;
        let out = normalize(raw, &[]).unwrap();
        assert_eq!(out, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_empty_mappings_pass_through_array() {
        let raw = r#"[{"a":1},2,"x"]"#;
        let out = normalize(raw, &[]).unwrap();
        assert_eq!(out, json!([{"a": 1}, 2, "x"]));
    }

    #[test]
    fn test_array_elements_mapped_independently() {
        let raw = r#"[
            {"theater_id":"T1","theater_name":"Forum"},
            "not-an-object",
            {"theater_id":"T2","theater_name":"Garuda"}
        ]"#;
        let out = normalize(raw, &theatre_rules()).unwrap();
        assert_eq!(
            out,
            json!([
                {"id": "T1", "name": "Forum"},
                "not-an-object",
                {"id": "T2", "name": "Garuda"}
            ])
        );
    }

    #[test]
    fn test_array_with_one_bad_element_fails_whole_payload() {
        let raw = r#"[{"theater_id":"T1","theater_name":"Forum"},{"theater_name":"Garuda"}]"#;
        let err = normalize(raw, &theatre_rules()).unwrap_err();
        assert!(matches!(err, NormalizeError::RequiredFieldMissing { ref field, .. } if field == "theater_id"));
    }

    #[test]
    fn test_no_match_falls_back_to_original_object() {
        let rules = vec![rule("cinema_id", "id", false)];
        let raw = r#"{"theatres":[{"theater_id":"T1"}]}"#;
        let out = normalize(raw, &rules).unwrap();
        assert_eq!(out, json!({"theatres": [{"theater_id": "T1"}]}));
    }

    #[test]
    fn test_duplicate_target_last_rule_wins() {
        let rules = vec![rule("short_name", "name", false), rule("full_name", "name", false)];
        let out = normalize(r#"{"short_name":"Forum","full_name":"INOX Forum Mall"}"#, &rules).unwrap();
        assert_eq!(out, json!({"name": "INOX Forum Mall"}));
    }

    #[test]
    fn test_duplicate_target_keeps_first_position() {
        let rules = vec![
            rule("a", "x", false),
            rule("b", "y", false),
            rule("c", "x", false),
        ];
        let out = normalize(r#"{"a":1,"b":2,"c":3}"#, &rules).unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(out["x"], 3);
    }

    #[test]
    fn test_rejects_empty_text() {
        assert!(matches!(normalize("", &theatre_rules()), Err(NormalizeError::MalformedPayload(_))));
        assert!(matches!(normalize("   ", &[]), Err(NormalizeError::MalformedPayload(_))));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = normalize("{not json", &[]).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_rejects_empty_containers_and_null() {
        for raw in ["{}", "[]", "null"] {
            assert!(
                matches!(normalize(raw, &[]), Err(NormalizeError::MalformedPayload(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_scalars() {
        for raw in ["42", "\"text\"", "true"] {
            let err = normalize(raw, &theatre_rules()).unwrap_err();
            assert!(err.to_string().contains("expected JSON object or array"), "{}", raw);
        }
    }

    #[test]
    fn test_complete_object_never_reports_missing_field() {
        let rules = vec![
            rule("theater_id", "id", true),
            rule("theater_name", "name", true),
            rule("theater_city", "city", true),
            rule("theater_address", "address", false),
        ];
        let raw = json!({
            "theater_id": "INOX_BLR_FORUM",
            "theater_name": "INOX Forum Mall",
            "theater_city": "Bangalore"
        });
        let out = normalize_value(raw, &rules).unwrap();
        assert_eq!(out.as_object().unwrap().len(), 3);
    }
}
