//! Relationship normalizer.
//!
//! Reduces nested relationship references to plain `<name>_id` attributes.
//! Accepted payload shapes:
//!
//! ```text
//! {"data": {"attributes": {..}, "relationships": {"world": {"data": {"type": "worlds", "id": ".."}}}}}
//! {"attributes": {..}, "relationships": {..}}
//! {"resource": "Iron", "world": {"type": "worlds", "id": ".."}}
//! ```
//!
//! A reference with an unknown name, a wrong `type`, a non-UUID id or an
//! unexpected shape is dropped. Whether a mandatory association ended up
//! missing is for record validation to decide.

use crate::identity::{parse_record_id, RecordId};
use crate::record::{Attributes, RecordKind, RefField};
use serde_json::Value;

/// Flatten a request payload into a plain attribute set for `kind`.
///
/// Non-object payloads yield an empty set.
pub fn normalize_payload(kind: RecordKind, payload: &Value) -> Attributes {
    let Some(mut body) = payload.as_object() else {
        return Attributes::new();
    };
    if let Some(inner) = body.get("data").and_then(Value::as_object) {
        body = inner;
    }

    let mut attrs = Attributes::new();
    let mut references = Vec::new();

    match body.get("attributes") {
        Some(Value::Object(flat)) => collect_flat(kind, flat, &mut attrs, &mut references),
        Some(_) => {}
        None => collect_flat(kind, body, &mut attrs, &mut references),
    }

    if let Some(relationships) = body.get("relationships").and_then(Value::as_object) {
        for (name, value) in relationships {
            if let Some(field) = reference_field(kind, name) {
                references.push((field, resolve(field, value)));
            }
        }
    }

    // Later entries win, so `relationships` overrides references found among
    // the attributes.
    for (field, id) in references {
        if let Some(id) = id {
            attrs.insert(field.attribute().to_string(), Value::String(id.to_string()));
        }
    }
    attrs
}

fn collect_flat(
    kind: RecordKind,
    source: &Attributes,
    attrs: &mut Attributes,
    references: &mut Vec<(RefField, Option<RecordId>)>,
) {
    for (name, value) in source {
        if name == "relationships" || name == "type" {
            continue;
        }
        if value.is_object() {
            if let Some(field) = reference_field(kind, name) {
                references.push((field, resolve(field, value)));
            }
            // Nested objects are only meaningful as references.
            continue;
        }
        attrs.insert(name.clone(), value.clone());
    }
}

fn reference_field(kind: RecordKind, name: &str) -> Option<RefField> {
    kind.reference_fields()
        .iter()
        .copied()
        .find(|field| field.relationship() == name)
}

/// Resolve one reference object, with or without a `data` wrapper.
fn resolve(field: RefField, value: &Value) -> Option<RecordId> {
    let object = value.as_object()?;
    let linkage = match object.get("data") {
        Some(data) => data.as_object()?,
        None => object,
    };

    if let Some(kind) = linkage.get("type") {
        let kind = kind.as_str()?;
        let expected = field.target_type();
        if kind != expected && Some(kind) != expected.strip_suffix('s') {
            return None;
        }
    }

    match linkage.get("id")? {
        Value::String(raw) => parse_record_id(raw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::new_record_id;
    use serde_json::json;

    #[test]
    fn test_jsonapi_document_with_relationships() {
        let world = new_record_id();
        let payload = json!({
            "data": {
                "type": "surveys",
                "attributes": {"resource": "Iron", "carbon": 3},
                "relationships": {
                    "world": {"data": {"type": "worlds", "id": world.to_string()}}
                }
            }
        });
        let attrs = normalize_payload(RecordKind::Survey, &payload);
        assert_eq!(attrs.get("resource"), Some(&json!("Iron")));
        assert_eq!(attrs.get("carbon"), Some(&json!(3)));
        assert_eq!(attrs.get("world_id"), Some(&json!(world.to_string())));
        assert!(!attrs.contains_key("relationships"));
        assert!(!attrs.contains_key("world"));
    }

    #[test]
    fn test_flat_reference_object_without_data_wrapper() {
        let basecamp = new_record_id();
        let payload = json!({
            "resource": "Iron",
            "basecamp": {"type": "basecamps", "id": basecamp.to_string()},
        });
        let attrs = normalize_payload(RecordKind::Survey, &payload);
        assert_eq!(attrs.get("basecamp_id"), Some(&json!(basecamp.to_string())));
        assert!(!attrs.contains_key("basecamp"));
    }

    #[test]
    fn test_malformed_references_are_absent() {
        let payload = json!({
            "relationships": {
                "world": {"data": {"type": "stars", "id": new_record_id().to_string()}},
                "basecamp": {"data": {"type": "basecamps", "id": "camp-7"}},
                "system": {"data": null},
                "galaxy": {"data": {"type": "galaxies", "id": new_record_id().to_string()}},
            }
        });
        let attrs = normalize_payload(RecordKind::Survey, &payload);
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_relationship_overrides_flat_foreign_key() {
        let stale = new_record_id();
        let fresh = new_record_id();
        let payload = json!({
            "attributes": {"world_id": stale.to_string()},
            "relationships": {"world": {"data": {"type": "world", "id": fresh.to_string()}}}
        });
        let attrs = normalize_payload(RecordKind::Survey, &payload);
        assert_eq!(attrs.get("world_id"), Some(&json!(fresh.to_string())));
    }

    #[test]
    fn test_world_keeps_text_system_and_reads_system_reference() {
        let system = new_record_id();
        let payload = json!({
            "system": "Sol",
            "world": "Earth",
            "relationships": {"system": {"type": "systems", "id": system.to_string()}}
        });
        let attrs = normalize_payload(RecordKind::World, &payload);
        assert_eq!(attrs.get("system"), Some(&json!("Sol")));
        assert_eq!(attrs.get("world"), Some(&json!("Earth")));
        assert_eq!(attrs.get("system_id"), Some(&json!(system.to_string())));
    }

    #[test]
    fn test_non_object_payload_is_empty() {
        assert!(normalize_payload(RecordKind::Star, &json!([1, 2])).is_empty());
        assert!(normalize_payload(RecordKind::Star, &Value::Null).is_empty());
    }
}
