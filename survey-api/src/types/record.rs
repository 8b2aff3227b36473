//! Record response type.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use survey_core::{Attributes, Record, RecordId, RecordKind, Timestamp};

/// A star, world or survey as returned by the API.
///
/// Identity, owner and reference fields appear under their kind-specific
/// names (`star` or `world`, `updater` or `commander`, `world_id`, ...)
/// alongside every domain attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: RecordId,
    pub kind: RecordKind,
    /// Named fields and domain attributes
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub fields: Attributes,
    /// Contributors in first-contribution order
    pub updaters: Vec<String>,
    pub creator: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl From<&Record> for RecordResponse {
    fn from(record: &Record) -> Self {
        let kind = record.kind;
        let mut fields = record.attributes.clone();

        for field in kind.text_fields() {
            let value = record
                .text(*field)
                .map(|text| JsonValue::String(text.to_string()))
                .unwrap_or(JsonValue::Null);
            fields.insert(field.attribute(kind).to_string(), value);
        }
        for field in kind.reference_fields() {
            let value = record
                .reference(*field)
                .map(|id| JsonValue::String(id.to_string()))
                .unwrap_or(JsonValue::Null);
            fields.insert(field.attribute().to_string(), value);
        }

        Self {
            id: record.id,
            kind,
            fields,
            updaters: record.updaters.entries().to_vec(),
            creator: record.creator().map(str::to_string),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self::from(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_survey_uses_kind_specific_names() {
        let mut record = Record::new(RecordKind::Survey, Utc::now());
        let world = survey_core::new_record_id();
        record.world_id = Some(world);
        record.owner = Some("Finwen".to_string());
        record.resource = Some("Iron".to_string());
        record.attributes.insert("carbon".to_string(), json!(3));
        record.updaters.record_update(Some("Finwen"));

        let json = serde_json::to_value(RecordResponse::from(&record)).unwrap();
        assert_eq!(json["kind"], "survey");
        assert_eq!(json["commander"], "Finwen");
        assert_eq!(json["resource"], "Iron");
        assert_eq!(json["world_id"], world.to_string());
        assert_eq!(json["basecamp_id"], JsonValue::Null);
        assert_eq!(json["carbon"], 3);
        assert_eq!(json["creator"], "Finwen");
        assert_eq!(json["updaters"], json!(["Finwen"]));
        assert!(json.get("owner").is_none());
    }

    #[test]
    fn test_star_uses_star_and_updater() {
        let mut record = Record::new(RecordKind::Star, Utc::now());
        record.system = Some("Sol".to_string());
        record.owner = Some("Dommaarraa".to_string());

        let json = serde_json::to_value(RecordResponse::from(record)).unwrap();
        assert_eq!(json["system"], "Sol");
        assert_eq!(json["star"], JsonValue::Null);
        assert_eq!(json["updater"], "Dommaarraa");
        assert_eq!(json["creator"], JsonValue::Null);
        assert!(json.get("world_id").is_none());
    }
}
