//! Survey Test Utilities
//!
//! Shared test infrastructure for the survey workspace:
//! - Proptest generators for names, records and payloads
//! - Fixtures for the reporters and records used across test suites
//! - Assertions for error shapes and audit-trail invariants

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use survey_core::{Actor, Record, RecordId, RecordKind, SurveyError, SurveyResult};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for survey records.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = uuid::Uuid> {
        any::<[u8; 16]>().prop_map(uuid::Uuid::from_bytes)
    }

    pub fn arb_kind() -> impl Strategy<Value = RecordKind> {
        prop::sample::select(RecordKind::ALL.to_vec())
    }

    /// A system name such as `Sol` or `HIP 12345`.
    pub fn arb_system_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Sol".to_string()),
            Just("Achenar".to_string()),
            "[A-Z][a-z]{2,8}",
            "HIP [0-9]{3,6}",
        ]
    }

    /// A reporter name.
    pub fn arb_reporter() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Finwen".to_string()),
            Just("Dommaarraa".to_string()),
            Just("Marlon Blake".to_string()),
            "[A-Za-z]{3,10}( [A-Za-z]{3,10})?",
        ]
    }

    /// Same text with random padding and letter case.
    pub fn arb_variant(text: String) -> impl Strategy<Value = String> {
        (" {0,3}", " {0,3}", any::<bool>()).prop_map(move |(lead, trail, upper)| {
            let body = if upper {
                text.to_uppercase()
            } else {
                text.to_lowercase()
            };
            format!("{}{}{}", lead, body, trail)
        })
    }

    /// A timestamp within a few years of 2016.
    pub fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
        (1_420_070_400i64..1_577_836_800i64)
            .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now))
    }

    /// A sequence of reporters with frequent repeats.
    pub fn arb_reporter_sequence() -> impl Strategy<Value = Vec<Option<String>>> {
        prop::collection::vec(
            prop::option::weighted(0.85, arb_reporter().prop_flat_map(arb_variant)),
            0..20,
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;

    pub const FINWEN: &str = "Finwen";
    pub const DOMMAARRAA: &str = "Dommaarraa";
    pub const MARLON_BLAKE: &str = "Marlon Blake";

    pub fn finwen() -> Actor {
        Actor::contributor(FINWEN)
    }

    pub fn dommaarraa() -> Actor {
        Actor::contributor(DOMMAARRAA)
    }

    pub fn marlon_blake() -> Actor {
        Actor::contributor(MARLON_BLAKE)
    }

    pub fn admin() -> Actor {
        Actor::privileged(None)
    }

    pub fn star_payload(system: &str, star: Option<&str>) -> Value {
        json!({ "system": system, "star": star })
    }

    pub fn world_payload(system: &str, world: &str) -> Value {
        json!({ "system": system, "world": world, "terrain": "rocky" })
    }

    /// JSON:API survey document pointing at `world_id`.
    pub fn survey_document(world_id: RecordId, resource: &str) -> Value {
        json!({
            "data": {
                "type": "surveys",
                "attributes": { "resource": resource, "carbon": 2, "iron": 5 },
                "relationships": {
                    "world": { "data": { "type": "worlds", "id": world_id.to_string() } }
                }
            }
        })
    }

    /// Flat survey payload with a `world_id` attribute.
    pub fn survey_payload(world_id: RecordId, resource: &str) -> Value {
        json!({ "resource": resource, "world_id": world_id.to_string() })
    }

    /// A fixed instant: 2016-05-01 12:00:00 UTC.
    pub fn may_day_2016() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// An unsaved star with identity fields set.
    pub fn star_record(system: &str, star: Option<&str>, owner: &str) -> Record {
        let mut record = Record::new(RecordKind::Star, Utc::now());
        record.system = Some(system.to_string());
        record.body = star.map(str::to_string);
        record.owner = Some(owner.to_string());
        record
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for survey-specific invariants.

    use super::*;
    use survey_core::{normalize, AuthorizationError};

    /// Assert the result failed validation on `field`.
    pub fn assert_validation_on<T: std::fmt::Debug>(result: &SurveyResult<T>, field: &str) {
        match result {
            Err(SurveyError::Validation(errors)) => assert!(
                errors.iter().any(|e| e.field() == field),
                "Expected validation error on {}, got {:?}",
                field,
                errors
            ),
            other => panic!("Expected validation error on {}, got {:?}", field, other),
        }
    }

    pub fn assert_forbidden<T: std::fmt::Debug>(result: &SurveyResult<T>) {
        assert!(
            matches!(
                result,
                Err(SurveyError::Authorization(AuthorizationError::OwnershipMismatch { .. }))
            ),
            "Expected ownership mismatch, got {:?}",
            result
        );
    }

    pub fn assert_not_found<T: std::fmt::Debug>(result: &SurveyResult<T>) {
        assert!(
            matches!(result, Err(SurveyError::NotFound { .. })),
            "Expected not found, got {:?}",
            result
        );
    }

    /// Updaters hold no two names with the same normalized form, and the
    /// creator is the first of them.
    pub fn assert_audit_trail_consistent(record: &Record) {
        let keys: Vec<String> = record.updaters.entries().iter().map(|e| normalize(e)).collect();
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), keys.len(), "duplicate updaters: {:?}", record.updaters);
        assert_eq!(
            record.creator(),
            record.updaters.entries().first().map(String::as_str)
        );
    }
}

pub use assertions::*;
pub use fixtures::*;
pub use generators::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use survey_core::{normalize, AuditTrail};

    #[test]
    fn test_fixture_payloads() {
        let payload = star_payload("Sol", None);
        assert_eq!(payload["system"], "Sol");
        assert!(payload["star"].is_null());

        let world = survey_core::new_record_id();
        let attrs =
            survey_core::normalize_payload(RecordKind::Survey, &survey_document(world, "Iron"));
        assert_eq!(attrs.get("world_id"), Some(&json!(world.to_string())));
    }

    #[test]
    fn test_star_record_has_identity() {
        let record = star_record("Sol", Some("A"), FINWEN);
        assert!(record.identity_key().is_some());
    }

    proptest! {
        #[test]
        fn prop_variant_normalizes_equal(
            name in arb_system_name().prop_flat_map(|n| (Just(n.clone()), arb_variant(n)))
        ) {
            prop_assert_eq!(normalize(&name.0), normalize(&name.1));
        }

        #[test]
        fn prop_reporter_sequences_keep_trail_consistent(reporters in arb_reporter_sequence()) {
            let mut record = Record::new(RecordKind::Star, Utc::now());
            record.updaters = AuditTrail::new();
            for reporter in &reporters {
                record.updaters.record_update(reporter.as_deref());
            }
            assert_audit_trail_consistent(&record);
        }
    }
}
