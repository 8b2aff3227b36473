//! Audit trail of reporters who touched a record.

use crate::normalize::{display_name, normalize};
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of reporter names.
///
/// Entries keep first-seen order; two names are duplicates when their
/// normalized forms match. The first entry is the record's creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AuditTrail(Vec<String>);

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `reporter` unless an equivalent name is already present.
    ///
    /// Blank or absent reporters leave the trail untouched. Returns whether
    /// the trail changed.
    pub fn record_update(&mut self, reporter: Option<&str>) -> bool {
        let Some(name) = reporter.and_then(display_name) else {
            return false;
        };
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// First reporter ever recorded.
    pub fn creator(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn contains(&self, reporter: &str) -> bool {
        let key = normalize(reporter);
        self.0.iter().any(|entry| normalize(entry) == key)
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for AuditTrail {
    fn from(entries: Vec<String>) -> Self {
        // Stored data may predate deduplication.
        let mut trail = AuditTrail::new();
        for entry in &entries {
            trail.record_update(Some(entry));
        }
        trail
    }
}

impl From<AuditTrail> for Vec<String> {
    fn from(trail: AuditTrail) -> Self {
        trail.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_update_appends_new_reporters() {
        let mut trail = AuditTrail::new();
        assert!(trail.record_update(Some("Finwen")));
        assert!(trail.record_update(Some("  DommAARRAA ")));
        assert_eq!(trail.entries(), ["Finwen", "Dommaarraa"]);
        assert_eq!(trail.creator(), Some("Finwen"));
    }

    #[test]
    fn test_record_update_dedupes_by_normalized_form() {
        let mut trail = AuditTrail::new();
        trail.record_update(Some("Dommaarraa"));
        assert!(!trail.record_update(Some("  DommAARRAA ")));
        assert!(!trail.record_update(Some("dommaarraa")));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_record_update_ignores_absent_reporter() {
        let mut trail = AuditTrail::new();
        assert!(!trail.record_update(None));
        assert!(!trail.record_update(Some("   ")));
        assert!(trail.is_empty());
        assert_eq!(trail.creator(), None);
    }

    #[test]
    fn test_serde_roundtrip_is_a_plain_list() {
        let mut trail = AuditTrail::new();
        trail.record_update(Some("Finwen"));
        trail.record_update(Some("Marlon Blake"));
        let json = serde_json::to_value(&trail).unwrap();
        assert_eq!(json, serde_json::json!(["Finwen", "Marlon Blake"]));

        let back: AuditTrail =
            serde_json::from_value(serde_json::json!(["Finwen", "FINWEN", "Marlon Blake"]))
                .unwrap();
        assert_eq!(back.entries(), ["Finwen", "Marlon Blake"]);
    }
}
