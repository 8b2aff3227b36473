//! Filter pipeline for record listings.
//!
//! Raw query parameters are turned into a set of independent clauses that
//! compose with logical AND. Parsing is lenient: a recognized filter whose
//! value is blank or malformed contributes no clause at all, so the listing
//! behaves exactly as if the parameter had been omitted.

use crate::identity::{parse_record_id, RecordId, Timestamp};
use crate::normalize::normalize;
use crate::record::{Record, RecordKind, RefField, TextField};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

/// What a recognized filter name constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Text(TextField),
    Reference(RefField),
    UpdatedBefore,
    UpdatedAfter,
}

/// Map a query parameter name to its clause kind for `kind`.
///
/// Unrecognized names (including pagination and sort parameters) return `None`.
pub fn recognize(kind: RecordKind, name: &str) -> Option<ClauseKind> {
    let clause = match (kind, name) {
        (_, "updated_before") => ClauseKind::UpdatedBefore,
        (_, "updated_after") => ClauseKind::UpdatedAfter,
        (_, "updater" | "commander") => ClauseKind::Text(TextField::Owner),
        (RecordKind::Star | RecordKind::World, "system") => ClauseKind::Text(TextField::System),
        (RecordKind::Star, "star" | "body") => ClauseKind::Text(TextField::Body),
        (RecordKind::World, "world" | "body") => ClauseKind::Text(TextField::Body),
        (RecordKind::World | RecordKind::Survey, "system_id") => {
            ClauseKind::Reference(RefField::System)
        }
        (RecordKind::Survey, "resource") => ClauseKind::Text(TextField::Resource),
        (RecordKind::Survey, "world_id") => ClauseKind::Reference(RefField::World),
        (RecordKind::Survey, "basecamp_id") => ClauseKind::Reference(RefField::Basecamp),
        _ => return None,
    };
    Some(clause)
}

/// One predicate over a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    /// Normalized text equality; `key` is already normalized.
    TextEquals { field: TextField, key: String },
    RefEquals { field: RefField, id: RecordId },
    /// Strict: `updated_at < bound`.
    UpdatedBefore(Timestamp),
    /// Strict: `updated_at > bound`.
    UpdatedAfter(Timestamp),
}

impl FilterClause {
    /// Build a clause from a raw value, or `None` when the value is unusable.
    pub fn parse(clause: ClauseKind, raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match clause {
            ClauseKind::Text(field) => Some(FilterClause::TextEquals {
                field,
                key: normalize(raw),
            }),
            ClauseKind::Reference(field) => {
                parse_record_id(raw).map(|id| FilterClause::RefEquals { field, id })
            }
            ClauseKind::UpdatedBefore => parse_timestamp(raw).map(FilterClause::UpdatedBefore),
            ClauseKind::UpdatedAfter => parse_timestamp(raw).map(FilterClause::UpdatedAfter),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FilterClause::TextEquals { field, key } => {
                normalize(record.text(*field).unwrap_or_default()) == *key
            }
            FilterClause::RefEquals { field, id } => record.reference(*field) == Some(*id),
            FilterClause::UpdatedBefore(bound) => record.updated_at < *bound,
            FilterClause::UpdatedAfter(bound) => record.updated_at > *bound,
        }
    }
}

/// Accepted calendar timestamp formats. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Composed filter for one record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    kind: RecordKind,
    clauses: Vec<FilterClause>,
}

impl FilterSet {
    /// Empty filter: every record of `kind`.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            clauses: Vec::new(),
        }
    }

    /// Build from raw query parameters, dropping anything unrecognized or unparsable.
    pub fn from_params<I, K, V>(kind: RecordKind, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let clauses = params
            .into_iter()
            .filter_map(|(name, raw)| {
                recognize(kind, name.as_ref())
                    .and_then(|clause| FilterClause::parse(clause, raw.as_ref()))
            })
            .collect();
        Self { kind, clauses }
    }

    pub fn with_clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.kind == self.kind && self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    UpdatedAt,
    CreatedAt,
    System,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Listing order. The insertion sequence always breaks ties, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Parse `[-]field`; unknown or absent input yields the default order.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::default();
        };
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, raw),
        };
        let field = match name {
            "updated_at" => SortField::UpdatedAt,
            "created_at" => SortField::CreatedAt,
            "system" => SortField::System,
            "body" | "star" | "world" => SortField::Body,
            _ => return Self::default(),
        };
        Self { field, direction }
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let primary = match self.field {
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::System => normalize(a.system.as_deref().unwrap_or_default())
                .cmp(&normalize(b.system.as_deref().unwrap_or_default())),
            SortField::Body => normalize(a.body.as_deref().unwrap_or_default())
                .cmp(&normalize(b.body.as_deref().unwrap_or_default())),
        };
        let primary = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.sequence.cmp(&b.sequence))
    }

    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn records(offsets: &[i64]) -> Vec<Record> {
        let base = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        offsets
            .iter()
            .enumerate()
            .map(|(i, off)| {
                let mut r = Record::new(RecordKind::Star, base + Duration::hours(*off));
                r.system = Some(format!("System {}", i % 3));
                r.sequence = i as i64;
                r
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An unparsable `updated_before` selects the same records as no filter at all.
        #[test]
        fn prop_bad_date_equals_omitted(
            offsets in prop::collection::vec(0i64..500, 0..20),
            garbage in "[a-z]{1,10}",
            system in prop::option::of(0usize..3),
        ) {
            let data = records(&offsets);
            let mut with_bad: Vec<(String, String)> = vec![("updated_before".into(), garbage)];
            let mut without: Vec<(String, String)> = Vec::new();
            if let Some(n) = system {
                with_bad.push(("system".into(), format!("system {}", n)));
                without.push(("system".into(), format!("system {}", n)));
            }
            let a = FilterSet::from_params(RecordKind::Star, with_bad);
            let b = FilterSet::from_params(RecordKind::Star, without);
            let matching = |set: &FilterSet| -> Vec<i64> {
                data.iter().filter(|r| set.matches(r)).map(|r| r.sequence).collect()
            };
            prop_assert_eq!(matching(&a), matching(&b));
        }

        /// Clause order never changes the result set.
        #[test]
        fn prop_clause_order_irrelevant(
            offsets in prop::collection::vec(0i64..500, 0..20),
            bound in 0i64..500,
            n in 0usize..3,
        ) {
            let data = records(&offsets);
            let base = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
            let ts = (base + Duration::hours(bound)).to_rfc3339();
            let forward = FilterSet::from_params(
                RecordKind::Star,
                [("system", format!("SYSTEM {}", n)), ("updated_after", ts.clone())],
            );
            let backward = FilterSet::from_params(
                RecordKind::Star,
                [("updated_after", ts), ("system", format!("SYSTEM {}", n))],
            );
            for record in &data {
                prop_assert_eq!(forward.matches(record), backward.matches(record));
            }
        }
    }
}
