//! Survey Core - Record rules
//!
//! Record model for stars, worlds and surveys plus the rules every write and
//! listing goes through: normalization, filtering, uniqueness keys, audit
//! trail, relationship flattening and ownership. No I/O happens here; storage
//! and transport crates depend on this one.

pub mod audit;
pub mod error;
pub mod filter;
pub mod identity;
pub mod normalize;
pub mod ownership;
pub mod record;
pub mod relationship;

pub use audit::AuditTrail;
pub use error::{AuthorizationError, StorageError, SurveyError, SurveyResult, ValidationError};
pub use filter::{
    parse_timestamp, recognize, ClauseKind, FilterClause, FilterSet, SortDirection, SortField,
    SortOrder,
};
pub use identity::{new_record_id, parse_record_id, RecordId, Timestamp};
pub use normalize::{display_name, normalize, normalize_opt, same_identity, tidy};
pub use ownership::{Actor, Authorization, CarveOut, OwnershipGuard};
pub use record::{
    submitted_fields, Attributes, IdentityKey, Record, RecordKind, RefField, TextField,
    RESERVED_FIELDS,
};
pub use relationship::normalize_payload;

/// Append `contributor` to the record's audit trail; see [`AuditTrail::record_update`].
pub fn record_update(record: &mut Record, contributor: Option<&str>) -> bool {
    record.updaters.record_update(contributor)
}

/// Derived creator of a record.
pub fn creator(record: &Record) -> Option<&str> {
    record.creator()
}
