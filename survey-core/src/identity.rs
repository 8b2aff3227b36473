//! Identity types for survey records

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record identifier using UUIDv7 for timestamp-sortable IDs.
pub type RecordId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 RecordId.
pub fn new_record_id() -> RecordId {
    Uuid::now_v7()
}

/// Parse a record id from untrusted text.
///
/// Returns `None` for blank or malformed input; callers decide whether that
/// is an error or simply "no id".
pub fn parse_record_id(raw: &str) -> Option<RecordId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Uuid::parse_str(trimmed).ok()
}
