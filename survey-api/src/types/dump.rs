//! Full-collection dumps.

use serde::{Deserialize, Serialize};

/// Checksum of a kind's download body, so clients can skip unchanged dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DumpChecksum {
    /// Lowercase hex MD5 of the exact download bytes
    pub md5: String,
    /// Records in the dump
    pub count: usize,
}
