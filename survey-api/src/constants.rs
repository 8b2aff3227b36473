//! Constants for the Survey API
//!
//! Defaults shared by configuration, routing and pagination.

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// PAGINATION
// ============================================================================

/// Default page size for list operations
pub const DEFAULT_PER_PAGE: usize = 100;

/// Maximum page size for list operations
pub const MAX_PER_PAGE: usize = 1000;

// ============================================================================
// REQUEST HEADERS
// ============================================================================

/// Header naming the acting commander.
pub const COMMANDER_HEADER: &str = "x-commander";

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;
