//! API Configuration Module
//!
//! CORS, pagination, admin tokens, ownership carve-outs and storage backend
//! selection. Configuration is loaded from environment variables with
//! defaults suited to development.

use survey_core::{CarveOut, OwnershipGuard};

use crate::constants::{DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PER_PAGE, MAX_PER_PAGE};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, pagination and privileged callers.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Page size when the client sends none.
    pub default_per_page: usize,

    /// Upper bound on client-requested page size.
    pub max_per_page: usize,

    /// Bearer tokens that mark the caller as privileged.
    pub admin_tokens: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            admin_tokens: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SURVEY_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `SURVEY_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `SURVEY_DEFAULT_PER_PAGE`: Default page size (default: 100)
    /// - `SURVEY_MAX_PER_PAGE`: Maximum page size (default: 1000)
    /// - `SURVEY_ADMIN_TOKENS`: Comma-separated privileged bearer tokens
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let default_per_page =
            parse_or(&lookup, "SURVEY_DEFAULT_PER_PAGE", defaults.default_per_page);
        let max_per_page = parse_or(&lookup, "SURVEY_MAX_PER_PAGE", defaults.max_per_page)
            .max(default_per_page);

        Self {
            cors_origins: list(&lookup, "SURVEY_CORS_ORIGINS"),
            cors_max_age_secs: parse_or(
                &lookup,
                "SURVEY_CORS_MAX_AGE_SECS",
                defaults.cors_max_age_secs,
            ),
            default_per_page,
            max_per_page,
            admin_tokens: list(&lookup, "SURVEY_ADMIN_TOKENS"),
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.org
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern))
                        || origin_domain == pattern;
                }
            }
            false
        })
    }

    /// Whether `token` is a configured admin token.
    pub fn is_admin_token(&self, token: &str) -> bool {
        !token.is_empty() && self.admin_tokens.iter().any(|t| t == token)
    }

    /// Clamp a requested page size into `1..=max_per_page`.
    pub fn per_page(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page.max(1))
    }
}

// ============================================================================
// OWNERSHIP CONFIGURATION
// ============================================================================

/// Carve-out that lets non-owners change a fixed set of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipConfig {
    pub carve_out_name: String,
    pub carve_out_fields: Vec<String>,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        let carve_out = CarveOut::error_flag();
        Self {
            carve_out_name: carve_out.name,
            carve_out_fields: carve_out.fields.into_iter().collect(),
        }
    }
}

impl OwnershipConfig {
    /// Environment variables:
    /// - `SURVEY_CARVE_OUT_NAME` (default: `error_flag`)
    /// - `SURVEY_CARVE_OUT_FIELDS`: comma-separated field names; an empty value disables
    ///   the carve-out
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let carve_out_name = lookup("SURVEY_CARVE_OUT_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.carve_out_name);
        let carve_out_fields = match lookup("SURVEY_CARVE_OUT_FIELDS") {
            Some(_) => list(&lookup, "SURVEY_CARVE_OUT_FIELDS"),
            None => defaults.carve_out_fields,
        };
        Self {
            carve_out_name,
            carve_out_fields,
        }
    }

    pub fn guard(&self) -> OwnershipGuard {
        if self.carve_out_fields.is_empty() {
            return OwnershipGuard::new(Vec::new());
        }
        OwnershipGuard::new(vec![CarveOut::new(
            self.carve_out_name.clone(),
            self.carve_out_fields.iter().cloned(),
        )])
    }
}

// ============================================================================
// STORAGE BACKEND
// ============================================================================

/// Which record store the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl StorageBackend {
    /// `SURVEY_STORAGE=memory|postgres` (default: memory).
    pub fn from_env() -> Result<Self, String> {
        Self::parse(std::env::var("SURVEY_STORAGE").ok().as_deref())
    }

    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("memory") => Ok(StorageBackend::Memory),
            Some("postgres") | Some("postgresql") => Ok(StorageBackend::Postgres),
            Some(other) => Err(format!("Unknown SURVEY_STORAGE backend: {}", other)),
        }
    }
}

fn list(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Vec<String> {
    lookup(key)
        .map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
