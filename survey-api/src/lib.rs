//! Survey API - REST layer for survey records
//!
//! Axum routes over the record service, with a Postgres store for
//! deployments and the in-memory store for tests and single-node use.
//! Observability follows the usual pattern: `tracing` spans per request and
//! Prometheus counters on `/metrics`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod extractors;
mod macros;
pub mod openapi;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{authenticate, ActorExtractor};
pub use config::{ApiConfig, OwnershipConfig, StorageBackend};
pub use db::{DbConfig, PgStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::RecordService;
pub use state::AppState;
pub use types::*;
