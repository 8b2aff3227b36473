//! Shared application state for Axum routers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::RecordService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Write path and queries for every record kind.
    pub service: RecordService,
    pub config: Arc<ApiConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(service: RecordService, config: ApiConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }
}

crate::impl_from_ref!(RecordService, service);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(std::time::Instant, start_time);
