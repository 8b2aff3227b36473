//! Health endpoints: `/health/ping` answers while the process runs,
//! `/health/ready` also round-trips the record store. Neither needs a
//! commander.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::RecordService;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Readiness report for the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadinessReport {
    fn new(store: Result<u64, String>, started: Instant) -> Self {
        let (status, store_latency_ms, error) = match store {
            Ok(latency) => (HealthStatus::Healthy, Some(latency), None),
            Err(e) => (HealthStatus::Unhealthy, None, Some(e)),
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: started.elapsed().as_secs(),
            store_latency_ms,
            error,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// GET /health/ping
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Process is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/ready
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Record store reachable", body = ReadinessReport),
        (status = 503, description = "Record store unreachable", body = ReadinessReport),
    ),
)]
pub async fn readiness(
    State(service): State<RecordService>,
    State(started): State<Instant>,
) -> impl IntoResponse {
    let report = ReadinessReport::new(check_store(&service).await, started);
    if report.status == HealthStatus::Unhealthy {
        tracing::warn!(error = ?report.error, "record store not ready");
    }
    (report.status_code(), Json(report))
}

async fn check_store(service: &RecordService) -> Result<u64, String> {
    let start = Instant::now();
    match service.store().health_check().await {
        Ok(true) => Ok(start.elapsed().as_millis() as u64),
        Ok(false) => Err("Record store reported unhealthy".to_string()),
        Err(e) => Err(format!("Record store check failed: {}", e)),
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_report_reachable_store() {
        let report = ReadinessReport::new(Ok(4), Instant::now());
        assert_eq!(report.status_code(), StatusCode::OK);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["store_latency_ms"], 4);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_ready_report_unreachable_store() {
        let report = ReadinessReport::new(
            Err("Record store check failed: connection refused".to_string()),
            Instant::now(),
        );
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "Record store check failed: connection refused");
        assert!(json.get("store_latency_ms").is_none());
    }
}
