//! Prometheus Metrics Definitions
//!
//! Defines the survey API metrics and exposes a /metrics endpoint for
//! Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use survey_core::RecordKind;

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<SurveyMetrics>> = Lazy::new(SurveyMetrics::new);

/// Container for all survey API metrics.
#[derive(Clone)]
pub struct SurveyMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Record writes - labels: kind, operation, outcome
    pub record_writes_total: CounterVec,
}

impl SurveyMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "survey_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_requests_total: {}", e))
            })?,

            http_request_duration_seconds: register_histogram_vec!(
                "survey_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!(
                    "Failed to register http_request_duration_seconds: {}",
                    e
                ))
            })?,

            record_writes_total: register_counter_vec!(
                "survey_record_writes_total",
                "Total number of record create/update/delete attempts",
                &["kind", "operation", "outcome"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register record_writes_total: {}", e))
            })?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a write attempt and how it ended.
    pub fn record_write(&self, kind: RecordKind, operation: &str, outcome: &str) {
        self.record_writes_total
            .with_label_values(&[kind.as_str(), operation, outcome])
            .inc();
    }
}

/// Count a write on the global registry; a registry that failed to
/// initialize is skipped.
pub fn record_write(kind: RecordKind, operation: &str, outcome: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_write(kind, operation, outcome);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Touch the registry so metric families exist before the first request.
    let _ = METRICS.as_ref();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_http_request() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_http_request("GET", "/api/v1/stars", 200, 0.015);
        Ok(())
    }

    #[test]
    fn test_record_write_counts() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let counter = metrics
            .record_writes_total
            .with_label_values(&["world", "delete", "forbidden"]);
        let before = counter.get();
        record_write(RecordKind::World, "delete", "forbidden");
        assert_eq!(counter.get(), before + 1.0);
        Ok(())
    }
}
