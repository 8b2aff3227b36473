//! REST API Routes Module
//!
//! Route handlers organized by record kind, plus:
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics
//! - OpenAPI document
//! - CORS support for browser-based clients

pub mod generic;
pub mod health;
pub mod star;
pub mod survey;
pub mod world;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::constants::COMMANDER_HEADER;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use health::create_router as health_router;
pub use star::create_router as star_router;
pub use survey::create_router as survey_router;
pub use world::create_router as world_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Record routes under /api/v1/{stars,worlds,surveys}
/// - Health checks at /health/*
/// - Metrics at /metrics
/// - OpenAPI spec at /openapi.json
///
/// Writes require an acting commander, enforced per handler by
/// [`crate::auth::ActorExtractor`]; reads are public.
pub fn create_api_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    let api_routes = Router::new()
        .nest("/stars", star::create_router())
        .nest("/worlds", world::create_router())
        .nest("/surveys", survey::create_router());

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins, including
/// `*.domain` wildcards.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(COMMANDER_HEADER),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_production() {
        return cors.allow_origin(Any);
    }

    let config = config.clone();
    cors.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _: &axum::http::request::Parts| {
            origin
                .to_str()
                .map(|o| config.is_origin_allowed(o))
                .unwrap_or(false)
        },
    ))
}
