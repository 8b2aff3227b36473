//! Star REST API Routes
//!
//! Stars are identified by system plus star designation and are open to any
//! identified contributor.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value as JsonValue;
use survey_core::RecordKind;

use super::generic;
use crate::{
    auth::ActorExtractor,
    config::ApiConfig,
    error::{ApiError, ApiResult},
    extractors::PathId,
    services::RecordService,
    state::AppState,
    types::{DumpChecksum, ListResponse, RecordResponse},
};

/// GET /api/v1/stars - List stars
#[utoipa::path(
    get,
    path = "/api/v1/stars",
    tag = "Stars",
    params(
        ("system" = Option<String>, Query, description = "System name, compared case- and padding-insensitively"),
        ("star" = Option<String>, Query, description = "Star designation"),
        ("updater" = Option<String>, Query, description = "Last reporter"),
        ("updated_before" = Option<String>, Query, description = "Strict upper bound on updated_at"),
        ("updated_after" = Option<String>, Query, description = "Strict lower bound on updated_at"),
        ("sort" = Option<String>, Query, description = "updated_at, created_at, system or star; '-' prefix for descending"),
        ("page" = Option<usize>, Query, description = "1-based page"),
        ("per_page" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Stars", body = ListResponse),
    ),
)]
pub async fn list_stars(
    State(service): State<RecordService>,
    State(config): State<Arc<ApiConfig>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    generic::list_handler(&service, &config, RecordKind::Star, &params).await
}

/// POST /api/v1/stars - Create a star
#[utoipa::path(
    post,
    path = "/api/v1/stars",
    tag = "Stars",
    request_body(content = Object, description = "Flat attributes or a JSON:API document"),
    responses(
        (status = 201, description = "Star created", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn create_star(
    State(service): State<RecordService>,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::create_handler(&service, RecordKind::Star, &actor, &payload).await
}

/// GET /api/v1/stars/{id} - Get a star
#[utoipa::path(
    get,
    path = "/api/v1/stars/{id}",
    tag = "Stars",
    params(("id" = String, Path, description = "Star ID")),
    responses(
        (status = 200, description = "Star", body = RecordResponse),
        (status = 404, description = "Star not found", body = ApiError),
    ),
)]
pub async fn get_star(
    State(service): State<RecordService>,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    generic::get_handler(&service, RecordKind::Star, id).await
}

/// PATCH /api/v1/stars/{id} - Update a star
#[utoipa::path(
    patch,
    path = "/api/v1/stars/{id}",
    tag = "Stars",
    params(("id" = String, Path, description = "Star ID")),
    request_body(content = Object, description = "Changed attributes"),
    responses(
        (status = 200, description = "Star updated", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 404, description = "Star not found", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn update_star(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::update_handler(&service, RecordKind::Star, id, &actor, &payload).await
}

/// DELETE /api/v1/stars/{id} - Delete a star
#[utoipa::path(
    delete,
    path = "/api/v1/stars/{id}",
    tag = "Stars",
    params(("id" = String, Path, description = "Star ID")),
    responses(
        (status = 204, description = "Star deleted"),
        (status = 401, description = "No commander", body = ApiError),
        (status = 404, description = "Star not found", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn delete_star(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
) -> ApiResult<impl IntoResponse> {
    generic::delete_handler(&service, RecordKind::Star, id, &actor).await
}

/// GET /api/v1/stars/download - Every star as one JSON array
#[utoipa::path(
    get,
    path = "/api/v1/stars/download",
    tag = "Stars",
    responses(
        (status = 200, description = "All stars", body = [RecordResponse]),
    ),
)]
pub async fn download_stars(
    State(service): State<RecordService>,
) -> ApiResult<impl IntoResponse> {
    generic::download_handler(&service, RecordKind::Star).await
}

/// GET /api/v1/stars/md5 - Checksum of the star download
#[utoipa::path(
    get,
    path = "/api/v1/stars/md5",
    tag = "Stars",
    responses(
        (status = 200, description = "MD5 of the current download body", body = DumpChecksum),
    ),
)]
pub async fn stars_md5(State(service): State<RecordService>) -> ApiResult<impl IntoResponse> {
    generic::md5_handler(&service, RecordKind::Star).await
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stars).post(create_star))
        .route("/download", get(download_stars))
        .route("/md5", get(stars_md5))
        .route(
            "/:id",
            get(get_star)
                .patch(update_star)
                .put(update_star)
                .delete(delete_star),
        )
}
