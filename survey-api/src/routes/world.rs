//! World REST API Routes
//!
//! Worlds are bodies within a system, unique per system. Surveys nest under
//! the world they were taken on.

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

/// GET /api/v1/worlds - List worlds
#[utoipa::path(
    get,
    path = "/api/v1/worlds",
    tag = "Worlds",
    params(
        ("system" = Option<String>, Query, description = "System name"),
        ("world" = Option<String>, Query, description = "World designation"),
        ("updater" = Option<String>, Query, description = "Last reporter"),
        ("system_id" = Option<String>, Query, description = "Owning system record"),
        ("updated_before" = Option<String>, Query, description = "Strict upper bound on updated_at"),
        ("updated_after" = Option<String>, Query, description = "Strict lower bound on updated_at"),
        ("sort" = Option<String>, Query, description = "updated_at, created_at, system or world; '-' prefix for descending"),
        ("page" = Option<usize>, Query, description = "1-based page"),
        ("per_page" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Worlds", body = ListResponse),
    ),
)]
pub async fn list_worlds(
    State(service): State<RecordService>,
    State(config): State<Arc<ApiConfig>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    generic::list_handler(&service, &config, RecordKind::World, &params).await
}

/// POST /api/v1/worlds - Create a world
#[utoipa::path(
    post,
    path = "/api/v1/worlds",
    tag = "Worlds",
    request_body(content = Object, description = "Flat attributes or a JSON:API document"),
    responses(
        (status = 201, description = "World created", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn create_world(
    State(service): State<RecordService>,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::create_handler(&service, RecordKind::World, &actor, &payload).await
}

/// GET /api/v1/worlds/{id} - Get a world
#[utoipa::path(
    get,
    path = "/api/v1/worlds/{id}",
    tag = "Worlds",
    params(("id" = String, Path, description = "World ID")),
    responses(
        (status = 200, description = "World", body = RecordResponse),
        (status = 404, description = "World not found", body = ApiError),
    ),
)]
pub async fn get_world(
    State(service): State<RecordService>,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    generic::get_handler(&service, RecordKind::World, id).await
}

/// PATCH /api/v1/worlds/{id} - Update a world
#[utoipa::path(
    patch,
    path = "/api/v1/worlds/{id}",
    tag = "Worlds",
    params(("id" = String, Path, description = "World ID")),
    request_body(content = Object, description = "Changed attributes"),
    responses(
        (status = 200, description = "World updated", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 404, description = "World not found", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn update_world(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::update_handler(&service, RecordKind::World, id, &actor, &payload).await
}

/// DELETE /api/v1/worlds/{id} - Delete a world
#[utoipa::path(
    delete,
    path = "/api/v1/worlds/{id}",
    tag = "Worlds",
    params(("id" = String, Path, description = "World ID")),
    responses(
        (status = 204, description = "World deleted"),
        (status = 401, description = "No commander", body = ApiError),
        (status = 404, description = "World not found", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn delete_world(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
) -> ApiResult<impl IntoResponse> {
    generic::delete_handler(&service, RecordKind::World, id, &actor).await
}

/// GET /api/v1/worlds/{world_id}/surveys - List surveys of one world
#[utoipa::path(
    get,
    path = "/api/v1/worlds/{world_id}/surveys",
    tag = "Surveys",
    params(
        ("world_id" = String, Path, description = "World ID"),
        ("commander" = Option<String>, Query, description = "Surveying commander"),
        ("resource" = Option<String>, Query, description = "Surveyed resource"),
        ("updated_before" = Option<String>, Query, description = "Strict upper bound on updated_at"),
        ("updated_after" = Option<String>, Query, description = "Strict lower bound on updated_at"),
    ),
    responses(
        (status = 200, description = "Surveys of the world", body = ListResponse),
        (status = 404, description = "World not found", body = ApiError),
    ),
)]
pub async fn list_world_surveys(
    State(service): State<RecordService>,
    State(config): State<Arc<ApiConfig>>,
    PathId(world_id): PathId,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    generic::list_world_surveys_handler(&service, &config, world_id, &params).await
}

/// POST /api/v1/worlds/{world_id}/surveys - Create a survey of one world
#[utoipa::path(
    post,
    path = "/api/v1/worlds/{world_id}/surveys",
    tag = "Surveys",
    params(("world_id" = String, Path, description = "World ID")),
    request_body(content = Object, description = "Survey attributes"),
    responses(
        (status = 201, description = "Survey created", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 404, description = "World not found", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn create_world_survey(
    State(service): State<RecordService>,
    PathId(world_id): PathId,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::create_world_survey_handler(&service, world_id, &actor, &payload).await
}

/// GET /api/v1/worlds/download - Every world as one JSON array
#[utoipa::path(
    get,
    path = "/api/v1/worlds/download",
    tag = "Worlds",
    responses(
        (status = 200, description = "All worlds", body = [RecordResponse]),
    ),
)]
pub async fn download_worlds(
    State(service): State<RecordService>,
) -> ApiResult<impl IntoResponse> {
    generic::download_handler(&service, RecordKind::World).await
}

/// GET /api/v1/worlds/md5 - Checksum of the world download
#[utoipa::path(
    get,
    path = "/api/v1/worlds/md5",
    tag = "Worlds",
    responses(
        (status = 200, description = "MD5 of the current download body", body = DumpChecksum),
    ),
)]
pub async fn worlds_md5(State(service): State<RecordService>) -> ApiResult<impl IntoResponse> {
    generic::md5_handler(&service, RecordKind::World).await
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_worlds).post(create_world))
        .route("/download", get(download_worlds))
        .route("/md5", get(worlds_md5))
        .route(
            "/:id",
            get(get_world)
                .patch(update_world)
                .put(update_world)
                .delete(delete_world),
        )
        // Same parameter name as "/:id"; the router rejects differing names
        // at one position.
        .route(
            "/:id/surveys",
            get(list_world_surveys).post(create_world_survey),
        )
}
