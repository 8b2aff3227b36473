//! Survey REST API Routes
//!
//! Surveys record resources found on a world. Only the commander who took a
//! survey (or a privileged caller) may change or delete it, apart from the
//! error-flag fields any contributor may set.

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

/// GET /api/v1/surveys - List surveys
#[utoipa::path(
    get,
    path = "/api/v1/surveys",
    tag = "Surveys",
    params(
        ("commander" = Option<String>, Query, description = "Surveying commander, compared case- and padding-insensitively"),
        ("resource" = Option<String>, Query, description = "Surveyed resource"),
        ("world_id" = Option<String>, Query, description = "Surveyed world"),
        ("basecamp_id" = Option<String>, Query, description = "Basecamp the survey was taken from"),
        ("system_id" = Option<String>, Query, description = "System record"),
        ("updated_before" = Option<String>, Query, description = "Strict upper bound on updated_at"),
        ("updated_after" = Option<String>, Query, description = "Strict lower bound on updated_at"),
        ("sort" = Option<String>, Query, description = "updated_at or created_at; '-' prefix for descending"),
        ("page" = Option<usize>, Query, description = "1-based page"),
        ("per_page" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Surveys", body = ListResponse),
    ),
)]
pub async fn list_surveys(
    State(service): State<RecordService>,
    State(config): State<Arc<ApiConfig>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    generic::list_handler(&service, &config, RecordKind::Survey, &params).await
}

/// POST /api/v1/surveys - Create a survey
#[utoipa::path(
    post,
    path = "/api/v1/surveys",
    tag = "Surveys",
    request_body(content = Object, description = "Flat attributes or a JSON:API document"),
    responses(
        (status = 201, description = "Survey created", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn create_survey(
    State(service): State<RecordService>,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::create_handler(&service, RecordKind::Survey, &actor, &payload).await
}

/// GET /api/v1/surveys/{id} - Get a survey
#[utoipa::path(
    get,
    path = "/api/v1/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey ID")),
    responses(
        (status = 200, description = "Star", body = RecordResponse),
        (status = 404, description = "Survey not found", body = ApiError),
    ),
)]
pub async fn get_survey(
    State(service): State<RecordService>,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    generic::get_handler(&service, RecordKind::Survey, id).await
}

/// PATCH /api/v1/surveys/{id} - Update a survey
#[utoipa::path(
    patch,
    path = "/api/v1/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey ID")),
    request_body(content = Object, description = "Changed attributes"),
    responses(
        (status = 200, description = "Survey updated", body = RecordResponse),
        (status = 401, description = "No commander", body = ApiError),
        (status = 403, description = "Not the survey's commander", body = ApiError),
        (status = 404, description = "Survey not found", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn update_survey(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
    Json(payload): Json<JsonValue>,
) -> ApiResult<impl IntoResponse> {
    generic::update_handler(&service, RecordKind::Survey, id, &actor, &payload).await
}

/// DELETE /api/v1/surveys/{id} - Delete a survey
#[utoipa::path(
    delete,
    path = "/api/v1/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey ID")),
    responses(
        (status = 204, description = "Survey deleted"),
        (status = 401, description = "No commander", body = ApiError),
        (status = 403, description = "Not the survey's commander", body = ApiError),
        (status = 404, description = "Survey not found", body = ApiError),
    ),
    security(("commander" = []), ("admin_token" = []))
)]
pub async fn delete_survey(
    State(service): State<RecordService>,
    PathId(id): PathId,
    ActorExtractor(actor): ActorExtractor,
) -> ApiResult<impl IntoResponse> {
    generic::delete_handler(&service, RecordKind::Survey, id, &actor).await
}

/// GET /api/v1/surveys/download - Every survey as one JSON array
#[utoipa::path(
    get,
    path = "/api/v1/surveys/download",
    tag = "Surveys",
    responses(
        (status = 200, description = "All surveys", body = [RecordResponse]),
    ),
)]
pub async fn download_surveys(
    State(service): State<RecordService>,
) -> ApiResult<impl IntoResponse> {
    generic::download_handler(&service, RecordKind::Survey).await
}

/// GET /api/v1/surveys/md5 - Checksum of the survey download
#[utoipa::path(
    get,
    path = "/api/v1/surveys/md5",
    tag = "Surveys",
    responses(
        (status = 200, description = "MD5 of the current download body", body = DumpChecksum),
    ),
)]
pub async fn surveys_md5(State(service): State<RecordService>) -> ApiResult<impl IntoResponse> {
    generic::md5_handler(&service, RecordKind::Survey).await
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_surveys).post(create_survey))
        .route("/download", get(download_surveys))
        .route("/md5", get(surveys_md5))
        .route(
            "/:id",
            get(get_survey)
                .patch(update_survey)
                .put(update_survey)
                .delete(delete_survey),
        )
}
