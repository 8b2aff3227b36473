//! Shared handler bodies for the record endpoints.
//!
//! Each kind's route module wraps these in thin, documented handlers so the
//! OpenAPI output names concrete paths.

use std::collections::HashMap;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use md5::{Digest, Md5};
use serde_json::Value as JsonValue;
use survey_core::{Actor, FilterClause, FilterSet, RecordId, RecordKind, RefField, SortOrder};

use crate::{
    config::ApiConfig,
    error::{ApiError, ApiResult},
    services::RecordService,
    types::{DumpChecksum, ListQuery, ListResponse, RecordResponse},
};

/// List one page of records of `kind`.
pub async fn list_handler(
    service: &RecordService,
    config: &ApiConfig,
    kind: RecordKind,
    params: &HashMap<String, String>,
) -> ApiResult<Json<ListResponse>> {
    let query = ListQuery::from_params(kind, params, config);
    list_query(service, query).await
}

async fn list_query(service: &RecordService, query: ListQuery) -> ApiResult<Json<ListResponse>> {
    let records = service.list(&query.filter, &query.order).await?;
    let items = records.iter().map(RecordResponse::from).collect();
    Ok(Json(query.paginate(items)))
}

pub async fn get_handler(
    service: &RecordService,
    kind: RecordKind,
    id: RecordId,
) -> ApiResult<Json<RecordResponse>> {
    let record = service.get(kind, id).await?;
    Ok(Json(RecordResponse::from(record)))
}

pub async fn create_handler(
    service: &RecordService,
    kind: RecordKind,
    actor: &Actor,
    payload: &JsonValue,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let record = service.create(kind, payload, actor).await?;
    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

pub async fn update_handler(
    service: &RecordService,
    kind: RecordKind,
    id: RecordId,
    actor: &Actor,
    payload: &JsonValue,
) -> ApiResult<Json<RecordResponse>> {
    let record = service.update(kind, id, payload, actor).await?;
    Ok(Json(RecordResponse::from(record)))
}

pub async fn delete_handler(
    service: &RecordService,
    kind: RecordKind,
    id: RecordId,
    actor: &Actor,
) -> ApiResult<StatusCode> {
    service.delete(kind, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Surveys of one world; the path world replaces any `world_id` filter.
pub async fn list_world_surveys_handler(
    service: &RecordService,
    config: &ApiConfig,
    world_id: RecordId,
    params: &HashMap<String, String>,
) -> ApiResult<Json<ListResponse>> {
    service.get(RecordKind::World, world_id).await?;

    let mut params = params.clone();
    params.remove(RefField::World.attribute());
    let mut query = ListQuery::from_params(RecordKind::Survey, &params, config);
    query.filter = query.filter.with_clause(FilterClause::RefEquals {
        field: RefField::World,
        id: world_id,
    });
    list_query(service, query).await
}

/// Create a survey under the path world, overriding any world in the body.
pub async fn create_world_survey_handler(
    service: &RecordService,
    world_id: RecordId,
    actor: &Actor,
    payload: &JsonValue,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    service.get(RecordKind::World, world_id).await?;

    let mut attrs = survey_core::normalize_payload(RecordKind::Survey, payload);
    attrs.insert(
        RefField::World.attribute().to_string(),
        JsonValue::String(world_id.to_string()),
    );
    let record = service
        .create_from_attributes(RecordKind::Survey, attrs, actor)
        .await?;
    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

/// Every record of `kind` in default order, as the exact download bytes.
async fn dump_body(service: &RecordService, kind: RecordKind) -> ApiResult<(usize, Vec<u8>)> {
    let records = service
        .list(&FilterSet::new(kind), &SortOrder::default())
        .await?;
    let items: Vec<RecordResponse> = records.iter().map(RecordResponse::from).collect();
    let body = serde_json::to_vec(&items)
        .map_err(|e| ApiError::internal_error(format!("Failed to serialize dump: {}", e)))?;
    Ok((items.len(), body))
}

/// The whole collection of `kind` as one JSON array attachment.
pub async fn download_handler(
    service: &RecordService,
    kind: RecordKind,
) -> ApiResult<impl IntoResponse> {
    let (count, body) = dump_body(service, kind).await?;
    tracing::debug!(kind = %kind, count, bytes = body.len(), "dump served");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.json\"", kind.plural()),
            ),
        ],
        body,
    ))
}

/// MD5 of what [`download_handler`] would return right now.
pub async fn md5_handler(
    service: &RecordService,
    kind: RecordKind,
) -> ApiResult<Json<DumpChecksum>> {
    let (count, body) = dump_body(service, kind).await?;
    let mut hasher = Md5::new();
    hasher.update(&body);
    Ok(Json(DumpChecksum {
        md5: format!("{:x}", hasher.finalize()),
        count,
    }))
}
