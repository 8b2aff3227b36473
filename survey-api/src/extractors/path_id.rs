//! Path extractor for record ids.
//!
//! Provides `PathId` which parses the trailing `:id` (or `:world_id`) path
//! segment into a [`RecordId`] and rejects malformed ids with a 400 that
//! names the offending segment.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use survey_core::{parse_record_id, RecordId};

use crate::error::ApiError;

/// A record id taken from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("Missing record id: {}", e)))?;

        parse_record_id(&raw)
            .map(PathId)
            .ok_or_else(|| ApiError::invalid_format("id", &format!("a UUID, got '{}'", raw)))
    }
}
