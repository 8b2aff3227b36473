//! Error Types for the Survey API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use survey_core::{StorageError, SurveyError, ValidationError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request carries no acting identity
    Unauthorized,

    /// Acting identity may not change the record
    Forbidden,

    /// Record failed field validation
    ValidationFailed,

    /// Request body or parameters could not be read
    InvalidInput,

    /// Field format is incorrect
    InvalidFormat,

    /// Requested record does not exist
    EntityNotFound,

    InternalError,
    DatabaseError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InvalidInput | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Field-level validation failure, rendered as a JSON:API style error list.
    pub fn validation(errors: &[ValidationError]) -> Self {
        let items: Vec<serde_json::Value> = errors
            .iter()
            .map(|err| {
                json!({
                    "field": err.field(),
                    "message": err.message(),
                    "pointer": format!("/data/attributes/{}", err.field()),
                })
            })
            .collect();
        let message = errors
            .iter()
            .map(|err| format!("{} {}", err.field(), err.message()))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(ErrorCode::ValidationFailed, message).with_details(json!({ "errors": items }))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<SurveyError> for ApiError {
    fn from(err: SurveyError) -> Self {
        match err {
            SurveyError::Validation(errors) => ApiError::validation(&errors),
            SurveyError::Authorization(err) => ApiError::forbidden(err.to_string()),
            SurveyError::NotFound { kind, id } => ApiError::entity_not_found(kind.as_str(), id),
            SurveyError::Storage(err) => err.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Log the full error, return a generic one.
        tracing::error!("Storage error: {:?}", err);
        match err {
            StorageError::IdentityConflict { .. } => SurveyError::from(err).into(),
            StorageError::LockPoisoned => ApiError::internal_error("Internal server error"),
            _ => ApiError::database_error("Database operation failed"),
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{AuthorizationError, RecordKind};
    use uuid::Uuid;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DatabaseError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_details() {
        let err = ApiError::validation(&[ValidationError::AlreadyTaken {
            field: "star".to_string(),
        }]);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "star has already been taken for this system");
        let details = err.details.unwrap();
        assert_eq!(details["errors"][0]["field"], "star");
        assert_eq!(details["errors"][0]["pointer"], "/data/attributes/star");
    }

    #[test]
    fn test_survey_error_mapping() {
        let err: ApiError = SurveyError::Authorization(AuthorizationError::MissingIdentity).into();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err: ApiError = SurveyError::NotFound {
            kind: RecordKind::Survey,
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::EntityNotFound);
        assert!(err.message.contains("survey"));

        let err: ApiError = SurveyError::Storage(StorageError::Backend {
            reason: "connection reset".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("connection reset"));
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::entity_not_found("star", Uuid::nil());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ENTITY_NOT_FOUND");
        assert!(json.get("details").is_none());
    }
}
