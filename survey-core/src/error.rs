//! Error types for survey record operations

use crate::RecordKind;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Insert failed for {kind:?}: {reason}")]
    InsertFailed { kind: RecordKind, reason: String },

    #[error("Update failed for {kind:?} with id {id}: {reason}")]
    UpdateFailed {
        kind: RecordKind,
        id: Uuid,
        reason: String,
    },

    /// A second record with the same identity key was about to be written.
    #[error("Identity conflict for {kind:?} on {key}: already held by {existing}")]
    IdentityConflict {
        kind: RecordKind,
        key: String,
        existing: Uuid,
    },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Field-level validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("{field} has already been taken for this system")]
    AlreadyTaken { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing association: {field}")]
    MissingAssociation { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attribute name the error is attached to.
    pub fn field(&self) -> &str {
        match self {
            Self::RequiredFieldMissing { field }
            | Self::AlreadyTaken { field }
            | Self::InvalidValue { field, .. }
            | Self::MissingAssociation { field } => field,
        }
    }

    /// Client-facing message, without the field name.
    pub fn message(&self) -> String {
        match self {
            Self::RequiredFieldMissing { .. } => "can't be blank".to_string(),
            Self::AlreadyTaken { .. } => "has already been taken for this system".to_string(),
            Self::InvalidValue { reason, .. } => reason.clone(),
            Self::MissingAssociation { .. } => "must exist".to_string(),
        }
    }
}

/// Ownership rule violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Record owned by {owner} cannot be changed by {requester}")]
    OwnershipMismatch { owner: String, requester: String },

    #[error("Requester identity is required to change an owned record")]
    MissingIdentity,
}

/// Master error type for all survey record operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurveyError {
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{kind:?} not found with id {id}")]
    NotFound { kind: RecordKind, id: Uuid },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationError> for SurveyError {
    fn from(err: ValidationError) -> Self {
        SurveyError::Validation(vec![err])
    }
}

impl From<Vec<ValidationError>> for SurveyError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SurveyError::Validation(errors)
    }
}

impl From<StorageError> for SurveyError {
    fn from(err: StorageError) -> Self {
        match err {
            // A conflict caught at write time is reported exactly like one caught
            // by the pre-write uniqueness check.
            StorageError::IdentityConflict { kind, .. } => {
                let field = kind.body_field().unwrap_or("system");
                SurveyError::Validation(vec![ValidationError::AlreadyTaken {
                    field: field.to_string(),
                }])
            }
            other => SurveyError::Storage(other),
        }
    }
}

/// Result type for survey record operations.
pub type SurveyResult<T> = Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_identity_conflict() {
        let err = StorageError::IdentityConflict {
            kind: RecordKind::Star,
            key: "SOL|SOL".to_string(),
            existing: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Identity conflict"));
        assert!(msg.contains("Star"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_storage_error_display_lock_poisoned() {
        let msg = format!("{}", StorageError::LockPoisoned);
        assert!(msg.contains("lock poisoned"));
    }

    #[test]
    fn test_validation_error_field_and_message() {
        let err = ValidationError::AlreadyTaken {
            field: "star".to_string(),
        };
        assert_eq!(err.field(), "star");
        assert_eq!(err.message(), "has already been taken for this system");
        assert_eq!(
            format!("{}", err),
            "star has already been taken for this system"
        );

        let err = ValidationError::required("updater");
        assert_eq!(err.field(), "updater");
        assert_eq!(err.message(), "can't be blank");
    }

    #[test]
    fn test_identity_conflict_maps_to_body_field() {
        let err: SurveyError = StorageError::IdentityConflict {
            kind: RecordKind::World,
            key: "k".to_string(),
            existing: Uuid::nil(),
        }
        .into();
        assert_eq!(
            err,
            SurveyError::Validation(vec![ValidationError::AlreadyTaken {
                field: "world".to_string()
            }])
        );
    }

    #[test]
    fn test_survey_error_from_variants() {
        let err: SurveyError = StorageError::LockPoisoned.into();
        assert!(matches!(err, SurveyError::Storage(StorageError::LockPoisoned)));

        let err: SurveyError = AuthorizationError::MissingIdentity.into();
        assert!(matches!(err, SurveyError::Authorization(_)));

        let err: SurveyError = ValidationError::required("system").into();
        assert!(matches!(err, SurveyError::Validation(ref v) if v.len() == 1));
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = SurveyError::Validation(vec![
            ValidationError::required("system"),
            ValidationError::required("updater"),
        ]);
        let msg = format!("{}", err);
        assert!(msg.contains("system"));
        assert!(msg.contains("updater"));
    }
}
