//! Uniqueness guard.

use crate::RecordStore;
use survey_core::{IdentityKey, RecordId, SurveyError, SurveyResult, ValidationError};

/// Reject a write when another record of the same kind holds `key`.
///
/// `exclude` is the id of the record being written, so an update never
/// conflicts with itself. The conflict is reported on the kind's body field.
pub async fn check_unique(
    store: &dyn RecordStore,
    key: &IdentityKey,
    exclude: Option<RecordId>,
) -> SurveyResult<()> {
    match store.find_identity(key, exclude).await? {
        None => Ok(()),
        Some(existing) => {
            tracing::debug!(kind = %key.kind, key = %key, %existing, "identity already taken");
            let field = key.kind.body_field().unwrap_or("system");
            Err(SurveyError::Validation(vec![ValidationError::AlreadyTaken {
                field: field.to_string(),
            }]))
        }
    }
}
