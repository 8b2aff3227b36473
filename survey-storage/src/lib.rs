//! Survey Storage - Record store abstraction
//!
//! Defines the persistence seam for survey records. The in-memory store in
//! this crate backs tests and single-node deployments; the Postgres store
//! lives in survey-api.

pub mod guard;
pub mod memory;

pub use guard::check_unique;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use survey_core::{FilterSet, IdentityKey, Record, RecordId, RecordKind, SortOrder, StorageError};

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for survey records.
///
/// Implementations must enforce identity-key uniqueness themselves: the
/// service-level check runs before the write and is not atomic with it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, assigning its insertion sequence.
    async fn insert(&self, record: &Record) -> StorageResult<Record>;

    /// Get a record by kind and id.
    async fn get(&self, kind: RecordKind, id: RecordId) -> StorageResult<Option<Record>>;

    /// Replace a stored record. Returns `None` when it no longer exists.
    async fn update(&self, record: &Record) -> StorageResult<Option<Record>>;

    /// Delete a record. Returns whether anything was removed.
    async fn delete(&self, kind: RecordKind, id: RecordId) -> StorageResult<bool>;

    /// All records matching `filter`, in `order`.
    async fn list(&self, filter: &FilterSet, order: &SortOrder) -> StorageResult<Vec<Record>>;

    /// Id of a record holding `key`, other than `exclude`.
    async fn find_identity(
        &self,
        key: &IdentityKey,
        exclude: Option<RecordId>,
    ) -> StorageResult<Option<RecordId>>;

    /// Backend liveness.
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }
}
