//! In-memory record store.

use crate::{RecordStore, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use survey_core::{
    FilterSet, IdentityKey, Record, RecordId, RecordKind, SortOrder, StorageError,
};

/// Record store backed by a `HashMap` behind a `RwLock`.
///
/// Identity uniqueness is enforced under the write lock, which makes it the
/// final authority for this backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<RecordId, Record>>>,
    sequence: Arc<AtomicI64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of every kind.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Drop every record.
    pub fn clear(&self) -> StorageResult<()> {
        self.records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }
}

fn holder_of(
    records: &HashMap<RecordId, Record>,
    key: &IdentityKey,
    exclude: Option<RecordId>,
) -> Option<RecordId> {
    records
        .values()
        .filter(|r| r.kind == key.kind && Some(r.id) != exclude)
        .find(|r| r.identity_key().as_ref() == Some(key))
        .map(|r| r.id)
}

fn conflict(key: &IdentityKey, existing: RecordId) -> StorageError {
    StorageError::IdentityConflict {
        kind: key.kind,
        key: key.encoded(),
        existing,
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, record: &Record) -> StorageResult<Record> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        if records.contains_key(&record.id) {
            return Err(StorageError::InsertFailed {
                kind: record.kind,
                reason: "already exists".to_string(),
            });
        }
        if let Some(key) = record.identity_key() {
            if let Some(existing) = holder_of(&records, &key, None) {
                return Err(conflict(&key, existing));
            }
        }

        let mut stored = record.clone();
        stored.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, kind: RecordKind, id: RecordId) -> StorageResult<Option<Record>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(&id).filter(|r| r.kind == kind).cloned())
    }

    async fn update(&self, record: &Record) -> StorageResult<Option<Record>> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(current) = records.get(&record.id).filter(|r| r.kind == record.kind) else {
            return Ok(None);
        };
        let sequence = current.sequence;
        let created_at = current.created_at;

        if let Some(key) = record.identity_key() {
            if let Some(existing) = holder_of(&records, &key, Some(record.id)) {
                return Err(conflict(&key, existing));
            }
        }

        let mut stored = record.clone();
        stored.sequence = sequence;
        stored.created_at = created_at;
        records.insert(stored.id, stored.clone());
        Ok(Some(stored))
    }

    async fn delete(&self, kind: RecordKind, id: RecordId) -> StorageResult<bool> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        if records.get(&id).map_or(false, |r| r.kind == kind) {
            records.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list(&self, filter: &FilterSet, order: &SortOrder) -> StorageResult<Vec<Record>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut matched: Vec<Record> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        drop(records);
        order.sort(&mut matched);
        Ok(matched)
    }

    async fn find_identity(
        &self,
        key: &IdentityKey,
        exclude: Option<RecordId>,
    ) -> StorageResult<Option<RecordId>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(holder_of(&records, key, exclude))
    }
}
