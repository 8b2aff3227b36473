//! Record Service
//!
//! Write path for stars, worlds and surveys. Every create and update runs
//! the same steps in order: flatten the payload, check ownership, apply
//! attributes, validate, check identity uniqueness, append the acting
//! contributor to the audit trail, then persist.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use survey_core::{
    display_name, normalize_payload, record_update, submitted_fields, Actor, Attributes,
    AuthorizationError, FilterSet, OwnershipGuard, Record, RecordId, RecordKind, SortOrder,
    SurveyError, SurveyResult, ValidationError,
};
use survey_storage::{check_unique, RecordStore};

use crate::telemetry::record_write;

/// Default date attribute stamped on new surveys.
pub const SURVEYED_AT: &str = "surveyed_at";

/// Business logic for survey records over any [`RecordStore`].
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    guard: OwnershipGuard,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, guard: OwnershipGuard) -> Self {
        Self { store, guard }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn guard(&self) -> &OwnershipGuard {
        &self.guard
    }

    /// Records of the filter's kind, in `order`.
    pub async fn list(&self, filter: &FilterSet, order: &SortOrder) -> SurveyResult<Vec<Record>> {
        Ok(self.store.list(filter, order).await?)
    }

    pub async fn get(&self, kind: RecordKind, id: RecordId) -> SurveyResult<Record> {
        self.store
            .get(kind, id)
            .await?
            .ok_or(SurveyError::NotFound { kind, id })
    }

    /// Create a record from a request body in any accepted shape.
    pub async fn create(
        &self,
        kind: RecordKind,
        payload: &JsonValue,
        actor: &Actor,
    ) -> SurveyResult<Record> {
        let attrs = normalize_payload(kind, payload);
        self.create_from_attributes(kind, attrs, actor).await
    }

    /// Create a record from an already flattened attribute set.
    pub async fn create_from_attributes(
        &self,
        kind: RecordKind,
        attrs: Attributes,
        actor: &Actor,
    ) -> SurveyResult<Record> {
        if !actor.is_identified() {
            return Err(AuthorizationError::MissingIdentity.into());
        }

        let now = Utc::now();
        let mut record = Record::new(kind, now);
        record.apply_attributes(&attrs)?;

        // Only a privileged caller may create on someone else's behalf.
        let acting = actor.name().and_then(display_name);
        if acting.is_some() && (!actor.privileged || record.owner.is_none()) {
            record.owner = acting.clone();
        }
        if kind == RecordKind::Survey && !record.attributes.contains_key(SURVEYED_AT) {
            record.attributes.insert(
                SURVEYED_AT.to_string(),
                JsonValue::String(now.format("%Y-%m-%d").to_string()),
            );
        }

        record.validate()?;
        self.check_world(&record).await?;
        if let Some(key) = record.identity_key() {
            check_unique(self.store.as_ref(), &key, None).await?;
        }

        let contributor = acting.or_else(|| record.owner.clone());
        record_update(&mut record, contributor.as_deref());

        let saved = self.store.insert(&record).await;
        outcome(kind, "create", &saved);
        let saved = saved?;
        tracing::info!(kind = %kind, id = %saved.id, creator = ?saved.creator(), "record created");
        Ok(saved)
    }

    /// Apply a partial change to an existing record.
    pub async fn update(
        &self,
        kind: RecordKind,
        id: RecordId,
        payload: &JsonValue,
        actor: &Actor,
    ) -> SurveyResult<Record> {
        let mut record = self.get(kind, id).await?;

        let mut attrs = normalize_payload(kind, payload);
        if kind == RecordKind::Survey {
            // The commander of a survey never changes.
            attrs.remove(kind.owner_field());
        }
        let changed = submitted_fields(&attrs);

        if kind.is_owner_protected() {
            let granted = self
                .guard
                .authorize_change(record.owner.as_deref(), actor, &changed)?;
            tracing::debug!(kind = %kind, %id, ?granted, "change authorized");
        } else if !actor.is_identified() {
            return Err(AuthorizationError::MissingIdentity.into());
        }

        let previous_key = record.identity_key();
        record.apply_attributes(&attrs)?;

        // Stars and worlds carry their last updater; a privileged caller
        // may name one explicitly.
        let acting = actor.name().and_then(display_name);
        let named = actor.privileged && changed.contains(kind.owner_field());
        if !kind.is_owner_protected() && acting.is_some() && !named {
            record.owner = acting.clone();
        }
        let contributor = match acting {
            Some(name) => Some(name),
            None if named => record.owner.clone(),
            None => None,
        };

        record.validate()?;
        self.check_world(&record).await?;
        if let Some(key) = record.identity_key() {
            if previous_key.as_ref() != Some(&key) {
                check_unique(self.store.as_ref(), &key, Some(id)).await?;
            }
        }

        record_update(&mut record, contributor.as_deref());
        record.updated_at = Utc::now();

        let saved = self.store.update(&record).await;
        outcome(kind, "update", &saved);
        let saved = saved?.ok_or(SurveyError::NotFound { kind, id })?;
        tracing::info!(kind = %kind, %id, updaters = saved.updaters.len(), "record updated");
        Ok(saved)
    }

    pub async fn delete(&self, kind: RecordKind, id: RecordId, actor: &Actor) -> SurveyResult<()> {
        let record = self.get(kind, id).await?;

        if kind.is_owner_protected() {
            self.guard.authorize_delete(record.owner.as_deref(), actor)?;
        } else if !actor.is_identified() {
            return Err(AuthorizationError::MissingIdentity.into());
        }

        let deleted = self.store.delete(kind, id).await;
        outcome(kind, "delete", &deleted);
        if !deleted? {
            return Err(SurveyError::NotFound { kind, id });
        }
        tracing::info!(kind = %kind, %id, "record deleted");
        Ok(())
    }

    /// A survey must point at a world that exists.
    async fn check_world(&self, record: &Record) -> SurveyResult<()> {
        if record.kind != RecordKind::Survey {
            return Ok(());
        }
        let Some(world_id) = record.world_id else {
            return Ok(());
        };
        match self.store.get(RecordKind::World, world_id).await? {
            Some(_) => Ok(()),
            None => Err(ValidationError::MissingAssociation {
                field: "world".to_string(),
            }
            .into()),
        }
    }
}

fn outcome<T, E>(kind: RecordKind, operation: &str, result: &Result<T, E>) {
    record_write(kind, operation, if result.is_ok() { "ok" } else { "error" });
}
