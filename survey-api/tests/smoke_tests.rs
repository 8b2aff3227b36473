//! End-to-end smoke tests for the Postgres record store.
//!
//! Run with `--features db-tests` against a database configured through the
//! `SURVEY_DB_*` variables.

#![cfg(feature = "db-tests")]

use std::sync::Arc;

use serde_json::json;
use survey_api::{ApiResult, RecordService};
use survey_core::{FilterSet, OwnershipGuard, RecordKind, SortOrder, SurveyError};
use survey_storage::RecordStore;
use survey_test_utils::*;

#[path = "support/db.rs"]
mod db_support;
use db_support::test_pg_store;

/// A system name no other run has used.
fn fresh_system() -> String {
    format!("Smoke {}", uuid::Uuid::now_v7().simple())
}

#[tokio::test]
async fn smoke_test_full_crud_chain() -> ApiResult<()> {
    let store = test_pg_store().await;
    let service = RecordService::new(Arc::new(store), OwnershipGuard::default());
    let system = fresh_system();

    let world = service
        .create(RecordKind::World, &world_payload(&system, "Smoke 1"), &finwen())
        .await?;
    assert_eq!(world.owner.as_deref(), Some(FINWEN));

    let survey = service
        .create(RecordKind::Survey, &survey_document(world.id, "Iron"), &finwen())
        .await?;
    assert_eq!(survey.world_id, Some(world.id));
    assert_eq!(survey.attributes["iron"], 5);

    let flagged = service
        .update(
            RecordKind::Survey,
            survey.id,
            &json!({ "error_flag": true }),
            &dommaarraa(),
        )
        .await?;
    assert_eq!(flagged.attributes["error_flag"], true);
    assert_eq!(flagged.updaters.entries(), [FINWEN, DOMMAARRAA]);
    assert!(flagged.updated_at >= survey.updated_at);
    assert_eq!(flagged.created_at, survey.created_at);

    let filter = FilterSet::from_params(
        RecordKind::Survey,
        [("world_id", world.id.to_string()), ("commander", "finwen".to_string())],
    );
    let listed = service.list(&filter, &SortOrder::default()).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, survey.id);

    service.delete(RecordKind::Survey, survey.id, &finwen()).await?;
    service.delete(RecordKind::World, world.id, &finwen()).await?;
    assert!(service.get(RecordKind::World, world.id).await.is_err());
    Ok(())
}

#[tokio::test]
async fn smoke_test_identity_conflict() -> ApiResult<()> {
    let store = test_pg_store().await;
    let system = fresh_system();

    let mut first = star_record(&system, Some("A"), FINWEN);
    first.updaters.record_update(Some(FINWEN));
    let first = store.insert(&first).await?;

    // The unique index catches the race the service-level check cannot.
    let mut second = star_record(&format!("  {} ", system.to_uppercase()), Some("a"), DOMMAARRAA);
    second.updaters.record_update(Some(DOMMAARRAA));
    let err = store.insert(&second).await.unwrap_err();
    assert!(matches!(
        SurveyError::from(err),
        SurveyError::Validation(_)
    ));

    assert!(store.delete(RecordKind::Star, first.id).await?);
    assert!(!store.delete(RecordKind::Star, first.id).await?);
    Ok(())
}

#[tokio::test]
async fn smoke_test_health_check() -> ApiResult<()> {
    let store = test_pg_store().await;
    assert!(store.health_check().await?);
    Ok(())
}
