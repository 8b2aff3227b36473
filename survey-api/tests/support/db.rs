use survey_api::db::{DbConfig, PgStore};

pub async fn test_pg_store() -> PgStore {
    let config = DbConfig::from_env();
    let store = PgStore::from_config(&config).expect("Failed to create Postgres store");
    store.bootstrap().await.expect("Failed to bootstrap schema");
    store
}
