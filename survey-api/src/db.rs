//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres and a
//! [`RecordStore`] implementation over a single `survey_records` table.
//! The unique index on `(kind, identity_key)` is the final authority for
//! star and world identity.

use crate::error::{ApiError, ApiResult};
use crate::query::{order_by, sql_params, ListFilter, SqlParam};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use serde_json::Value as JsonValue;
use std::time::Duration;
use survey_core::{
    AuditTrail, Attributes, FilterSet, IdentityKey, Record, RecordId, RecordKind, SortOrder,
    StorageError, Timestamp,
};
use survey_storage::{RecordStore, StorageResult};
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "survey".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SURVEY_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("SURVEY_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("SURVEY_DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("SURVEY_DB_USER").unwrap_or(defaults.user),
            password: std::env::var("SURVEY_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SURVEY_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            timeout: std::env::var("SURVEY_DB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Idempotent bootstrap for the record table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS survey_records (
    id            UUID PRIMARY KEY,
    kind          TEXT NOT NULL,
    seq           BIGSERIAL,
    system        TEXT,
    body          TEXT,
    owner         TEXT,
    resource      TEXT,
    world_id      UUID,
    basecamp_id   UUID,
    system_id     UUID,
    identity_key  TEXT,
    attributes    JSONB NOT NULL DEFAULT '{}'::jsonb,
    updaters      JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS survey_records_identity_idx
    ON survey_records (kind, identity_key) WHERE identity_key IS NOT NULL;
CREATE INDEX IF NOT EXISTS survey_records_kind_updated_idx
    ON survey_records (kind, updated_at, seq);
CREATE INDEX IF NOT EXISTS survey_records_world_idx
    ON survey_records (world_id) WHERE world_id IS NOT NULL;
"#;

const COLUMNS: &str = "id, kind, seq, system, body, owner, resource, world_id, basecamp_id, \
                       system_id, attributes, updaters, created_at, updated_at";

// ============================================================================
// POSTGRES STORE
// ============================================================================

/// Record store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Create the record table and indexes if missing.
    pub async fn bootstrap(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(backend)?;
        tracing::info!("survey_records schema ready");
        Ok(())
    }

    async fn get_conn(&self) -> StorageResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(backend)
    }

    /// Parameters shared by insert and update, in column order starting at `$1 = id`.
    fn write_params(record: &Record) -> StorageResult<Vec<SqlParam>> {
        let updaters = serde_json::to_value(&record.updaters).map_err(backend)?;
        Ok(vec![
            SqlParam::Uuid(record.id),
            SqlParam::String(record.kind.as_str().to_string()),
            SqlParam::OptString(record.system.clone()),
            SqlParam::OptString(record.body.clone()),
            SqlParam::OptString(record.owner.clone()),
            SqlParam::OptString(record.resource.clone()),
            SqlParam::OptUuid(record.world_id),
            SqlParam::OptUuid(record.basecamp_id),
            SqlParam::OptUuid(record.system_id),
            SqlParam::OptString(record.identity_key().map(|k| k.encoded())),
            SqlParam::Json(JsonValue::Object(record.attributes.clone())),
            SqlParam::Json(updaters),
            SqlParam::Timestamp(record.created_at),
            SqlParam::Timestamp(record.updated_at),
        ])
    }

    /// Translate a unique violation into an identity conflict.
    async fn write_error(&self, record: &Record, err: tokio_postgres::Error) -> StorageError {
        if err.code() != Some(&SqlState::UNIQUE_VIOLATION) {
            return backend(err);
        }
        let Some(key) = record.identity_key() else {
            return backend(err);
        };
        let existing = self
            .find_identity(&key, Some(record.id))
            .await
            .ok()
            .flatten()
            .unwrap_or_else(uuid::Uuid::nil);
        StorageError::IdentityConflict {
            kind: record.kind,
            key: key.encoded(),
            existing,
        }
    }
}

fn backend(err: impl std::fmt::Display) -> StorageError {
    tracing::error!("Database error: {}", err);
    StorageError::Backend {
        reason: err.to_string(),
    }
}

fn record_from_row(row: &Row) -> StorageResult<Record> {
    let kind: String = row.try_get("kind").map_err(backend)?;
    let kind: RecordKind = kind.parse().map_err(backend)?;
    let attributes: JsonValue = row.try_get("attributes").map_err(backend)?;
    let updaters: JsonValue = row.try_get("updaters").map_err(backend)?;
    let updaters: AuditTrail = serde_json::from_value(updaters).map_err(backend)?;
    let created_at: Timestamp = row.try_get("created_at").map_err(backend)?;
    let updated_at: Timestamp = row.try_get("updated_at").map_err(backend)?;

    Ok(Record {
        id: row.try_get("id").map_err(backend)?,
        kind,
        system: row.try_get("system").map_err(backend)?,
        body: row.try_get("body").map_err(backend)?,
        owner: row.try_get("owner").map_err(backend)?,
        resource: row.try_get("resource").map_err(backend)?,
        world_id: row.try_get("world_id").map_err(backend)?,
        basecamp_id: row.try_get("basecamp_id").map_err(backend)?,
        system_id: row.try_get("system_id").map_err(backend)?,
        attributes: match attributes {
            JsonValue::Object(map) => map,
            _ => Attributes::new(),
        },
        updaters,
        created_at,
        updated_at,
        sequence: row.try_get("seq").map_err(backend)?,
    })
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, record: &Record) -> StorageResult<Record> {
        let conn = self.get_conn().await?;
        let params = Self::write_params(record)?;
        let sql = format!(
            "INSERT INTO survey_records (id, kind, system, body, owner, resource, world_id, \
             basecamp_id, system_id, identity_key, attributes, updaters, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {}",
            COLUMNS
        );
        match conn.query_one(&sql, &sql_params(&params)).await {
            Ok(row) => record_from_row(&row),
            Err(err) => Err(self.write_error(record, err).await),
        }
    }

    async fn get(&self, kind: RecordKind, id: RecordId) -> StorageResult<Option<Record>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {} FROM survey_records WHERE id = $1 AND kind = $2",
            COLUMNS
        );
        let row = conn
            .query_opt(&sql, &[&id, &kind.as_str()])
            .await
            .map_err(backend)?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn update(&self, record: &Record) -> StorageResult<Option<Record>> {
        let conn = self.get_conn().await?;
        let mut params = Self::write_params(record)?;
        // created_at is never rewritten.
        params.remove(12);
        let sql = format!(
            "UPDATE survey_records SET system = $3, body = $4, owner = $5, resource = $6, \
             world_id = $7, basecamp_id = $8, system_id = $9, identity_key = $10, \
             attributes = $11, updaters = $12, updated_at = $13 \
             WHERE id = $1 AND kind = $2 RETURNING {}",
            COLUMNS
        );
        match conn.query_opt(&sql, &sql_params(&params)).await {
            Ok(row) => row.as_ref().map(record_from_row).transpose(),
            Err(err) => Err(self.write_error(record, err).await),
        }
    }

    async fn delete(&self, kind: RecordKind, id: RecordId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM survey_records WHERE id = $1 AND kind = $2",
                &[&id, &kind.as_str()],
            )
            .await
            .map_err(backend)?;
        Ok(deleted > 0)
    }

    async fn list(&self, filter: &FilterSet, order: &SortOrder) -> StorageResult<Vec<Record>> {
        let conn = self.get_conn().await?;
        let (where_clause, params) = filter.build_where();
        let sql = format!(
            "SELECT {} FROM survey_records WHERE {} ORDER BY {}",
            COLUMNS,
            where_clause.unwrap_or_else(|| "TRUE".to_string()),
            order_by(order)
        );
        let rows = conn
            .query(&sql, &sql_params(&params))
            .await
            .map_err(backend)?;
        rows.iter().map(record_from_row).collect()
    }

    async fn find_identity(
        &self,
        key: &IdentityKey,
        exclude: Option<RecordId>,
    ) -> StorageResult<Option<RecordId>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id FROM survey_records \
                 WHERE kind = $1 AND identity_key = $2 AND ($3::uuid IS NULL OR id <> $3) \
                 LIMIT 1",
                &[&key.kind.as_str(), &key.encoded(), &exclude],
            )
            .await
            .map_err(backend)?;
        row.map(|r| r.try_get::<_, RecordId>("id").map_err(backend))
            .transpose()
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(backend)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "survey");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_write_params_order() {
        let mut record = Record::new(RecordKind::Star, chrono::Utc::now());
        record.system = Some("Sol".to_string());
        record.body = Some("Sol".to_string());
        let params = PgStore::write_params(&record).unwrap();
        assert_eq!(params.len(), 14);
        assert!(matches!(&params[1], SqlParam::String(kind) if kind == "star"));
        assert!(matches!(&params[9], SqlParam::OptString(Some(key)) if key.starts_with("SOL")));
    }

    #[test]
    fn test_schema_is_idempotent() {
        assert!(SCHEMA.contains("CREATE TABLE IF NOT EXISTS survey_records"));
        assert!(SCHEMA.contains("CREATE UNIQUE INDEX IF NOT EXISTS"));
    }
}
