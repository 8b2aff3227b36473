//! Survey API Server Entry Point
//!
//! Bootstraps configuration, picks the record store and starts the Axum
//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use survey_api::constants::{DEFAULT_BIND_HOST, DEFAULT_PORT};
use survey_api::telemetry::{init_tracer, TelemetryConfig};
use survey_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbConfig, OwnershipConfig,
    PgStore, RecordService, StorageBackend,
};
use survey_storage::{InMemoryStore, RecordStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let backend = StorageBackend::from_env().map_err(ApiError::invalid_input)?;
    let store: Arc<dyn RecordStore> = match backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StorageBackend::Postgres => {
            let store = PgStore::from_config(&DbConfig::from_env())?;
            store.bootstrap().await?;
            Arc::new(store)
        }
    };

    let ownership = OwnershipConfig::from_env();
    let service = RecordService::new(store, ownership.guard());
    let api_config = ApiConfig::from_env();
    let app = create_api_router(AppState::new(service, api_config));

    let addr = resolve_bind_addr()?;
    tracing::info!(
        %addr,
        service = %telemetry_config.service_name,
        ?backend,
        "Starting survey API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("SURVEY_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("SURVEY_API_PORT").ok())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let port = port_str.parse::<u16>().map_err(|_| {
        ApiError::invalid_input(format!("Invalid port value: {}", port_str))
    })?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>().map_err(|e| {
        ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
    })
}
