//! OpenAPI Specification for the Survey API
//!
//! This module defines the OpenAPI document for the survey records REST API.
//! It uses utoipa to generate the specification from Rust types and route
//! annotations.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, star, survey, world};
use crate::types::{DumpChecksum, ListResponse, RecordResponse};
use survey_core::RecordKind;

/// OpenAPI document for the Survey API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Survey Records API",
        version = "0.4.0",
        description = "Crowd-sourced stars, worlds and resource surveys with normalized identity, audit trail and commander ownership",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Stars", description = "Stars, unique per system and designation"),
        (name = "Worlds", description = "Worlds, unique per system and designation"),
        (name = "Surveys", description = "Resource surveys owned by the commander who took them"),
        (name = "Health", description = "Liveness and readiness"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Star Routes ===
        star::list_stars,
        star::create_star,
        star::get_star,
        star::update_star,
        star::delete_star,
        star::download_stars,
        star::stars_md5,

        // === World Routes ===
        world::list_worlds,
        world::create_world,
        world::get_world,
        world::update_world,
        world::delete_world,
        world::list_world_surveys,
        world::create_world_survey,
        world::download_worlds,
        world::worlds_md5,

        // === Survey Routes ===
        survey::list_surveys,
        survey::create_survey,
        survey::get_survey,
        survey::update_survey,
        survey::delete_survey,
        survey::download_surveys,
        survey::surveys_md5,

        // === Health & Metrics ===
        health::ping,
        health::readiness,
        crate::telemetry::metrics::metrics_handler,
    ),
    components(
        schemas(
            ApiError, ErrorCode,
            RecordKind, RecordResponse, ListResponse, DumpChecksum,
            health::ReadinessReport, health::HealthStatus,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the acting-identity security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "commander",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Commander"))),
            );

            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Configured admin token; bypasses ownership checks"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Survey Records API");

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("commander"));
        assert!(components.security_schemes.contains_key("admin_token"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/api/v1/stars"));
        assert!(paths.contains_key("/api/v1/stars/{id}"));
        assert!(paths.contains_key("/api/v1/worlds"));
        assert!(paths.contains_key("/api/v1/worlds/{world_id}/surveys"));
        assert!(paths.contains_key("/api/v1/surveys/{id}"));
        assert!(paths.contains_key("/api/v1/stars/download"));
        assert!(paths.contains_key("/api/v1/surveys/md5"));
        assert!(paths.contains_key("/health/ready"));
        assert!(!paths.contains_key("/health/live"));
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("\"commander\""));
        Ok(())
    }
}
