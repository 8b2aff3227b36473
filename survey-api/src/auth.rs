//! Acting Identity
//!
//! Writes are attributed to the commander named in the `X-Commander` header.
//! A bearer token matching one of the configured admin tokens marks the
//! caller as privileged, which bypasses ownership checks.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use survey_core::Actor;

use crate::config::ApiConfig;
use crate::constants::COMMANDER_HEADER;
use crate::error::{ApiError, ApiResult};

/// Resolve the acting identity from raw header values.
///
/// Returns an anonymous actor when neither header is present; callers that
/// need an identity reject that case themselves.
pub fn authenticate(
    config: &ApiConfig,
    commander_header: Option<&str>,
    auth_header: Option<&str>,
) -> ApiResult<Actor> {
    let name = commander_header
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let Some(auth_value) = auth_header else {
        return Ok(Actor {
            name,
            privileged: false,
        });
    };

    let Some(token) = auth_value.strip_prefix("Bearer ") else {
        return Err(ApiError::unauthorized(
            "Authorization header must use Bearer scheme",
        ));
    };
    if !config.is_admin_token(token.trim()) {
        return Err(ApiError::unauthorized("Invalid admin token"));
    }
    Ok(Actor::privileged(name))
}

/// Extractor for the acting identity of a write.
///
/// Rejects with 401 when the request names no commander and carries no
/// admin token.
#[derive(Debug, Clone)]
pub struct ActorExtractor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for ActorExtractor
where
    S: Send + Sync,
    Arc<ApiConfig>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<ApiConfig>::from_ref(state);
        let commander = parts
            .headers
            .get(COMMANDER_HEADER)
            .and_then(|v| v.to_str().ok());
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let actor = authenticate(&config, commander, auth)?;
        if !actor.is_identified() {
            return Err(ApiError::unauthorized(
                "Commander required: provide the X-Commander header",
            ));
        }
        tracing::debug!(commander = ?actor.name(), privileged = actor.privileged, "actor resolved");
        Ok(ActorExtractor(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn config() -> ApiConfig {
        ApiConfig {
            admin_tokens: vec!["s3cret".to_string()],
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_commander_header_names_actor() {
        let actor = authenticate(&config(), Some("  Finwen "), None).unwrap();
        assert_eq!(actor.name(), Some("Finwen"));
        assert!(!actor.privileged);
    }

    #[test]
    fn test_missing_headers_is_anonymous() {
        let actor = authenticate(&config(), Some("   "), None).unwrap();
        assert!(!actor.is_identified());
    }

    #[test]
    fn test_admin_token_is_privileged() {
        let actor = authenticate(&config(), None, Some("Bearer s3cret")).unwrap();
        assert!(actor.privileged);
        assert!(actor.is_identified());

        let actor = authenticate(&config(), Some("Marlon Blake"), Some("Bearer s3cret")).unwrap();
        assert_eq!(actor.name(), Some("Marlon Blake"));
    }

    #[test]
    fn test_bad_tokens_rejected() {
        let err = authenticate(&config(), Some("Finwen"), Some("Bearer nope")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = authenticate(&config(), None, Some("Basic s3cret")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
