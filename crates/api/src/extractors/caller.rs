//! Caller authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::services::{AccessPolicy, Caller};
use shared::crypto::{is_well_formed_key, sha256_hex};

use crate::app::AppState;
use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Resolves a raw API key to its caller.
pub async fn authenticate(access: &dyn AccessPolicy, api_key: &str) -> Result<Caller, ApiError> {
    if !is_well_formed_key(api_key) {
        return Err(ApiError::Unauthorized(
            "Invalid or missing API key".to_string(),
        ));
    }

    access
        .authenticate(&sha256_hex(api_key))
        .await
        .map_err(|e| {
            tracing::error!("Store error during API key lookup: {}", e);
            ApiError::ServiceUnavailable("Authentication service unavailable".to_string())
        })?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))
}

/// The authenticated caller of a request.
///
/// Reuses the caller placed in the extensions by `require_auth`, and
/// otherwise validates the `X-API-Key` header itself.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(AuthenticatedCaller(caller.clone()));
        }

        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        authenticate(state.stores.access.as_ref(), api_key)
            .await
            .map(AuthenticatedCaller)
    }
}
