//! Authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::caller::{authenticate, API_KEY_HEADER};

/// Rejects requests without a valid `X-API-Key` and stores the resolved
/// `Caller` in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(api_key) = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return ApiError::Unauthorized("Invalid or missing API key".to_string()).into_response();
    };

    match authenticate(state.stores.access.as_ref(), &api_key).await {
        Ok(caller) => {
            tracing::debug!(user_id = caller.user_id, "Authenticated caller");
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
