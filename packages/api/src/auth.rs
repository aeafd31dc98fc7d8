use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `X-API-Key` header does not match the shared secret.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.api_key());

    if !authorized {
        tracing::debug!(path = %req.uri().path(), "rejected request without valid API key");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}
