use actors::CoordinatorError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use queue_core::{TransitionError, ValidationError};
use serde_json::json;

/// Error returned by every route handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid or missing API key")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Conflict(TransitionError),

    #[error("coordinator unavailable")]
    Unavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::MalformedBody(reason.into()))
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Validation(e) => ApiError::Validation(e),
            CoordinatorError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CoordinatorError::Transition(e) => ApiError::Conflict(e),
            CoordinatorError::Storage { .. } => {
                tracing::error!(error = %err, "storage failure");
                ApiError::Internal(err.to_string())
            }
            CoordinatorError::Unavailable(reason) => {
                tracing::error!(%reason, "coordinator unavailable");
                ApiError::Unavailable
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
