//! Operator-facing job routes.

use actors::CoordinatorError;
use axum::Json;
use axum::extract::{Path, State};
use queue_core::wire::{MessageResponse, ReorderRequest};
use queue_core::{JobId, JobRequest, ListName, PrintJob};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// `GET /jobs`: the pending list in order.
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<PrintJob>>, ApiError> {
    Ok(Json(state.coordinator.list_pending().await?))
}

/// `POST /jobs`
pub async fn add_job(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JobRequest>,
) -> Result<Json<PrintJob>, ApiError> {
    let job = state.coordinator.enqueue(request).await?;
    Ok(Json(job))
}

/// `POST /jobs/clear`
pub async fn clear_jobs(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let summary = state.coordinator.clear().await?;
    tracing::debug!(pending = summary.pending, requested = summary.requested, "queue cleared");
    Ok(Json(MessageResponse::new("Queue cleared")))
}

/// `POST /jobs/reorder`
///
/// Ids that do not parse cannot name a pending job and are dropped like any
/// other unknown id.
pub async fn reorder_jobs(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ReorderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let ordered_ids: Vec<JobId> = request
        .ordered_ids
        .iter()
        .filter_map(|id| JobId::parse(id).ok())
        .collect();

    let count = state.coordinator.reorder(ordered_ids).await?;
    Ok(Json(MessageResponse::new("Queue reordered").with_count(count)))
}

/// `POST /jobs/print-next`
pub async fn print_next(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let response = match state.coordinator.request_next().await? {
        Some(job) => MessageResponse::new("Print requested").with_job(job),
        None => MessageResponse::new("Queue empty"),
    };
    Ok(Json(response))
}

/// `POST /jobs/{job_id}/print`
pub async fn print_specific(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let job_id = JobId::parse(&job_id)
        .map_err(|_| CoordinatorError::not_found(&job_id, ListName::Pending))?;

    let job = state.coordinator.request_specific(job_id).await?;
    Ok(Json(MessageResponse::new("Print requested").with_job(job)))
}
