//! Worker-facing routes.

use actors::{CoordinatorError, ReportAck};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use queue_core::wire::{ClaimRequest, ClaimResponse, MessageResponse, ReportRequest};
use queue_core::{JobId, ListName, ReportOutcome};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub const AGENT_ID_HEADER: &str = "x-agent-id";
pub const UNKNOWN_AGENT: &str = "unknown";

/// Pick the worker identity for a claim: body field, then `X-Agent-Id`,
/// then `"unknown"`. Blank values count as absent.
pub fn resolve_agent_id(body: Option<&ClaimRequest>, headers: &HeaderMap) -> String {
    let from_body = body.and_then(|b| b.agent_id.as_deref());
    let from_header = headers.get(AGENT_ID_HEADER).and_then(|v| v.to_str().ok());

    [from_body, from_header]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_AGENT)
        .to_string()
}

/// `POST /agent/claim`
pub async fn claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<Option<ClaimRequest>>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let agent_id = resolve_agent_id(body.as_ref(), &headers);

    let response = match state.coordinator.claim(agent_id).await? {
        Some(job) => ClaimResponse::Claimed(Box::new(job)),
        None => ClaimResponse::Empty {
            message: "none available".to_string(),
        },
    };
    Ok(Json(response))
}

/// `POST /agent/report`
///
/// The status is checked before the job is looked up, so a bad status is a
/// `400` even for an unknown job.
pub async fn report(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReportRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome: ReportOutcome = body.status.parse()?;
    let job_id = JobId::parse(&body.job_id)
        .map_err(|_| CoordinatorError::not_found(&body.job_id, ListName::InFlight))?;

    let message = match state.coordinator.report(job_id, outcome, body.error).await? {
        ReportAck::Printed(_) => "Reported success",
        ReportAck::Requeued(_) => "Reported failure, job requeued",
    };
    Ok(Json(MessageResponse::new(message)))
}
