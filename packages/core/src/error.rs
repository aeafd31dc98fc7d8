//! Error types for job validation and lifecycle transitions.

use crate::{JobId, JobStatus};

/// A request was rejected before touching any queue state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid report status: {0:?}")]
    UnknownReportStatus(String),

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// A job was asked to move along an edge the lifecycle does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job {job_id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}
