//! Request and response bodies shared by the coordinator API and the agent.

use serde::{Deserialize, Serialize};

use crate::PrintJob;

/// Body of `POST /jobs/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<String>,
}

/// Body of `POST /agent/claim`. The body itself is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// Body of `POST /agent/report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub job_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic acknowledgement, optionally carrying the affected job or a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<PrintJob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            job: None,
            count: None,
        }
    }

    pub fn with_job(mut self, job: PrintJob) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Reply to `POST /agent/claim`: the claimed job itself, or a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimResponse {
    Claimed(Box<PrintJob>),
    Empty { message: String },
}

impl ClaimResponse {
    pub fn into_job(self) -> Option<PrintJob> {
        match self {
            ClaimResponse::Claimed(job) => Some(*job),
            ClaimResponse::Empty { .. } => None,
        }
    }
}
