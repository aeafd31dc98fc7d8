//! Message types for actor communication.

use queue_core::{JobId, JobRequest, ListName, PrintJob, ReportOutcome};
use ractor::RpcReplyPort;

use crate::error::CoordinatorResult;

/// Messages for the CoordinatorActor.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// Submit a new job to the pending list.
    Enqueue {
        request: JobRequest,
        reply: RpcReplyPort<CoordinatorResult<PrintJob>>,
    },

    /// Read the pending list.
    ListPending {
        reply: RpcReplyPort<CoordinatorResult<Vec<PrintJob>>>,
    },

    /// Empty the pending and print-requested lists.
    Clear {
        reply: RpcReplyPort<CoordinatorResult<ClearSummary>>,
    },

    /// Re-sequence the pending list.
    Reorder {
        ordered_ids: Vec<JobId>,
        reply: RpcReplyPort<CoordinatorResult<usize>>,
    },

    /// Request printing of the pending head.
    RequestNext {
        reply: RpcReplyPort<CoordinatorResult<Option<PrintJob>>>,
    },

    /// Request printing of a specific pending job.
    RequestSpecific {
        job_id: JobId,
        reply: RpcReplyPort<CoordinatorResult<PrintJob>>,
    },

    /// Hand the print-requested head to a worker.
    Claim {
        agent_id: String,
        reply: RpcReplyPort<CoordinatorResult<Option<PrintJob>>>,
    },

    /// Record a worker's outcome for a claimed job.
    Report {
        job_id: JobId,
        outcome: ReportOutcome,
        error: Option<String>,
        reply: RpcReplyPort<CoordinatorResult<ReportAck>>,
    },

    /// Read all three lists.
    Snapshot {
        reply: RpcReplyPort<CoordinatorResult<QueueSnapshot>>,
    },

    /// Stop the coordinator.
    Shutdown,
}

/// How a report was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportAck {
    /// The job printed and left the system.
    Printed(PrintJob),
    /// The job failed and was appended to the pending list.
    Requeued(PrintJob),
}

impl ReportAck {
    pub fn job(&self) -> &PrintJob {
        match self {
            ReportAck::Printed(job) | ReportAck::Requeued(job) => job,
        }
    }
}

/// Number of jobs removed by a clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub pending: usize,
    pub requested: usize,
}

/// Contents of every list at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    pub pending: Vec<PrintJob>,
    pub print_requested: Vec<PrintJob>,
    pub in_flight: Vec<PrintJob>,
}

impl QueueSnapshot {
    pub fn list(&self, list: ListName) -> &[PrintJob] {
        match list {
            ListName::Pending => &self.pending,
            ListName::PrintRequested => &self.print_requested,
            ListName::InFlight => &self.in_flight,
        }
    }

    /// Total jobs across all lists.
    pub fn total(&self) -> usize {
        self.pending.len() + self.print_requested.len() + self.in_flight.len()
    }

    /// List holding `job_id`, if any.
    pub fn locate(&self, job_id: JobId) -> Option<ListName> {
        ListName::ALL
            .into_iter()
            .find(|list| self.list(*list).iter().any(|j| j.id == job_id))
    }
}
