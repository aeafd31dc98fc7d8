//! Audit events recorded for every queue mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobId, JobStatus, ListName, RequestTrigger};

/// Events emitted by the coordinator, written to the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A new job was submitted to the pending list.
    JobAdded {
        job_id: JobId,
        name: String,
        quantity: u32,
        copies: u32,
        timestamp: DateTime<Utc>,
    },
    /// A job was moved to the print-requested list.
    PrintRequested {
        job_id: JobId,
        trigger: RequestTrigger,
        timestamp: DateTime<Utc>,
    },
    /// A worker claimed a job.
    JobClaimed {
        job_id: JobId,
        agent_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A worker reported a successful print.
    JobPrinted {
        job_id: JobId,
        agent_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// A worker reported a failure and the job went back to pending.
    JobRequeued {
        job_id: JobId,
        agent_id: Option<String>,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Pending and print-requested lists were emptied.
    QueueCleared {
        pending: usize,
        requested: usize,
        timestamp: DateTime<Utc>,
    },
    /// The pending list was re-sequenced.
    QueueReordered {
        count: usize,
        timestamp: DateTime<Utc>,
    },
    /// A stored list could not be read and was reset to empty.
    ListReset {
        list: ListName,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    /// Writing a list failed; the mutation was not applied.
    SaveFailed {
        list: ListName,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// A job id was found in more than one list at startup.
    DuplicateRemoved {
        job_id: JobId,
        kept_in: ListName,
        removed_from: ListName,
        timestamp: DateTime<Utc>,
    },
    /// A stored record's status did not match its list and was reset.
    StatusRepaired {
        job_id: JobId,
        list: ListName,
        from: JobStatus,
        to: JobStatus,
        timestamp: DateTime<Utc>,
    },
}

impl AuditEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::JobAdded { timestamp, .. }
            | AuditEvent::PrintRequested { timestamp, .. }
            | AuditEvent::JobClaimed { timestamp, .. }
            | AuditEvent::JobPrinted { timestamp, .. }
            | AuditEvent::JobRequeued { timestamp, .. }
            | AuditEvent::QueueCleared { timestamp, .. }
            | AuditEvent::QueueReordered { timestamp, .. }
            | AuditEvent::ListReset { timestamp, .. }
            | AuditEvent::SaveFailed { timestamp, .. }
            | AuditEvent::DuplicateRemoved { timestamp, .. }
            | AuditEvent::StatusRepaired { timestamp, .. } => *timestamp,
        }
    }

    /// Get the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            AuditEvent::JobAdded { job_id, .. }
            | AuditEvent::PrintRequested { job_id, .. }
            | AuditEvent::JobClaimed { job_id, .. }
            | AuditEvent::JobPrinted { job_id, .. }
            | AuditEvent::JobRequeued { job_id, .. }
            | AuditEvent::DuplicateRemoved { job_id, .. }
            | AuditEvent::StatusRepaired { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }

    /// Get a one-line description of this event for the audit log.
    pub fn description(&self) -> String {
        match self {
            AuditEvent::JobAdded {
                job_id,
                name,
                quantity,
                copies,
                ..
            } => format!("Job added: {job_id} | {name} | quantity={quantity} | copies={copies}"),
            AuditEvent::PrintRequested {
                job_id, trigger, ..
            } => format!("Print requested ({trigger}): {job_id}"),
            AuditEvent::JobClaimed {
                job_id, agent_id, ..
            } => format!("Claim: {job_id} agent={agent_id}"),
            AuditEvent::JobPrinted {
                job_id, agent_id, ..
            } => format!(
                "Printed: {job_id} agent={}",
                agent_id.as_deref().unwrap_or("unknown")
            ),
            AuditEvent::JobRequeued { job_id, error, .. } => {
                let error = error.as_deref().unwrap_or("no error text");
                format!("Print failed: {job_id} requeued ({error})")
            }
            AuditEvent::QueueCleared {
                pending, requested, ..
            } => format!("Queue cleared: {pending} pending, {requested} requested"),
            AuditEvent::QueueReordered { count, .. } => {
                format!("Queue reordered: {count} items")
            }
            AuditEvent::ListReset { list, reason, .. } => {
                format!("ERROR load_{list}: {reason} (reset)")
            }
            AuditEvent::SaveFailed { list, error, .. } => format!("ERROR save_{list}: {error}"),
            AuditEvent::DuplicateRemoved {
                job_id,
                kept_in,
                removed_from,
                ..
            } => format!("Duplicate {job_id} removed from {removed_from}, kept in {kept_in}"),
            AuditEvent::StatusRepaired {
                job_id,
                list,
                from,
                to,
                ..
            } => format!("Status of {job_id} in {list} reset from {from} to {to}"),
        }
    }
}
