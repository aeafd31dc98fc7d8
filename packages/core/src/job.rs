//! Print job record and its lifecycle.
//!
//! ```text
//! pending -> requested -> printing -> printed (terminal, dropped)
//!                                  -> failed -> pending (requeue)
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{TransitionError, ValidationError};

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a job ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s.trim())?))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current status of a job in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, waiting for an operator to request printing.
    #[default]
    Pending,
    /// Selected for printing, waiting for a worker claim.
    Requested,
    /// Claimed by a worker and being printed.
    Printing,
    /// Printed successfully. Never stored in a list.
    Printed,
    /// The last print attempt failed.
    Failed,
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Printed)
    }

    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Requested => "requested",
            JobStatus::Printing => "printing",
            JobStatus::Printed => "printed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which operator action moved a job into the print-requested list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestTrigger {
    /// The head of the pending list was requested.
    PrintNext,
    /// A specific job was picked out of the pending list.
    PrintSpecific,
}

impl RequestTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestTrigger::PrintNext => "print-next",
            RequestTrigger::PrintSpecific => "print-specific",
        }
    }
}

impl std::fmt::Display for RequestTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome a worker reports for a claimed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Success,
    Failed,
}

impl ReportOutcome {
    /// Wire value sent by agents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportOutcome::Success => "success",
            ReportOutcome::Failed => "failed",
        }
    }
}

impl FromStr for ReportOutcome {
    type Err = ValidationError;

    /// Accepts `success`, or `failed` / `error` / `requeue`, ignoring case
    /// and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(ReportOutcome::Success),
            "failed" | "error" | "requeue" => Ok(ReportOutcome::Failed),
            _ => Err(ValidationError::UnknownReportStatus(s.to_string())),
        }
    }
}

/// Fields a producer supplies when submitting a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Label text describing the print content.
    #[serde(default)]
    pub name: Option<String>,
    /// Unit count printed on the label.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Number of physical label copies.
    #[serde(default)]
    pub copies: Option<u32>,
}

impl JobRequest {
    pub fn new(name: impl Into<String>, quantity: u32, copies: u32) -> Self {
        Self {
            name: Some(name.into()),
            quantity: Some(quantity),
            copies: Some(copies),
        }
    }

    /// Check every field and build a fresh pending job.
    pub fn into_job(self) -> Result<PrintJob, ValidationError> {
        let name = self.name.ok_or(ValidationError::MissingField("name"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name",
                reason: "must not be blank".into(),
            });
        }
        let quantity = self.quantity.ok_or(ValidationError::MissingField("quantity"))?;
        let copies = self.copies.ok_or(ValidationError::MissingField("copies"))?;
        if copies == 0 {
            return Err(ValidationError::InvalidValue {
                field: "copies",
                reason: "must be at least 1".into(),
            });
        }

        Ok(PrintJob::new(name, quantity, copies))
    }
}

/// A label print job moving through the coordinator's lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    /// Unique identifier for this job.
    pub id: JobId,
    /// Label text describing the print content.
    pub name: String,
    /// Unit count printed on the label.
    pub quantity: u32,
    /// Number of physical label copies.
    pub copies: u32,
    /// Current status.
    pub status: JobStatus,
    /// When the job was submitted.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<RequestTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    /// Worker holding (or last holding) the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    /// Last failure message; survives the requeue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrintJob {
    /// Create a new pending job.
    pub fn new(name: impl Into<String>, quantity: u32, copies: u32) -> Self {
        Self {
            id: JobId::new(),
            name: name.into(),
            quantity,
            copies,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            requested_at: None,
            requested_by: None,
            claimed_at: None,
            agent_id: None,
            printed_at: None,
            failed_at: None,
            error: None,
        }
    }

    fn transition(&mut self, allowed: &[JobStatus], to: JobStatus) -> Result<(), TransitionError> {
        if !allowed.contains(&self.status) {
            return Err(TransitionError {
                job_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `pending -> requested`.
    ///
    /// Records written by older deployments may sit in the pending list
    /// with status `failed`; those are accepted too.
    pub fn request(&mut self, trigger: RequestTrigger) -> Result<(), TransitionError> {
        self.transition(&[JobStatus::Pending, JobStatus::Failed], JobStatus::Requested)?;
        self.requested_at = Some(Utc::now());
        self.requested_by = Some(trigger);
        Ok(())
    }

    /// `requested -> printing`, assigning the job to a worker.
    pub fn claim(&mut self, agent_id: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(&[JobStatus::Requested], JobStatus::Printing)?;
        self.claimed_at = Some(Utc::now());
        self.agent_id = Some(agent_id.into());
        Ok(())
    }

    /// `printing -> printed`.
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.transition(&[JobStatus::Printing], JobStatus::Printed)?;
        self.printed_at = Some(Utc::now());
        Ok(())
    }

    /// `printing -> failed`. A previous error is kept when none is supplied.
    pub fn fail(&mut self, error: Option<String>) -> Result<(), TransitionError> {
        self.transition(&[JobStatus::Printing], JobStatus::Failed)?;
        self.failed_at = Some(Utc::now());
        if let Some(error) = error.filter(|e| !e.trim().is_empty()) {
            self.error = Some(error);
        }
        Ok(())
    }

    /// `failed -> pending`, ready to be requested again.
    pub fn requeue(&mut self) -> Result<(), TransitionError> {
        self.transition(&[JobStatus::Failed], JobStatus::Pending)
    }

    /// Overwrite the status without checking the transition table. Returns
    /// the previous status when it differed.
    ///
    /// Only for repairing stored records whose status disagrees with the
    /// list holding them.
    pub fn force_status(&mut self, status: JobStatus) -> Option<JobStatus> {
        if self.status == status {
            return None;
        }
        Some(std::mem::replace(&mut self.status, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle_sets_timestamps() -> Result<(), TransitionError> {
        let mut job = PrintJob::new("Flyer", 1000, 5);
        assert_eq!(job.status, JobStatus::Pending);

        job.request(RequestTrigger::PrintNext)?;
        assert_eq!(job.status, JobStatus::Requested);
        assert!(job.requested_at.is_some());
        assert_eq!(job.requested_by, Some(RequestTrigger::PrintNext));

        job.claim("agent-1")?;
        assert_eq!(job.status, JobStatus::Printing);
        assert_eq!(job.agent_id.as_deref(), Some("agent-1"));
        assert!(job.claimed_at.is_some());

        job.complete()?;
        assert!(job.status.is_terminal());
        assert!(job.printed_at.is_some());
        Ok(())
    }

    #[test]
    fn failure_keeps_error_through_requeue() -> Result<(), TransitionError> {
        let mut job = PrintJob::new("Flyer", 10, 1);
        job.request(RequestTrigger::PrintSpecific)?;
        job.claim("agent-1")?;
        job.fail(Some("jammed".into()))?;
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.failed_at.is_some());

        job.requeue()?;
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.error.as_deref(), Some("jammed"));

        // A second failure without text keeps the earlier message.
        job.request(RequestTrigger::PrintNext)?;
        job.claim("agent-2")?;
        job.fail(None)?;
        assert_eq!(job.error.as_deref(), Some("jammed"));
        Ok(())
    }

    #[test]
    fn illegal_edges_are_rejected() {
        let mut job = PrintJob::new("Flyer", 10, 1);
        let err = job.claim("agent-1").unwrap_err();
        assert_eq!(err.from, JobStatus::Pending);
        assert_eq!(err.to, JobStatus::Printing);
        assert_eq!(job.status, JobStatus::Pending);

        assert!(job.complete().is_err());
        assert!(job.fail(None).is_err());
        assert!(job.requeue().is_err());
    }

    #[test]
    fn report_outcome_parsing() {
        assert_eq!("success".parse::<ReportOutcome>(), Ok(ReportOutcome::Success));
        assert_eq!(" SUCCESS ".parse::<ReportOutcome>(), Ok(ReportOutcome::Success));
        assert_eq!("failed".parse::<ReportOutcome>(), Ok(ReportOutcome::Failed));
        assert_eq!("Error".parse::<ReportOutcome>(), Ok(ReportOutcome::Failed));
        assert_eq!("requeue".parse::<ReportOutcome>(), Ok(ReportOutcome::Failed));
        assert!(matches!(
            "done".parse::<ReportOutcome>(),
            Err(ValidationError::UnknownReportStatus(_))
        ));
    }

    #[test]
    fn job_request_validation() {
        assert!(JobRequest::new("Flyer", 0, 1).into_job().is_ok());
        assert_eq!(
            JobRequest::new("   ", 1, 1).into_job().unwrap_err(),
            ValidationError::InvalidValue {
                field: "name",
                reason: "must not be blank".into()
            }
        );
        let missing = JobRequest {
            name: Some("Flyer".into()),
            quantity: None,
            copies: Some(1),
        };
        assert_eq!(
            missing.into_job().unwrap_err(),
            ValidationError::MissingField("quantity")
        );
        assert!(JobRequest::new("Flyer", 1, 0).into_job().is_err());
    }

    #[test]
    fn force_status_reports_previous_status() {
        let mut job = PrintJob::new("Flyer", 10, 2);
        assert_eq!(job.force_status(JobStatus::Pending), None);
        assert_eq!(job.force_status(JobStatus::Requested), Some(JobStatus::Pending));
        assert_eq!(job.status, JobStatus::Requested);
        assert!(job.claim("agent-1").is_ok());
    }

    #[test]
    fn optional_fields_are_omitted_on_the_wire() -> Result<(), serde_json::Error> {
        let job = PrintJob::new("Flyer", 10, 2);
        let value = serde_json::to_value(&job)?;
        assert_eq!(value["status"], "pending");
        assert!(value.get("agent_id").is_none());
        assert!(value.get("error").is_none());

        let back: PrintJob = serde_json::from_value(value)?;
        assert_eq!(back, job);
        Ok(())
    }
}
