//! Core domain types for the print job queue.
//!
//! This crate contains shared types used across all packages:
//! - PrintJob, JobStatus and the lifecycle transitions
//! - ListName and the pending-list reorder rule
//! - Audit events describing every queue mutation
//! - Wire types shared by the coordinator API and the print agent

mod error;
mod events;
mod job;
mod queue;
pub mod wire;

pub use error::{TransitionError, ValidationError};
pub use events::AuditEvent;
pub use job::{JobId, JobRequest, JobStatus, PrintJob, ReportOutcome, RequestTrigger};
pub use queue::{ListName, reorder, take_by_id};
