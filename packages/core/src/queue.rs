//! The three job lists and the pending-list ordering rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{JobId, JobStatus, PrintJob};

/// One of the coordinator's persisted job lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListName {
    /// Submitted jobs waiting for an operator request.
    Pending,
    /// Jobs selected for printing, waiting for a worker claim.
    PrintRequested,
    /// Jobs claimed by a worker.
    InFlight,
}

impl ListName {
    pub const ALL: [ListName; 3] = [ListName::Pending, ListName::PrintRequested, ListName::InFlight];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListName::Pending => "pending",
            ListName::PrintRequested => "print_requested",
            ListName::InFlight => "in_flight",
        }
    }

    /// Status every member of this list carries.
    pub fn member_status(&self) -> JobStatus {
        match self {
            ListName::Pending => JobStatus::Pending,
            ListName::PrintRequested => JobStatus::Requested,
            ListName::InFlight => JobStatus::Printing,
        }
    }
}

impl std::fmt::Display for ListName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove the job with `id` from `jobs`, wherever it sits.
pub fn take_by_id(jobs: &mut Vec<PrintJob>, id: JobId) -> Option<PrintJob> {
    let idx = jobs.iter().position(|j| j.id == id)?;
    Some(jobs.remove(idx))
}

/// Re-sequence `jobs` to follow `ordered_ids`.
///
/// Duplicate ids keep their first occurrence, ids not present in `jobs` are
/// ignored, and jobs not mentioned are appended in their original relative
/// order. No job is dropped or duplicated.
pub fn reorder(jobs: Vec<PrintJob>, ordered_ids: &[JobId]) -> Vec<PrintJob> {
    let mut remaining: Vec<Option<PrintJob>> = jobs.into_iter().map(Some).collect();
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    let mut reordered = Vec::with_capacity(remaining.len());

    for id in ordered_ids {
        if !seen.insert(*id) {
            continue;
        }
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| matches!(slot, Some(j) if j.id == *id))
        {
            reordered.extend(slot.take());
        }
    }

    reordered.extend(remaining.into_iter().flatten());
    reordered
}
