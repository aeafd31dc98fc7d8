//! Typed handle to the coordinator actor.

use queue_core::{JobId, JobRequest, ListName, PrintJob, ReportOutcome};
use ractor::{Actor, ActorRef, RpcReplyPort};
use storage::ListStore;

use crate::audit::AuditLog;
use crate::coordinator_actor::{CoordinatorActor, CoordinatorState};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::messages::{ClearSummary, CoordinatorMessage, QueueSnapshot, ReportAck};

/// Storage keys of the three lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListKeys {
    pub pending: String,
    pub print_requested: String,
    pub in_flight: String,
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            pending: "queue.json".to_string(),
            print_requested: "print_queue.json".to_string(),
            in_flight: "inflight.json".to_string(),
        }
    }
}

impl ListKeys {
    pub fn key(&self, list: ListName) -> &str {
        match list {
            ListName::Pending => &self.pending,
            ListName::PrintRequested => &self.print_requested,
            ListName::InFlight => &self.in_flight,
        }
    }

    /// Keys from `QUEUE_FILE`, `PRINT_QUEUE_FILE` and `INFLIGHT_FILE`,
    /// falling back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            pending: non_empty("QUEUE_FILE").unwrap_or(defaults.pending),
            print_requested: non_empty("PRINT_QUEUE_FILE").unwrap_or(defaults.print_requested),
            in_flight: non_empty("INFLIGHT_FILE").unwrap_or(defaults.in_flight),
        }
    }
}

/// Settings for [`start_coordinator`].
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    pub keys: ListKeys,
    pub audit: AuditLog,
}

/// Cloneable handle for talking to a running coordinator.
#[derive(Debug, Clone)]
pub struct Coordinator {
    actor: ActorRef<CoordinatorMessage>,
}

impl Coordinator {
    async fn call<T>(
        &self,
        build: impl FnOnce(RpcReplyPort<CoordinatorResult<T>>) -> CoordinatorMessage,
    ) -> CoordinatorResult<T>
    where
        T: Send + 'static,
    {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(build(tx.into()))
            .map_err(|e| CoordinatorError::Unavailable(e.to_string()))?;
        rx.await
            .map_err(|_| CoordinatorError::Unavailable("coordinator dropped the reply".to_string()))?
    }

    /// Validate `request` and append the new job to the pending list.
    pub async fn enqueue(&self, request: JobRequest) -> CoordinatorResult<PrintJob> {
        self.call(|reply| CoordinatorMessage::Enqueue { request, reply }).await
    }

    pub async fn list_pending(&self) -> CoordinatorResult<Vec<PrintJob>> {
        self.call(|reply| CoordinatorMessage::ListPending { reply }).await
    }

    /// Empty pending and print-requested. In-flight jobs are untouched.
    pub async fn clear(&self) -> CoordinatorResult<ClearSummary> {
        self.call(|reply| CoordinatorMessage::Clear { reply }).await
    }

    /// Re-sequence the pending list; returns its length.
    pub async fn reorder(&self, ordered_ids: Vec<JobId>) -> CoordinatorResult<usize> {
        self.call(|reply| CoordinatorMessage::Reorder { ordered_ids, reply })
            .await
    }

    /// Move the pending head to print-requested. `None` when pending is empty.
    pub async fn request_next(&self) -> CoordinatorResult<Option<PrintJob>> {
        self.call(|reply| CoordinatorMessage::RequestNext { reply }).await
    }

    pub async fn request_specific(&self, job_id: JobId) -> CoordinatorResult<PrintJob> {
        self.call(|reply| CoordinatorMessage::RequestSpecific { job_id, reply })
            .await
    }

    /// Hand the print-requested head to `agent_id`. `None` when there is
    /// nothing to print.
    pub async fn claim(&self, agent_id: impl Into<String>) -> CoordinatorResult<Option<PrintJob>> {
        let agent_id = agent_id.into();
        self.call(|reply| CoordinatorMessage::Claim { agent_id, reply })
            .await
    }

    pub async fn report(
        &self,
        job_id: JobId,
        outcome: ReportOutcome,
        error: Option<String>,
    ) -> CoordinatorResult<ReportAck> {
        self.call(|reply| CoordinatorMessage::Report {
            job_id,
            outcome,
            error,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> CoordinatorResult<QueueSnapshot> {
        self.call(|reply| CoordinatorMessage::Snapshot { reply }).await
    }

    /// Ask the actor to stop after the messages already queued.
    pub fn shutdown(&self) {
        if let Err(e) = self.actor.send_message(CoordinatorMessage::Shutdown) {
            tracing::debug!(error = %e, "coordinator already stopped");
        }
    }
}

/// Start the coordinator over `store`.
///
/// The lists are reconciled before the first message is handled; a storage
/// failure during that pass fails the spawn.
pub async fn start_coordinator(
    store: ListStore,
    config: CoordinatorConfig,
) -> Result<(Coordinator, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let state = CoordinatorState::new(store, config.keys, config.audit);
    let (actor, handle) = Actor::spawn(None, CoordinatorActor, state).await?;

    Ok((Coordinator { actor }, handle))
}
