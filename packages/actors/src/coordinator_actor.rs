//! Coordinator actor owning the pending, print-requested and in-flight lists.
//!
//! Every operation is a read-modify-write over one or two stored lists. The
//! actor handles one message at a time, which is what keeps those cycles
//! from interleaving: two claims can never both pop the same head.

use std::collections::HashSet;

use chrono::Utc;
use queue_core::{
    AuditEvent, JobId, JobRequest, JobStatus, ListName, PrintJob, ReportOutcome, RequestTrigger,
    reorder, take_by_id,
};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use storage::ListStore;

use crate::audit::AuditLog;
use crate::coordinator::ListKeys;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::messages::{ClearSummary, CoordinatorMessage, QueueSnapshot, ReportAck};

/// State for the coordinator actor.
pub struct CoordinatorState {
    store: ListStore,
    keys: ListKeys,
    audit: AuditLog,
}

impl CoordinatorState {
    /// Create a new coordinator state.
    pub fn new(store: ListStore, keys: ListKeys, audit: AuditLog) -> Self {
        Self { store, keys, audit }
    }

    async fn load(&self, list: ListName) -> CoordinatorResult<Vec<PrintJob>> {
        let loaded = self
            .store
            .load::<PrintJob>(self.keys.key(list))
            .await
            .map_err(|e| CoordinatorError::storage(list, e))?;

        if let Some(reason) = loaded.reset {
            self.audit
                .record(&AuditEvent::ListReset {
                    list,
                    reason,
                    timestamp: Utc::now(),
                })
                .await;
        }
        Ok(loaded.items)
    }

    async fn save(&self, list: ListName, jobs: &[PrintJob]) -> CoordinatorResult<()> {
        if let Err(e) = self.store.save(self.keys.key(list), jobs).await {
            self.audit
                .record(&AuditEvent::SaveFailed {
                    list,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                })
                .await;
            return Err(CoordinatorError::storage(list, e));
        }
        Ok(())
    }

    /// Write two lists as one mutation.
    ///
    /// `first` is written before `second`; if `second` cannot be written,
    /// `first` is restored to `first_before` so the caller sees no change.
    async fn save_pair(
        &self,
        first: (ListName, &[PrintJob], &[PrintJob]),
        second: (ListName, &[PrintJob]),
    ) -> CoordinatorResult<()> {
        let (first_list, first_before, first_after) = first;
        let (second_list, second_after) = second;

        self.save(first_list, first_after).await?;
        if let Err(e) = self.save(second_list, second_after).await {
            if let Err(rollback) = self.store.save(self.keys.key(first_list), first_before).await {
                tracing::error!(
                    list = %first_list,
                    error = %rollback,
                    "failed to roll back list after a failed write"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn enqueue(&self, request: JobRequest) -> CoordinatorResult<PrintJob> {
        let job = request.into_job()?;
        let mut pending = self.load(ListName::Pending).await?;
        pending.push(job.clone());
        self.save(ListName::Pending, &pending).await?;

        self.audit
            .record(&AuditEvent::JobAdded {
                job_id: job.id,
                name: job.name.clone(),
                quantity: job.quantity,
                copies: job.copies,
                timestamp: job.created_at,
            })
            .await;
        Ok(job)
    }

    async fn clear(&self) -> CoordinatorResult<ClearSummary> {
        let pending = self.load(ListName::Pending).await?;
        let requested = self.load(ListName::PrintRequested).await?;

        self.save_pair(
            (ListName::Pending, &pending, &[]),
            (ListName::PrintRequested, &[]),
        )
        .await?;

        let summary = ClearSummary {
            pending: pending.len(),
            requested: requested.len(),
        };
        self.audit
            .record(&AuditEvent::QueueCleared {
                pending: summary.pending,
                requested: summary.requested,
                timestamp: Utc::now(),
            })
            .await;
        Ok(summary)
    }

    async fn reorder(&self, ordered_ids: &[JobId]) -> CoordinatorResult<usize> {
        let pending = self.load(ListName::Pending).await?;
        let reordered = reorder(pending, ordered_ids);
        self.save(ListName::Pending, &reordered).await?;

        self.audit
            .record(&AuditEvent::QueueReordered {
                count: reordered.len(),
                timestamp: Utc::now(),
            })
            .await;
        Ok(reordered.len())
    }

    async fn request_next(&self) -> CoordinatorResult<Option<PrintJob>> {
        let mut pending = self.load(ListName::Pending).await?;
        if pending.is_empty() {
            return Ok(None);
        }
        let before = pending.clone();
        let job = pending.remove(0);
        self.request(job, &before, &pending, RequestTrigger::PrintNext)
            .await
            .map(Some)
    }

    async fn request_specific(&self, job_id: JobId) -> CoordinatorResult<PrintJob> {
        let mut pending = self.load(ListName::Pending).await?;
        let before = pending.clone();
        let job = take_by_id(&mut pending, job_id)
            .ok_or_else(|| CoordinatorError::not_found(job_id, ListName::Pending))?;
        self.request(job, &before, &pending, RequestTrigger::PrintSpecific)
            .await
    }

    /// Shared tail of both request operations: `job` has already been taken
    /// out of `pending`.
    async fn request(
        &self,
        mut job: PrintJob,
        pending_before: &[PrintJob],
        pending: &[PrintJob],
        trigger: RequestTrigger,
    ) -> CoordinatorResult<PrintJob> {
        job.request(trigger)?;

        let mut requested = self.load(ListName::PrintRequested).await?;
        requested.push(job.clone());
        self.save_pair(
            (ListName::Pending, pending_before, pending),
            (ListName::PrintRequested, &requested),
        )
        .await?;

        self.audit
            .record(&AuditEvent::PrintRequested {
                job_id: job.id,
                trigger,
                timestamp: Utc::now(),
            })
            .await;
        Ok(job)
    }

    async fn claim(&self, agent_id: String) -> CoordinatorResult<Option<PrintJob>> {
        let mut requested = self.load(ListName::PrintRequested).await?;
        if requested.is_empty() {
            return Ok(None);
        }
        let before = requested.clone();
        let mut job = requested.remove(0);
        job.claim(agent_id.clone())?;

        let mut in_flight = self.load(ListName::InFlight).await?;
        in_flight.push(job.clone());
        // The job leaves print-requested before it lands in in-flight, so a
        // crash in between can lose a claim but never hand it out twice.
        self.save_pair(
            (ListName::PrintRequested, &before, &requested),
            (ListName::InFlight, &in_flight),
        )
        .await?;

        self.audit
            .record(&AuditEvent::JobClaimed {
                job_id: job.id,
                agent_id,
                timestamp: Utc::now(),
            })
            .await;
        Ok(Some(job))
    }

    async fn report(
        &self,
        job_id: JobId,
        outcome: ReportOutcome,
        error: Option<String>,
    ) -> CoordinatorResult<ReportAck> {
        let mut in_flight = self.load(ListName::InFlight).await?;
        let before = in_flight.clone();
        let mut job = take_by_id(&mut in_flight, job_id)
            .ok_or_else(|| CoordinatorError::not_found(job_id, ListName::InFlight))?;

        match outcome {
            ReportOutcome::Success => {
                job.complete()?;
                self.save(ListName::InFlight, &in_flight).await?;

                self.audit
                    .record(&AuditEvent::JobPrinted {
                        job_id,
                        agent_id: job.agent_id.clone(),
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(ReportAck::Printed(job))
            }
            ReportOutcome::Failed => {
                job.fail(error)?;
                job.requeue()?;

                let mut pending = self.load(ListName::Pending).await?;
                pending.push(job.clone());
                self.save_pair(
                    (ListName::InFlight, &before, &in_flight),
                    (ListName::Pending, &pending),
                )
                .await?;

                self.audit
                    .record(&AuditEvent::JobRequeued {
                        job_id,
                        agent_id: job.agent_id.clone(),
                        error: job.error.clone(),
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(ReportAck::Requeued(job))
            }
        }
    }

    async fn snapshot(&self) -> CoordinatorResult<QueueSnapshot> {
        Ok(QueueSnapshot {
            pending: self.load(ListName::Pending).await?,
            print_requested: self.load(ListName::PrintRequested).await?,
            in_flight: self.load(ListName::InFlight).await?,
        })
    }

    /// Restore the list invariants after an unclean stop.
    ///
    /// A job id may appear in only one list; the most advanced copy wins
    /// (in-flight, then print-requested, then pending). Pending records left
    /// with status `failed` are moved back to `pending`; any other record
    /// whose status disagrees with its list takes the list's status.
    async fn reconcile(&self) -> CoordinatorResult<()> {
        let mut seen: HashSet<JobId> = HashSet::new();

        for list in [ListName::InFlight, ListName::PrintRequested, ListName::Pending] {
            let jobs = self.load(list).await?;
            let original_len = jobs.len();
            let mut changed = false;
            let mut kept = Vec::with_capacity(original_len);

            for mut job in jobs {
                if !seen.insert(job.id) {
                    self.audit
                        .record(&AuditEvent::DuplicateRemoved {
                            job_id: job.id,
                            kept_in: self.holder_of(job.id, list).await?,
                            removed_from: list,
                            timestamp: Utc::now(),
                        })
                        .await;
                    changed = true;
                    continue;
                }
                if list == ListName::Pending && job.status == JobStatus::Failed {
                    job.requeue()?;
                    changed = true;
                }
                if let Some(from) = job.force_status(list.member_status()) {
                    tracing::warn!(
                        job_id = %job.id,
                        list = %list,
                        %from,
                        "job status did not match its list, repaired"
                    );
                    self.audit
                        .record(&AuditEvent::StatusRepaired {
                            job_id: job.id,
                            list,
                            from,
                            to: job.status,
                            timestamp: Utc::now(),
                        })
                        .await;
                    changed = true;
                }
                kept.push(job);
            }

            if changed {
                self.save(list, &kept).await?;
            }
            tracing::info!(list = %list, jobs = kept.len(), removed = original_len - kept.len(), "list loaded");
        }
        Ok(())
    }

    /// First list, in reconcile order up to and including `current`, that
    /// holds `job_id`.
    async fn holder_of(&self, job_id: JobId, current: ListName) -> CoordinatorResult<ListName> {
        for list in [ListName::InFlight, ListName::PrintRequested] {
            if list == current {
                break;
            }
            if self.load(list).await?.iter().any(|j| j.id == job_id) {
                return Ok(list);
            }
        }
        Ok(current)
    }
}

/// Coordinator actor that serializes all queue mutations.
pub struct CoordinatorActor;

impl Actor for CoordinatorActor {
    type Msg = CoordinatorMessage;
    type State = CoordinatorState;
    type Arguments = CoordinatorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(storage = args.store.storage().kind_str(), "Starting print coordinator");
        args.reconcile().await?;
        Ok(args)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CoordinatorMessage::Enqueue { request, reply } => {
                let _ = reply.send(state.enqueue(request).await);
            }

            CoordinatorMessage::ListPending { reply } => {
                let _ = reply.send(state.load(ListName::Pending).await);
            }

            CoordinatorMessage::Clear { reply } => {
                let _ = reply.send(state.clear().await);
            }

            CoordinatorMessage::Reorder { ordered_ids, reply } => {
                let _ = reply.send(state.reorder(&ordered_ids).await);
            }

            CoordinatorMessage::RequestNext { reply } => {
                let _ = reply.send(state.request_next().await);
            }

            CoordinatorMessage::RequestSpecific { job_id, reply } => {
                let _ = reply.send(state.request_specific(job_id).await);
            }

            CoordinatorMessage::Claim { agent_id, reply } => {
                let _ = reply.send(state.claim(agent_id).await);
            }

            CoordinatorMessage::Report {
                job_id,
                outcome,
                error,
                reply,
            } => {
                let _ = reply.send(state.report(job_id, outcome, error).await);
            }

            CoordinatorMessage::Snapshot { reply } => {
                let _ = reply.send(state.snapshot().await);
            }

            CoordinatorMessage::Shutdown => {
                tracing::info!("Shutting down print coordinator");
                myself.stop(None);
            }
        }

        Ok(())
    }
}
