//! The claim, print and report loop.

use std::time::Duration;

use queue_core::{JobId, ReportOutcome};

use crate::client::CoordinatorClient;
use crate::error::AgentError;
use crate::executor::{PrintExecutor, PrintOutcome};

/// What one pass through the loop did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Nothing was waiting to be printed.
    Idle,
    Printed { job_id: JobId },
    PrintFailed { job_id: JobId, error: String },
    ClaimFailed(AgentError),
    /// The job was attempted but the coordinator did not take the report.
    ReportFailed {
        job_id: JobId,
        printed: bool,
        error: AgentError,
    },
}

impl CycleOutcome {
    /// Process exit code for a single-shot run.
    pub fn exit_code(&self) -> u8 {
        match self {
            CycleOutcome::Idle | CycleOutcome::Printed { .. } => 0,
            _ => 1,
        }
    }

    /// Whether the loop should wait before polling again.
    fn should_wait(&self) -> bool {
        matches!(self, CycleOutcome::Idle | CycleOutcome::ClaimFailed(_))
    }
}

pub struct PrintAgent<C, E> {
    client: C,
    executor: E,
    agent_id: String,
    poll_interval: Duration,
}

impl<C, E> PrintAgent<C, E>
where
    C: CoordinatorClient,
    E: PrintExecutor,
{
    pub fn new(client: C, executor: E, agent_id: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            client,
            executor,
            agent_id: agent_id.into(),
            poll_interval,
        }
    }

    /// Claim at most one job, print it and report the result.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let job = match self.client.claim(&self.agent_id).await {
            Ok(Some(job)) => job,
            Ok(None) => return CycleOutcome::Idle,
            Err(error) => {
                tracing::warn!(error = %error, "claim failed");
                return CycleOutcome::ClaimFailed(error);
            }
        };

        let job_id = job.id;
        tracing::info!(%job_id, name = %job.name, copies = job.copies, "printing job");

        let (outcome, error) = match self.executor.print(&job).await {
            PrintOutcome::Printed => (ReportOutcome::Success, None),
            PrintOutcome::Failed(reason) => (ReportOutcome::Failed, Some(reason)),
        };

        if let Err(report_error) = self.client.report(job_id, outcome, error.clone()).await {
            // The print already happened (or failed); it is never retried.
            tracing::warn!(%job_id, error = %report_error, "report failed");
            return CycleOutcome::ReportFailed {
                job_id,
                printed: outcome == ReportOutcome::Success,
                error: report_error,
            };
        }

        match error {
            None => {
                tracing::info!(%job_id, "job printed");
                CycleOutcome::Printed { job_id }
            }
            Some(error) => {
                tracing::warn!(%job_id, %error, "print failed, job returned to the queue");
                CycleOutcome::PrintFailed { job_id, error }
            }
        }
    }

    /// Run one cycle and return the process exit code.
    pub async fn run_once(&self) -> u8 {
        self.run_cycle().await.exit_code()
    }

    /// Poll until the task is dropped.
    pub async fn run(&self) {
        tracing::info!(agent_id = %self.agent_id, interval = ?self.poll_interval, "agent polling");
        loop {
            if self.run_cycle().await.should_wait() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }
}
