//! HTTP client for the coordinator's worker routes.

use std::future::Future;

use queue_core::wire::{ClaimRequest, ClaimResponse, MessageResponse, ReportRequest};
use queue_core::{JobId, PrintJob, ReportOutcome};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// The two calls a worker makes against the coordinator.
pub trait CoordinatorClient: Send + Sync {
    /// Claim the next requested job, if any.
    fn claim(&self, agent_id: &str) -> impl Future<Output = Result<Option<PrintJob>, AgentError>> + Send;

    /// Report how a claimed job went.
    fn report(
        &self,
        job_id: JobId,
        outcome: ReportOutcome,
        error: Option<String>,
    ) -> impl Future<Output = Result<(), AgentError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpCoordinator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpCoordinator {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AgentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AgentError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| AgentError::Decode(format!("{path}: {e}")))
    }
}

impl CoordinatorClient for HttpCoordinator {
    async fn claim(&self, agent_id: &str) -> Result<Option<PrintJob>, AgentError> {
        let body = ClaimRequest {
            agent_id: Some(agent_id.to_string()),
        };
        let response: ClaimResponse = self.post_json("/agent/claim", &body).await?;
        Ok(response.into_job())
    }

    async fn report(
        &self,
        job_id: JobId,
        outcome: ReportOutcome,
        error: Option<String>,
    ) -> Result<(), AgentError> {
        let body = ReportRequest {
            job_id: job_id.to_string(),
            status: outcome.as_str().to_string(),
            error,
        };
        let ack: MessageResponse = self.post_json("/agent/report", &body).await?;
        tracing::debug!(%job_id, message = %ack.message, "report acknowledged");
        Ok(())
    }
}
