#![allow(clippy::disallowed_methods)]

use std::error::Error;
use std::time::Duration;

use actors::{Coordinator, CoordinatorConfig, start_coordinator};
use agent::{
    AgentConfig, AgentError, CommandExecutor, CycleOutcome, DryRun, HttpCoordinator, PrintAgent,
};
use api::{AppState, build_router};
use queue_core::{JobRequest, JobStatus, ListName};
use storage::{ListStore, Storage, StorageConfig};
use tokio::net::TcpListener;

const KEY: &str = "agent-test-key";

/// Serve the real router on an ephemeral port.
async fn serve() -> Result<(Coordinator, String), Box<dyn Error>> {
    let store = ListStore::new(Storage::new(StorageConfig::memory()).await?);
    let (coordinator, _handle) = start_coordinator(store, CoordinatorConfig::default()).await?;
    let app = build_router(AppState::new(coordinator.clone(), KEY));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((coordinator, format!("http://{addr}/")))
}

fn config(base_url: &str, api_key: &str) -> AgentConfig {
    AgentConfig {
        api_base_url: base_url.trim_end_matches('/').to_string(),
        api_key: api_key.to_string(),
        agent_id: "desk-7".to_string(),
        poll_interval: Duration::from_millis(20),
        request_timeout: Duration::from_secs(5),
        dry_run: true,
        print_command: Vec::new(),
    }
}

async fn request_one(coordinator: &Coordinator, name: &str) -> Result<queue_core::JobId, Box<dyn Error>> {
    let job = coordinator.enqueue(JobRequest::new(name, 5, 1)).await?;
    coordinator.request_next().await?;
    Ok(job.id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dry_run_cycle_prints_and_reports() -> Result<(), Box<dyn Error>> {
    let (coordinator, base_url) = serve().await?;
    let cfg = config(&base_url, KEY);
    let agent = PrintAgent::new(HttpCoordinator::new(&cfg)?, DryRun, &cfg.agent_id, cfg.poll_interval);

    assert!(matches!(agent.run_cycle().await, CycleOutcome::Idle));

    let job_id = request_one(&coordinator, "Label A").await?;
    let outcome = agent.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Printed { job_id: id } if id == job_id), "{outcome:?}");
    assert_eq!(outcome.exit_code(), 0);

    let snapshot = coordinator.snapshot().await?;
    assert_eq!(snapshot.total(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_print_goes_back_to_pending() -> Result<(), Box<dyn Error>> {
    let (coordinator, base_url) = serve().await?;
    let cfg = config(&base_url, KEY);
    // No print command configured, so every attempt fails.
    let agent = PrintAgent::new(
        HttpCoordinator::new(&cfg)?,
        CommandExecutor::default(),
        &cfg.agent_id,
        cfg.poll_interval,
    );

    let job_id = request_one(&coordinator, "Label B").await?;
    let outcome = agent.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::PrintFailed { .. }), "{outcome:?}");
    assert_eq!(outcome.exit_code(), 1);

    let snapshot = coordinator.snapshot().await?;
    assert_eq!(snapshot.locate(job_id), Some(ListName::Pending));
    let job = &snapshot.pending[0];
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.agent_id.as_deref(), Some("desk-7"));
    assert!(job.error.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_key_is_a_claim_failure() -> Result<(), Box<dyn Error>> {
    let (coordinator, base_url) = serve().await?;
    let cfg = config(&base_url, "not-the-key");
    let agent = PrintAgent::new(HttpCoordinator::new(&cfg)?, DryRun, &cfg.agent_id, cfg.poll_interval);

    let job_id = request_one(&coordinator, "Label C").await?;
    let outcome = agent.run_cycle().await;
    assert!(
        matches!(outcome, CycleOutcome::ClaimFailed(AgentError::Http { status: 401, .. })),
        "{outcome:?}"
    );
    assert_eq!(outcome.exit_code(), 1);

    let snapshot = coordinator.snapshot().await?;
    assert_eq!(snapshot.locate(job_id), Some(ListName::PrintRequested));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_coordinator_is_a_network_error() -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let cfg = config(&format!("http://{addr}"), KEY);
    let agent = PrintAgent::new(HttpCoordinator::new(&cfg)?, DryRun, &cfg.agent_id, cfg.poll_interval);

    let outcome = agent.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::ClaimFailed(AgentError::Network(_))), "{outcome:?}");
    Ok(())
}
