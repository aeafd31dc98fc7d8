//! `print-agent`: polls the coordinator and prints claimed jobs.

use std::path::PathBuf;
use std::process::ExitCode;

use agent::{
    AgentConfig, CommandExecutor, DEFAULT_CONFIG_FILE, DryRun, HttpCoordinator, PrintAgent,
    PrintExecutor,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "print-agent", about = "Claims print jobs from the coordinator and prints them")]
struct Cli {
    /// Process at most one job, then exit
    #[arg(long)]
    once: bool,

    /// Report every job as printed without running the print command
    #[arg(long)]
    dry_run: bool,

    /// Path to the agent config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AgentConfig::load(&cli.config)?;
    config.dry_run |= cli.dry_run;

    let client = HttpCoordinator::new(&config)?;
    tracing::info!(base_url = %config.api_base_url, agent_id = %config.agent_id, dry_run = config.dry_run, "agent started");

    let code = if config.dry_run {
        drive(PrintAgent::new(client, DryRun, &config.agent_id, config.poll_interval), cli.once).await
    } else {
        let executor = CommandExecutor::new(config.print_command.clone());
        drive(PrintAgent::new(client, executor, &config.agent_id, config.poll_interval), cli.once).await
    };
    Ok(ExitCode::from(code))
}

async fn drive<E: PrintExecutor>(agent: PrintAgent<HttpCoordinator, E>, once: bool) -> u8 {
    if once {
        return agent.run_once().await;
    }

    tokio::select! {
        _ = agent.run() => {}
        _ = shutdown_signal() => tracing::info!("agent stopping"),
    }
    0
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
