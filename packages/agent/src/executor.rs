//! Print execution adapters.

use std::future::Future;
use std::process::Output;

use queue_core::PrintJob;
use tokio::process::Command;

/// Result of one print attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    Printed,
    Failed(String),
}

/// Turns a claimed job into physical output.
pub trait PrintExecutor: Send + Sync {
    fn print(&self, job: &PrintJob) -> impl Future<Output = PrintOutcome> + Send;
}

/// Runs an external program with `<name> <quantity> <copies>` appended to
/// the configured argv and waits for it to exit.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    command: Vec<String>,
}

impl CommandExecutor {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl PrintExecutor for CommandExecutor {
    async fn print(&self, job: &PrintJob) -> PrintOutcome {
        let Some((program, args)) = self.command.split_first() else {
            return PrintOutcome::Failed("no print command configured".to_string());
        };

        let output = Command::new(program)
            .args(args)
            .arg(&job.name)
            .arg(job.quantity.to_string())
            .arg(job.copies.to_string())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => PrintOutcome::Printed,
            Ok(output) => PrintOutcome::Failed(failure_text(&output)),
            Err(e) => PrintOutcome::Failed(format!("failed to start {program}: {e}")),
        }
    }
}

/// Trimmed stderr, else trimmed stdout, else the exit status.
fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        })
}

/// Reports every job as printed without touching a printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl PrintExecutor for DryRun {
    async fn print(&self, job: &PrintJob) -> PrintOutcome {
        tracing::info!(job_id = %job.id, name = %job.name, "dry run, skipping print");
        PrintOutcome::Printed
    }
}
