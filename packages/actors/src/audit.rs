//! Append-only audit log of queue events.

use std::path::{Path, PathBuf};

use chrono::Local;
use queue_core::AuditEvent;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Writes one `[timestamp] description` line per event.
///
/// Failures to write are traced and swallowed; the audit log never fails a
/// queue operation. The default log only traces.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Log to the file at `path`, creating it on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Record an event.
    pub async fn record(&self, event: &AuditEvent) {
        let description = event.description();
        tracing::info!(job_id = ?event.job_id(), "{}", description);

        let Some(path) = &self.path else {
            return;
        };

        let ts = event.timestamp().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{ts}] {description}\n");
        if let Err(e) = append(path, &line).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to write audit log");
        }
    }
}

async fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use queue_core::JobId;

    use super::*;

    #[tokio::test]
    async fn appends_one_line_per_event() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = AuditLog::new(dir.path().join("logs").join("print_log"));
        let job_id = JobId::new();

        log.record(&AuditEvent::QueueReordered {
            count: 3,
            timestamp: Utc::now(),
        })
        .await;
        log.record(&AuditEvent::JobClaimed {
            job_id,
            agent_id: "agent-7".into(),
            timestamp: Utc::now(),
        })
        .await;

        let contents = tokio::fs::read_to_string(dir.path().join("logs").join("print_log")).await?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Queue reordered: 3 items"));
        assert!(lines[1].ends_with(&format!("Claim: {job_id} agent=agent-7")));
        Ok(())
    }

    #[tokio::test]
    async fn unwritable_path_is_not_fatal() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        // A directory cannot be opened for appending.
        let log = AuditLog::new(dir.path());
        log.record(&AuditEvent::QueueReordered {
            count: 0,
            timestamp: Utc::now(),
        })
        .await;
        Ok(())
    }
}
