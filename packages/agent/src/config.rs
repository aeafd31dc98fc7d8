//! Agent settings: a JSON file with environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::AgentError;

pub const DEFAULT_CONFIG_FILE: &str = "agent_config.json";
pub const DEFAULT_POLL_SECONDS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const FALLBACK_AGENT_ID: &str = "agent";

/// Contents of `agent_config.json`. Every key is optional here; required
/// values are checked after environment overrides are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub poll_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub dry_run: Option<bool>,
    /// Program and leading arguments; the job's name, quantity and copies
    /// are appended.
    pub print_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Coordinator base URL without a trailing `/`.
    pub api_base_url: String,
    pub api_key: String,
    pub agent_id: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub dry_run: bool,
    pub print_command: Vec<String>,
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    pub fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AgentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AgentError::config(format!(
                "cannot read {}: {e}; copy the example config and fill it in",
                path.display()
            ))
        })?;
        let file: FileConfig = serde_json::from_str(&raw)
            .map_err(|e| AgentError::config(format!("invalid {}: {e}", path.display())))?;
        Self::from_parts(file, lookup)
    }

    /// Merge `file` with environment values read through `lookup`.
    pub fn from_parts(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AgentError> {
        let env = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let api_base_url = env("API_BASE_URL")
            .or_else(|| non_blank(file.api_base_url))
            .ok_or_else(|| AgentError::config("api_base_url is required"))?;
        let api_key = env("API_KEY")
            .or_else(|| non_blank(file.api_key))
            .ok_or_else(|| AgentError::config("api_key is required"))?;

        let agent_id = env("AGENT_ID")
            .or_else(|| non_blank(file.agent_id))
            .or_else(|| env("COMPUTERNAME"))
            .or_else(|| env("HOSTNAME"))
            .unwrap_or_else(|| FALLBACK_AGENT_ID.to_string());

        let poll_seconds = match env("POLL_SECONDS") {
            Some(v) => parse_seconds("POLL_SECONDS", &v)?,
            None => file.poll_seconds.unwrap_or(DEFAULT_POLL_SECONDS),
        };
        let timeout_seconds = match env("REQUEST_TIMEOUT") {
            Some(v) => parse_seconds("REQUEST_TIMEOUT", &v)?,
            None => file.request_timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };
        if poll_seconds == 0 || timeout_seconds == 0 {
            return Err(AgentError::config(
                "poll_seconds and request_timeout_seconds must be at least 1",
            ));
        }

        let dry_run = match env("DRY_RUN") {
            Some(v) => parse_flag("DRY_RUN", &v)?,
            None => file.dry_run.unwrap_or(false),
        };

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            agent_id,
            poll_interval: Duration::from_secs(poll_seconds),
            request_timeout: Duration::from_secs(timeout_seconds),
            dry_run,
            print_command: file.print_command.unwrap_or_default(),
        })
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<u64, AgentError> {
    value
        .parse()
        .map_err(|_| AgentError::config(format!("{name} must be a whole number of seconds, got {value:?}")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AgentError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentError::config(format!("{name} must be a boolean, got {value:?}"))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn file() -> FileConfig {
        FileConfig {
            api_base_url: Some("http://coordinator:8000/".into()),
            api_key: Some("secret".into()),
            ..FileConfig::default()
        }
    }

    #[test]
    fn file_values_with_defaults() -> Result<(), AgentError> {
        let cfg = AgentConfig::from_parts(file(), env(&[]))?;
        assert_eq!(cfg.api_base_url, "http://coordinator:8000");
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.agent_id, FALLBACK_AGENT_ID);
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert!(!cfg.dry_run);
        assert!(cfg.print_command.is_empty());
        Ok(())
    }

    #[test]
    fn environment_overrides_file() -> Result<(), AgentError> {
        let cfg = AgentConfig::from_parts(
            file(),
            env(&[
                ("API_BASE_URL", "https://print.example.com//"),
                ("API_KEY", "other"),
                ("AGENT_ID", "front-desk"),
                ("POLL_SECONDS", "2"),
                ("REQUEST_TIMEOUT", "30"),
                ("DRY_RUN", "TRUE"),
            ]),
        )?;
        assert_eq!(cfg.api_base_url, "https://print.example.com");
        assert_eq!(cfg.api_key, "other");
        assert_eq!(cfg.agent_id, "front-desk");
        assert_eq!(cfg.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(cfg.dry_run);
        Ok(())
    }

    #[test]
    fn agent_id_falls_back_to_host_names() -> Result<(), AgentError> {
        let cfg = AgentConfig::from_parts(file(), env(&[("COMPUTERNAME", "WS-01"), ("HOSTNAME", "ws-01")]))?;
        assert_eq!(cfg.agent_id, "WS-01");

        let cfg = AgentConfig::from_parts(file(), env(&[("HOSTNAME", "ws-01")]))?;
        assert_eq!(cfg.agent_id, "ws-01");
        Ok(())
    }

    #[test]
    fn missing_or_invalid_values_are_errors() {
        let no_key = FileConfig {
            api_key: Some(" ".into()),
            ..file()
        };
        assert!(matches!(
            AgentConfig::from_parts(no_key, env(&[])),
            Err(AgentError::Config(_))
        ));
        assert!(AgentConfig::from_parts(FileConfig::default(), env(&[])).is_err());
        assert!(AgentConfig::from_parts(file(), env(&[("POLL_SECONDS", "soon")])).is_err());
        assert!(AgentConfig::from_parts(file(), env(&[("POLL_SECONDS", "0")])).is_err());
        assert!(AgentConfig::from_parts(file(), env(&[("DRY_RUN", "maybe")])).is_err());
    }

    #[test]
    fn loads_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "api_base_url": "http://localhost:8000",
                "api_key": "k",
                "poll_seconds": 3,
                "print_command": ["python", "print_labels.py"]
            }"#,
        )?;

        let cfg = AgentConfig::load_with(&path, env(&[]))?;
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
        assert_eq!(cfg.print_command, vec!["python".to_string(), "print_labels.py".to_string()]);

        let missing = AgentConfig::load_with(&dir.path().join("absent.json"), env(&[]));
        assert!(matches!(missing, Err(AgentError::Config(_))));
        Ok(())
    }
}
