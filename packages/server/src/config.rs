//! Coordinator settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use actors::ListKeys;
use storage::{StorageConfig, StorageError};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_FILE: &str = "./data/print_log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY must be set")]
    MissingApiKey,

    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub keys: ListKeys,
    pub log_file: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = non_empty("API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let bind = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr { value: bind, source })?;

        Ok(Self {
            api_key,
            bind_addr,
            storage: StorageConfig::from_lookup(&lookup)?,
            keys: ListKeys::from_lookup(&lookup),
            log_file: non_empty("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}
