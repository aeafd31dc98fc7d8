//! Worker agent for the print coordinator.
//!
//! The agent claims requested jobs over HTTP, hands each one to a
//! [`PrintExecutor`] and reports the outcome back.

mod agent;
mod client;
mod config;
mod error;
mod executor;

pub use agent::{CycleOutcome, PrintAgent};
pub use client::{CoordinatorClient, HttpCoordinator};
pub use config::{AgentConfig, DEFAULT_CONFIG_FILE, FileConfig};
pub use error::AgentError;
pub use executor::{CommandExecutor, DryRun, PrintExecutor, PrintOutcome};
