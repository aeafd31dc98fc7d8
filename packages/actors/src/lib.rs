//! Actor system for the print coordinator.
//!
//! A single [`CoordinatorActor`] owns the three persisted job lists and
//! applies every mutation in message order. Callers talk to it through the
//! cloneable [`Coordinator`] handle.
//!
//! # Usage
//!
//! ```ignore
//! use actors::{CoordinatorConfig, start_coordinator};
//! use queue_core::JobRequest;
//!
//! let (coordinator, handle) = start_coordinator(store, CoordinatorConfig::default()).await?;
//! let job = coordinator.enqueue(JobRequest::new("Label A", 10, 1)).await?;
//! ```

mod audit;
mod coordinator;
mod coordinator_actor;
mod error;
mod messages;

pub use audit::AuditLog;
pub use coordinator::{Coordinator, CoordinatorConfig, ListKeys, start_coordinator};
pub use coordinator_actor::{CoordinatorActor, CoordinatorState};
pub use error::{CoordinatorError, CoordinatorResult};
pub use messages::{ClearSummary, CoordinatorMessage, QueueSnapshot, ReportAck};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
