//! Error type for coordinator operations.

use queue_core::{JobId, ListName, TransitionError, ValidationError};
use storage::StorageError;

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Why a coordinator operation was rejected. No list is changed in any case.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("job {job_id} not found in {list}")]
    NotFound { job_id: String, list: ListName },

    #[error("storage error on {list}: {source}")]
    Storage {
        list: ListName,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("coordinator unavailable: {0}")]
    Unavailable(String),
}

impl CoordinatorError {
    pub fn not_found(job_id: impl ToString, list: ListName) -> Self {
        Self::NotFound {
            job_id: job_id.to_string(),
            list,
        }
    }

    pub(crate) fn storage(list: ListName, source: StorageError) -> Self {
        Self::Storage { list, source }
    }

    /// Job id the error refers to, when it names one.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            CoordinatorError::NotFound { job_id, .. } => JobId::parse(job_id).ok(),
            CoordinatorError::Transition(e) => Some(e.job_id),
            _ => None,
        }
    }
}
