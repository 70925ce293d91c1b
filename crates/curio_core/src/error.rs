//! Error types for list editing, snapshots and save coordination.
use thiserror::Error;

/// Top-level error type for the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("A commit is already in flight")]
    CommitInFlight,

    #[error("A revert is already in flight")]
    RevertInFlight,

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Cancel failed: {0}")]
    CancelFailed(String),

    #[error("Store error: {0}")]
    Store(String),
}
