//! Domain-level error types.

use thiserror::Error;

/// Outcome of a lifecycle operation that did not succeed.
///
/// The first four kinds are deterministic authorization/state-machine
/// failures and are surfaced to the caller verbatim, never retried.
/// `StoreUnavailable` and `Timeout` are retryable from the caller's side;
/// the engine itself performs no retries.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No valid caller identity")]
    Unauthenticated,

    #[error("Caller lacks the role or ownership required for this action")]
    Forbidden,

    #[error("Caller is banned from write actions")]
    Banned,

    #[error("Post is not in a state from which this action is defined")]
    InvalidTransition,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Post store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Operation timed out")]
    Timeout,
}

/// Adapter-level errors raised by post store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Row not found")]
    NotFound,

    #[error("Row is not in the expected status")]
    StatusConflict,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out")]
    Timeout,
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            // A missing row and a lost conditional update both mean the post
            // is in a terminal state for the requested transition.
            StoreError::NotFound | StoreError::StatusConflict => EngineError::InvalidTransition,
            StoreError::Unavailable(msg) => EngineError::StoreUnavailable(msg),
            StoreError::Timeout => EngineError::Timeout,
        }
    }
}
