//! Error types for executor and guarded-resource operations.

use thiserror::Error;

/// Errors produced by the executor, its result handles and guarded resources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Constructor or configuration parameters were rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Work was submitted after shutdown began.
    #[error("executor is closed")]
    ExecutorClosed,
    /// User-supplied work panicked or returned an error.
    #[error("computation failed: {0}")]
    ComputationFailure(String),
    /// A bounded wait elapsed before the result was ready.
    #[error("operation timed out")]
    Timeout,
    /// The producing side was dropped without ever writing a result.
    #[error("result abandoned before completion")]
    Abandoned,
    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
    /// Another guarded resource would pin more drain loops than there are workers.
    #[error("executor oversubscribed: {pinned} of {threads} workers already pinned")]
    Oversubscribed {
        /// Drain loops currently pinned to the executor.
        pinned: usize,
        /// Worker threads owned by the executor.
        threads: usize,
    },
}

impl ExecutorError {
    /// Build an `InvalidArgument` error from any message.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a `ComputationFailure` error from any message.
    pub fn failure<S: Into<String>>(msg: S) -> Self {
        Self::ComputationFailure(msg.into())
    }

    /// Whether this error was raised by user work rather than by the executor.
    #[must_use]
    pub const fn is_computation_failure(&self) -> bool {
        matches!(self, Self::ComputationFailure(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
