//! Units of work carried by the executor queue.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use super::result_handle::ResultSlot;
use super::ExecutorError;

/// Outcome of running one job, reported back to the worker for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobStatus {
    /// The computation produced a value.
    Completed,
    /// The computation panicked or returned an error.
    Failed,
}

/// Type-erased computation that owns its result slot.
pub(crate) type Job = Box<dyn FnOnce() -> JobStatus + Send + 'static>;

/// Entry in the executor's shared queue.
pub(crate) enum WorkItem {
    /// Run the job and deliver its outcome.
    Run(Job),
    /// Poison pill: the worker that pops it exits its loop.
    Shutdown,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(_) => f.write_str("WorkItem::Run"),
            Self::Shutdown => f.write_str("WorkItem::Shutdown"),
        }
    }
}

/// Run `work`, capturing a panic or error into `slot`.
///
/// Nothing escapes this function: the caller's loop keeps running whatever
/// the user code does.
pub(crate) fn run_captured<R, F>(slot: ResultSlot<R>, work: F) -> JobStatus
where
    F: FnOnce() -> Result<R, ExecutorError>,
{
    let outcome = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        Err(ExecutorError::ComputationFailure(panic_message(payload.as_ref())))
    });

    let status = match &outcome {
        Ok(_) => JobStatus::Completed,
        Err(err) => {
            warn!(error = %err, "captured failure from submitted work");
            JobStatus::Failed
        }
    };
    slot.complete(outcome);
    status
}

/// Convert an `anyhow` error into a captured computation failure, keeping its chain.
pub(crate) fn from_anyhow(err: &anyhow::Error) -> ExecutorError {
    ExecutorError::ComputationFailure(format!("{err:#}"))
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
