//! Serialized access to a single value through an executor.
//!
//! A [`GuardedResource`] moves its value into a drain loop that runs as one
//! long-lived task on an [`Executor`]. Every [`access`](GuardedResource::access)
//! pushes a closure onto a private queue that only the drain loop pops, so
//! exactly one closure touches the value at a time and closures run in the
//! order their pushes completed. There is no lock around the value itself:
//! the only lock is the private queue's.
//!
//! ```
//! use prometheus_executor::core::{Executor, GuardedResource};
//!
//! let executor = Executor::new(2)?;
//! let log = GuardedResource::new(String::from("start"), &executor)?;
//!
//! log.access(|s| s.push('A'));
//! let len = log.access(|s| s.len()).get()?;
//! assert_eq!(len, 6);
//! assert_eq!(log.into_inner()?, "startA");
//! # Ok::<(), prometheus_executor::core::ExecutorError>(())
//! ```
//!
//! # Worker cost
//!
//! Each live resource pins one executor worker for its whole lifetime. An
//! executor hosts at most `thread_count` resources; creating one more fails
//! with [`ExecutorError::Oversubscribed`]. While every worker is pinned,
//! plain submissions queue until a resource is dropped.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::result_handle::{channel, ResultHandle};
use super::task_queue::TaskQueue;
use super::work_item::{from_anyhow, run_captured, JobStatus};
use super::{Executor, ExecutorError};

type ApplyFn<T> = Box<dyn FnOnce(&mut T) -> JobStatus + Send + 'static>;

/// Entry in a resource's private queue.
enum Action<T> {
    /// Apply a user closure to the value.
    Apply(ApplyFn<T>),
    /// Stop the drain loop and hand the value back.
    Terminate,
}

/// A value whose every read and write is funneled through one drain task.
///
/// Not `Clone`: the resource is tied to one drain loop and one queue. To
/// duplicate the value, clone it inside an access:
/// `resource.access(|v| v.clone())`.
///
/// Dropping the resource blocks until every access submitted before the
/// drop has run and the drain loop has exited.
pub struct GuardedResource<'e, T: Send + 'static> {
    executor: &'e Executor,
    actions: Arc<TaskQueue<Action<T>>>,
    drain: Option<ResultHandle<T>>,
}

impl<'e, T: Send + 'static> GuardedResource<'e, T> {
    /// Wrap `value` and start its drain loop on `executor`.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::Oversubscribed` if every worker is already pinned
    /// - `ExecutorError::ExecutorClosed` if the executor is shutting down
    pub fn new(value: T, executor: &'e Executor) -> Result<Self, ExecutorError> {
        let pinned = executor.pin_worker()?;

        let actions = Arc::new(TaskQueue::new());
        let queue = Arc::clone(&actions);
        let drain = match executor.submit(move || drain_loop(value, &queue)) {
            Ok(handle) => handle,
            Err(err) => {
                executor.unpin_worker();
                return Err(err);
            }
        };

        debug!(
            pinned = pinned,
            thread_count = executor.thread_count(),
            "Guarded resource drain loop scheduled"
        );

        Ok(Self {
            executor,
            actions,
            drain: Some(drain),
        })
    }

    /// Run `action` against the value and get a handle to its result.
    ///
    /// Returns immediately. Actions run one at a time in the order they were
    /// queued. A panic in `action` is captured into the handle; the value
    /// keeps whatever state the action left it in.
    pub fn access<F, R>(&self, action: F) -> ResultHandle<R>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.enqueue(move |value| Ok(action(value)))
    }

    /// Run a fallible `action` against the value.
    ///
    /// An `Err` is captured into the handle as
    /// `ExecutorError::ComputationFailure`.
    pub fn try_access<F, R>(&self, action: F) -> ResultHandle<R>
    where
        F: FnOnce(&mut T) -> anyhow::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.enqueue(move |value| action(value).map_err(|e| from_anyhow(&e)))
    }

    fn enqueue<F, R>(&self, action: F) -> ResultHandle<R>
    where
        F: FnOnce(&mut T) -> Result<R, ExecutorError> + Send + 'static,
        R: Send + 'static,
    {
        let (slot, handle) = channel();
        let apply: ApplyFn<T> =
            Box::new(move |value: &mut T| run_captured(slot, move || action(value)));
        self.actions.push(Action::Apply(apply));
        handle
    }

    /// Number of accesses queued but not yet started.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    /// Wait for every queued access, stop the drain loop and return the value.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::Abandoned` if the drain loop never ran, which
    /// happens only when its executor was torn down underneath it.
    pub fn into_inner(mut self) -> Result<T, ExecutorError> {
        self.terminate().unwrap_or(Err(ExecutorError::Abandoned))
    }

    fn terminate(&mut self) -> Option<Result<T, ExecutorError>> {
        let drain = self.drain.take()?;
        self.actions.push(Action::Terminate);
        let outcome = drain.get();
        self.executor.unpin_worker();
        debug!("Guarded resource drain loop finished");
        Some(outcome)
    }
}

impl<T: Send + 'static> Drop for GuardedResource<'_, T> {
    fn drop(&mut self) {
        if let Some(Err(err)) = self.terminate() {
            warn!(error = %err, "Guarded resource drain loop ended abnormally");
        }
    }
}

impl<T: Send + 'static> fmt::Debug for GuardedResource<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedResource")
            .field("pending", &self.pending())
            .field("running", &self.drain.is_some())
            .finish_non_exhaustive()
    }
}

/// Apply queued actions to `value` until told to stop.
fn drain_loop<T>(mut value: T, actions: &TaskQueue<Action<T>>) -> T {
    loop {
        match actions.pop() {
            Action::Apply(apply) => {
                // Failures are already captured into the action's own handle
                // and stay out of `ExecutorStats`.
                let _ = apply(&mut value);
            }
            Action::Terminate => return value,
        }
    }
}
