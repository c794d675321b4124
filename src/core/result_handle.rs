//! Write-once result channel between a worker thread and the submitter.
//!
//! Each submission creates a [`ResultSlot`] (kept by the job, written by the
//! worker) and a [`ResultHandle`] (returned to the caller). Both share one
//! entry guarded by a `parking_lot` mutex, with a condvar to wake waiters.
//!
//! Writing consumes the slot, so a second write cannot be expressed. A slot
//! that is dropped unwritten resolves the handle to
//! [`ExecutorError::Abandoned`] so no waiter blocks forever.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::ExecutorError;

/// Resolution state of a result entry.
enum SlotState<T> {
    /// Waiting for the producer.
    Pending,
    /// Producer has written its outcome.
    Ready(Result<T, ExecutorError>),
    /// Outcome has been moved out by the handle.
    Taken,
}

impl<T> SlotState<T> {
    const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

struct Shared<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

/// Create a connected slot/handle pair.
pub(crate) fn channel<T>() -> (ResultSlot<T>, ResultHandle<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(SlotState::Pending),
        ready: Condvar::new(),
    });
    (
        ResultSlot {
            shared: Some(Arc::clone(&shared)),
        },
        ResultHandle { shared },
    )
}

/// Producer side of a result channel. Written exactly once by the thread
/// that runs the computation.
pub(crate) struct ResultSlot<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> ResultSlot<T> {
    /// Resolve the channel and wake every waiter.
    pub(crate) fn complete(mut self, outcome: Result<T, ExecutorError>) {
        if let Some(shared) = self.shared.take() {
            resolve(&shared, outcome);
        }
    }
}

impl<T> Drop for ResultSlot<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            resolve(&shared, Err(ExecutorError::Abandoned));
        }
    }
}

fn resolve<T>(shared: &Shared<T>, outcome: Result<T, ExecutorError>) {
    let mut state = shared.state.lock();
    debug_assert!(state.is_pending(), "result channel written twice");
    *state = SlotState::Ready(outcome);
    shared.ready.notify_all();
}

/// Caller-held handle to the eventual outcome of a submitted computation.
///
/// The handle is pending until the worker resolves it, after which it holds
/// either the computed value or the captured failure. [`get`](Self::get)
/// surfaces that failure; a handle that is dropped unobserved simply
/// discards it (the worker already logged it).
pub struct ResultHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ResultHandle<T> {
    /// Whether the computation has finished, without blocking.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.shared.state.lock().is_pending()
    }

    /// Block until the computation has finished.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        while state.is_pending() {
            self.shared.ready.wait(&mut state);
        }
    }

    /// Block until the computation has finished or `timeout` elapses.
    ///
    /// Returns `true` if the result is ready. A timeout too large to
    /// represent as a deadline (such as `Duration::MAX`) waits without bound.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut state = self.shared.state.lock();
        while state.is_pending() {
            if self.shared.ready.wait_until(&mut state, deadline).timed_out() {
                return !state.is_pending();
            }
        }
        true
    }

    /// Block until the computation has finished and return its outcome.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::ComputationFailure` if the computation panicked or
    ///   returned an error
    /// - `ExecutorError::Abandoned` if the work was dropped without running
    pub fn get(self) -> Result<T, ExecutorError> {
        self.wait();
        self.take()
    }

    /// Like [`get`](Self::get) but gives up once `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::Timeout` if the result is not ready in time,
    /// otherwise the same errors as [`get`](Self::get).
    pub fn get_timeout(self, timeout: Duration) -> Result<T, ExecutorError> {
        if !self.wait_timeout(timeout) {
            return Err(ExecutorError::Timeout);
        }
        self.take()
    }

    fn take(self) -> Result<T, ExecutorError> {
        let mut state = self.shared.state.lock();
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(outcome) => outcome,
            // `get` consumes the handle, so the outcome can only be taken once.
            SlotState::Pending | SlotState::Taken => Err(ExecutorError::Abandoned),
        }
    }
}

impl<T> fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
