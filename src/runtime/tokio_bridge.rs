//! Await [`ResultHandle`]s from a tokio runtime.
//!
//! Result handles block on a `parking_lot` condvar. Awaiting one from async
//! code moves that wait onto tokio's blocking pool so runtime workers stay
//! free.

use std::time::Duration;

use tracing::warn;

use crate::core::{ExecutorError, ResultHandle};

impl<T: Send + 'static> ResultHandle<T> {
    /// Await the outcome without blocking the async runtime.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::Timeout` if the result is not ready within `timeout`
    /// - `ExecutorError::Abandoned` if the blocking waiter itself died, since
    ///   the outcome went down with it
    /// - any error [`get`](Self::get) would return
    pub async fn join_async(self, timeout: Duration) -> Result<T, ExecutorError> {
        // Fast path: already resolved, no need for a blocking thread.
        if self.is_ready() {
            return self.get();
        }

        let waiter = tokio::task::spawn_blocking(move || self.get_timeout(timeout));

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "Blocking result waiter did not complete");
                Err(ExecutorError::Abandoned)
            }
            Err(_) => Err(ExecutorError::Timeout),
        }
    }
}
