//! Fixed-size worker-thread executor.
//!
//! An `Executor` owns exactly N OS threads that block on one shared
//! [`TaskQueue`]. [`Executor::submit`] boxes a closure together with the
//! producer side of a result channel, enqueues it, and hands the caller a
//! [`ResultHandle`] straight away.
//!
//! # Example
//!
//! ```
//! use prometheus_executor::core::Executor;
//!
//! let executor = Executor::new(2)?;
//! let sum = executor.submit(|| (1..=10).sum::<i32>())?;
//! assert_eq!(sum.get()?, 55);
//! # Ok::<(), prometheus_executor::core::ExecutorError>(())
//! ```
//!
//! # Shutdown
//!
//! [`Executor::shutdown`] closes the executor to new work, pushes one
//! [`WorkItem::Shutdown`] per worker and joins them all. Because the queue
//! is FIFO, everything submitted earlier still runs first. Dropping the
//! executor shuts it down.

mod worker;

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;

use super::result_handle::{channel, ResultHandle};
use super::task_queue::TaskQueue;
use super::work_item::{from_anyhow, run_captured, WorkItem};
use super::ExecutorError;

/// Snapshot of executor utilization.
///
/// Counts are per submitted task. A guarded resource's drain loop is one
/// task: it is active for the resource's whole lifetime and is counted as
/// completed once the resource is dropped. Individual guarded accesses are
/// not counted here; their failures surface only through their own handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Number of worker threads.
    pub thread_count: usize,

    /// Tasks waiting in the queue.
    pub queued_tasks: u64,

    /// Tasks currently executing, including guarded-resource drain loops.
    pub active_tasks: u64,

    /// Total tasks accepted by `submit`.
    pub submitted_tasks: u64,

    /// Total tasks that produced a value.
    pub completed_tasks: u64,

    /// Total tasks that panicked or returned an error.
    pub failed_tasks: u64,

    /// Workers currently held by guarded-resource drain loops.
    pub pinned_workers: usize,
}

/// Lock-free counters behind [`ExecutorStats`].
#[derive(Debug, Default)]
pub(crate) struct ExecutorCounters {
    pub queued_tasks: AtomicU64,
    pub active_tasks: AtomicU64,
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub failed_tasks: AtomicU64,
    pub pinned_workers: AtomicUsize,
}

impl ExecutorCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, thread_count: usize) -> ExecutorStats {
        ExecutorStats {
            thread_count,
            queued_tasks: self.queued_tasks.load(Ordering::Relaxed),
            active_tasks: self.active_tasks.load(Ordering::Relaxed),
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            pinned_workers: self.pinned_workers.load(Ordering::Acquire),
        }
    }
}

/// Pool of a fixed number of worker threads draining one shared queue.
pub struct Executor {
    /// Executor configuration.
    config: ExecutorConfig,

    /// Shared queue all workers pop from.
    queue: Arc<TaskQueue<WorkItem>>,

    /// Closed flag. Submitters hold the read side across check-and-push so
    /// no job can be queued behind the shutdown pills.
    closed: RwLock<bool>,

    /// Worker thread handles, drained by the first `shutdown`.
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Statistics counters.
    counters: Arc<ExecutorCounters>,
}

impl Executor {
    /// Create an executor with `thread_count` workers and default settings.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::InvalidArgument` if `thread_count` is 0
    /// - `ExecutorError::Spawn` if a worker thread cannot be started
    pub fn new(thread_count: usize) -> Result<Self, ExecutorError> {
        Self::with_config(ExecutorConfig::new().with_thread_count(thread_count))
    }

    /// Create an executor from a full configuration.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::InvalidArgument` if the configuration is invalid
    /// - `ExecutorError::Spawn` if a worker thread cannot be started
    pub fn with_config(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate().map_err(ExecutorError::InvalidArgument)?;

        let queue = Arc::new(TaskQueue::new());
        let counters = Arc::new(ExecutorCounters::default());
        let mut workers = Vec::with_capacity(config.thread_count);

        for worker_id in 0..config.thread_count {
            match worker::spawn_worker(
                worker_id,
                &config,
                Arc::clone(&queue),
                Arc::clone(&counters),
            ) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Stop the workers that did start before reporting.
                    for _ in 0..workers.len() {
                        queue.push(WorkItem::Shutdown);
                    }
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(ExecutorError::Spawn(e.to_string()));
                }
            }
        }

        info!(
            thread_count = config.thread_count,
            thread_name_prefix = %config.thread_name_prefix,
            "Executor started"
        );

        Ok(Self {
            config,
            queue,
            closed: RwLock::new(false),
            workers: Mutex::new(workers),
            counters,
        })
    }

    /// Submit a computation and get a handle to its result.
    ///
    /// Returns without waiting for the computation to start. A panic inside
    /// `f` is captured into the handle and surfaces from
    /// [`ResultHandle::get`] as `ExecutorError::ComputationFailure`.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::ExecutorClosed` once shutdown has begun.
    pub fn submit<F, R>(&self, f: F) -> Result<ResultHandle<R>, ExecutorError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.enqueue(move || Ok(f()))
    }

    /// Submit a fallible computation.
    ///
    /// An `Err` returned by `f` is captured exactly like a panic, with the
    /// full `anyhow` context chain as the failure message.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::ExecutorClosed` once shutdown has begun.
    pub fn try_submit<F, R>(&self, f: F) -> Result<ResultHandle<R>, ExecutorError>
    where
        F: FnOnce() -> anyhow::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.enqueue(move || f().map_err(|e| from_anyhow(&e)))
    }

    fn enqueue<F, R>(&self, work: F) -> Result<ResultHandle<R>, ExecutorError>
    where
        F: FnOnce() -> Result<R, ExecutorError> + Send + 'static,
        R: Send + 'static,
    {
        let closed = self.closed.read();
        if *closed {
            return Err(ExecutorError::ExecutorClosed);
        }

        let (slot, handle) = channel();
        self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
        self.counters.queued_tasks.fetch_add(1, Ordering::Relaxed);
        self.queue
            .push(WorkItem::Run(Box::new(move || run_captured(slot, work))));
        drop(closed);

        debug!("Task submitted to executor");
        Ok(handle)
    }

    /// Reserve a worker for a guarded-resource drain loop.
    ///
    /// Returns the number of pinned workers after the reservation.
    pub(crate) fn pin_worker(&self) -> Result<usize, ExecutorError> {
        let threads = self.thread_count();
        let pinned = self
            .counters
            .pinned_workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pinned| {
                (pinned < threads).then_some(pinned + 1)
            })
            .map(|previous| previous + 1)
            .map_err(|pinned| ExecutorError::Oversubscribed { pinned, threads })?;

        if pinned == threads {
            warn!(
                pinned = pinned,
                thread_count = threads,
                "All executor workers are pinned by drain loops; submitted tasks will wait"
            );
        }
        Ok(pinned)
    }

    /// Release a worker reserved by [`pin_worker`](Self::pin_worker).
    pub(crate) fn unpin_worker(&self) {
        self.counters.pinned_workers.fetch_sub(1, Ordering::AcqRel);
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn thread_count(&self) -> usize {
        self.config.thread_count
    }

    /// Whether shutdown has begun.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// Get current executor statistics.
    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        self.counters.snapshot(self.thread_count())
    }

    /// Shut the executor down and wait for its workers to exit.
    ///
    /// Work already queued is still executed. Calling this more than once
    /// has no further effect. Workers held by a guarded-resource drain loop
    /// only exit once that resource is dropped, so this blocks until then.
    pub fn shutdown(&self) {
        {
            let mut closed = self.closed.write();
            if *closed {
                return;
            }
            *closed = true;
            for _ in 0..self.thread_count() {
                self.queue.push(WorkItem::Shutdown);
            }
        }

        info!("Shutting down executor");

        let pinned = self.counters.pinned_workers.load(Ordering::Acquire);
        if pinned > 0 {
            warn!(
                pinned = pinned,
                "Waiting for guarded resources to release their workers"
            );
        }

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        let worker_count = workers.len();

        for (idx, worker) in workers.into_iter().enumerate() {
            if worker.thread().id() == current {
                // Shutdown requested from inside a task: the worker exits on its own pill.
                debug!(worker_id = idx, "Skipping join of the calling worker");
                continue;
            }
            match worker.join() {
                Ok(()) => debug!(worker_id = idx, "Worker joined successfully"),
                Err(_) => warn!(worker_id = idx, "Worker panicked"),
            }
        }

        info!(worker_count = worker_count, "Executor shut down complete");
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
