//! Worker thread loop.

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::config::ExecutorConfig;
use crate::core::task_queue::TaskQueue;
use crate::core::work_item::{JobStatus, WorkItem};

use super::ExecutorCounters;

/// Spawn a worker thread.
///
/// The worker blocks on `queue` and runs jobs until it pops a
/// [`WorkItem::Shutdown`]. Jobs capture their own panics, so the loop only
/// ends on the poison pill.
pub(super) fn spawn_worker(
    worker_id: usize,
    config: &ExecutorConfig,
    queue: Arc<TaskQueue<WorkItem>>,
    counters: Arc<ExecutorCounters>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{}-{worker_id}", config.thread_name_prefix))
        .stack_size(config.thread_stack_size)
        .spawn(move || {
            debug!(worker_id = worker_id, "Worker thread started");

            loop {
                let job = match queue.pop() {
                    WorkItem::Run(job) => job,
                    WorkItem::Shutdown => {
                        debug!(worker_id = worker_id, "Worker received shutdown, exiting");
                        break;
                    }
                };

                counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                counters.active_tasks.fetch_add(1, Ordering::Relaxed);

                let status = job();

                counters.active_tasks.fetch_sub(1, Ordering::Relaxed);
                match status {
                    JobStatus::Completed => {
                        counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                    }
                    JobStatus::Failed => {
                        counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            debug!(worker_id = worker_id, "Worker thread exiting");
        })
}
