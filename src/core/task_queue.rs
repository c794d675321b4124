//! Blocking FIFO queue shared between submitters and worker threads.
//!
//! The queue is the only structure in the crate that needs its own lock. A
//! `parking_lot` mutex guards the sequence and a condvar parks poppers while
//! it is empty, so idle workers sleep instead of spinning.

use std::collections::VecDeque;
#[cfg(test)]
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Thread-safe FIFO that blocks poppers while empty.
pub(crate) struct TaskQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> TaskQueue<T> {
    /// Create an empty queue.
    pub(crate) fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append an item at the tail and wake one blocked popper.
    pub(crate) fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        // Notify while holding the lock so a popper about to park cannot miss it.
        self.available.notify_one();
    }

    /// Remove the head item, parking the calling thread until one exists.
    pub(crate) fn pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.available.wait(&mut items);
        }
    }

    /// Like [`pop`](Self::pop) but gives up once `timeout` has elapsed.
    #[cfg(test)]
    pub(crate) fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.pop());
        };
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            if self.available.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Number of items currently queued.
    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue currently holds no items.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
