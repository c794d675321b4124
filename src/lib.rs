//! # Prometheus Executor
//!
//! A fixed-size worker-thread executor with asynchronous result handles, and
//! a guarded-resource wrapper that serializes every access to a value by
//! routing it through that same executor.
//!
//! ## Core Problem Solved
//!
//! Platform services run CPU-bound work (tokenization, embedding batches,
//! checkpoint encoding) off their request threads and need its results back
//! later, with failures delivered to whoever asked rather than killing a
//! thread. Some of that work also mutates shared state that must never be
//! touched by two threads at once.
//!
//! ## Key Features
//!
//! - **Fixed Worker Pool**: Exactly N OS threads, started up front, joined on shutdown
//! - **Result Handles**: Block, poll, bounded-wait, or await from tokio
//! - **Failure Capture**: Panics and `anyhow` errors land in the handle, never in the worker
//! - **Guarded Resources**: One drain task per value gives total ordering without a lock on the value
//! - **Clean Shutdown**: One poison pill per worker; queued work still runs
//!
//! ## Executor
//!
//! ```rust
//! use prometheus_executor::core::{Executor, ExecutorError};
//!
//! let executor = Executor::new(4)?;
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|i| executor.submit(move || i * i))
//!     .collect::<Result<_, _>>()?;
//! let squares: Vec<i32> = handles
//!     .into_iter()
//!     .map(|h| h.get())
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(squares, vec![0, 1, 4, 9, 16, 25, 36, 49]);
//!
//! let failed = executor.submit(|| -> i32 { panic!("bad shard") })?;
//! assert!(matches!(failed.get(), Err(ExecutorError::ComputationFailure(_))));
//! # Ok::<(), ExecutorError>(())
//! ```
//!
//! ## GuardedResource
//!
//! ```rust
//! use prometheus_executor::core::{Executor, GuardedResource};
//!
//! let executor = Executor::new(2)?;
//! let counter = GuardedResource::new(0_u64, &executor)?;
//!
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             for _ in 0..250 {
//!                 let _ = counter.access(|n| *n += 1);
//!             }
//!         });
//!     }
//! });
//! assert_eq!(counter.into_inner()?, 1000);
//! # Ok::<(), prometheus_executor::core::ExecutorError>(())
//! ```
//!
//! For complete examples, see:
//! - `tests/executor_test.rs` - Executor integration tests
//! - `tests/guarded_resource_test.rs` - Guarded resource integration tests

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Executor, result handles and guarded resources.
pub mod core;
/// Configuration models for executors.
pub mod config;
/// Runtime adapters for async callers.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::ExecutorConfig;
pub use crate::core::{
    AppResult, Executor, ExecutorError, ExecutorStats, GuardedResource, ResultHandle,
};
