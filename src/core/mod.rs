//! Core executor, result handles and guarded resources.

pub mod error;
pub mod executor;
pub mod guarded;
pub mod result_handle;

pub(crate) mod task_queue;
pub(crate) mod work_item;

pub use error::{AppResult, ExecutorError};
pub use executor::{Executor, ExecutorStats};
pub use guarded::GuardedResource;
pub use result_handle::ResultHandle;
