//! Configuration models for executors.

pub mod executor;

pub use executor::ExecutorConfig;
