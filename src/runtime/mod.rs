//! Runtime adapters for awaiting executor results from async code.

pub mod tokio_bridge;
