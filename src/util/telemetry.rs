//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs a default env-based subscriber if none is set.
///
/// Executor lifecycle events log at `info`, per-task and per-worker events at
/// `debug`, and captured task failures at `warn`. Set `RUST_LOG` (for example
/// `RUST_LOG=prometheus_executor=debug`) to choose what is shown.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}
