//! Tests for utility functions

use prometheus_executor::core::Executor;
use prometheus_executor::util::init_tracing;

#[test]
fn test_init_tracing_then_run_work() {
    init_tracing();
    // A second call must not panic even though a subscriber is now set.
    init_tracing();

    let executor = Executor::new(1).unwrap();
    let handle = executor.submit(|| -> u8 { panic!("logged, not fatal") }).unwrap();
    assert!(handle.get().is_err());
}
