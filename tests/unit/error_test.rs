//! Tests for error types

use prometheus_executor::core::ExecutorError;

#[test]
fn test_invalid_argument_error() {
    let err = ExecutorError::InvalidArgument("thread_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid argument: thread_count must be greater than 0"
    );
}

#[test]
fn test_executor_closed_error() {
    let err = ExecutorError::ExecutorClosed;
    assert_eq!(format!("{}", err), "executor is closed");
}

#[test]
fn test_computation_failure_error() {
    let err = ExecutorError::ComputationFailure("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "computation failed: index out of bounds");
    assert!(err.is_computation_failure());
}

#[test]
fn test_timeout_and_abandoned_errors() {
    assert_eq!(format!("{}", ExecutorError::Timeout), "operation timed out");
    assert_eq!(
        format!("{}", ExecutorError::Abandoned),
        "result abandoned before completion"
    );
}

#[test]
fn test_errors_convert_to_anyhow() {
    fn submit_like() -> prometheus_executor::AppResult<()> {
        let closed: Result<(), ExecutorError> = Err(ExecutorError::ExecutorClosed);
        closed?;
        Ok(())
    }
    let err = submit_like().unwrap_err();
    assert_eq!(
        err.downcast_ref::<ExecutorError>(),
        Some(&ExecutorError::ExecutorClosed)
    );
}
