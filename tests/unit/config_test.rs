//! Tests for configuration validation

use prometheus_executor::config::ExecutorConfig;

#[test]
fn test_default_config_is_valid() {
    let config = ExecutorConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.thread_count, num_cpus::get());
}

#[test]
fn test_config_invalid_thread_count() {
    let invalid = ExecutorConfig::new().with_thread_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_stack_size() {
    let invalid = ExecutorConfig::new().with_thread_stack_size(4096);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_prefix() {
    let invalid = ExecutorConfig::new().with_thread_name_prefix("");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "thread_count": 6,
        "thread_name_prefix": "tokenizer",
        "thread_stack_size": 1048576
    }"#;

    let config = ExecutorConfig::from_json_str(json).unwrap();
    assert_eq!(config.thread_count, 6);
    assert_eq!(config.thread_name_prefix, "tokenizer");
    assert_eq!(config.thread_stack_size, 1_048_576);
}

#[test]
fn test_config_from_partial_json() {
    let config = ExecutorConfig::from_json_str(r#"{ "thread_count": 2 }"#).unwrap();
    assert_eq!(config.thread_count, 2);
    assert_eq!(config.thread_name_prefix, ExecutorConfig::default().thread_name_prefix);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(ExecutorConfig::from_json_str(r#"{ "thread_count": 0 }"#).is_err());
    assert!(ExecutorConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_json_round_trip() {
    let config = ExecutorConfig::new()
        .with_thread_count(3)
        .with_thread_name_prefix("ingest");
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(ExecutorConfig::from_json_str(&json).unwrap(), config);
}
