//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the worker thread count.
pub const ENV_THREADS: &str = "PROMETHEUS_EXECUTOR_THREADS";
/// Environment variable overriding the worker thread name prefix.
pub const ENV_THREAD_PREFIX: &str = "PROMETHEUS_EXECUTOR_THREAD_PREFIX";
/// Environment variable overriding the worker stack size in bytes.
pub const ENV_STACK_SIZE: &str = "PROMETHEUS_EXECUTOR_STACK_SIZE";

const MIN_STACK_SIZE: usize = 64 * 1024;

/// Configuration for an [`Executor`](crate::core::Executor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of worker threads. Fixed for the executor's lifetime.
    pub thread_count: usize,
    /// Worker threads are named `{thread_name_prefix}-{index}`.
    pub thread_name_prefix: String,
    /// Stack size for each worker thread, in bytes.
    pub thread_stack_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_count: num_cpus::get(),
            thread_name_prefix: "prom-exec".to_string(),
            thread_stack_size: 2 * 1024 * 1024,
        }
    }
}

impl ExecutorConfig {
    /// Default configuration: one worker per logical CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_count == 0 {
            return Err("thread_count must be greater than 0".into());
        }
        if self.thread_stack_size < MIN_STACK_SIZE {
            return Err(format!(
                "thread_stack_size must be at least {MIN_STACK_SIZE} bytes"
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a message on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Returns a message if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_THREADS) {
            cfg.thread_count = parse_usize(ENV_THREADS, &raw)?;
        }
        if let Some(prefix) = lookup(ENV_THREAD_PREFIX) {
            cfg.thread_name_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_STACK_SIZE) {
            cfg.thread_stack_size = parse_usize(ENV_STACK_SIZE, &raw)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|e| format!("{key}: cannot parse `{raw}`: {e}"))
}
