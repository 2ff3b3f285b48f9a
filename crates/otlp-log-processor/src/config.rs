// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Environment-driven configuration for the log processor.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::ProcessorError;
use crate::util::parse_duration;

/// Address the gRPC server listens on.
const ENV_LISTEN_ADDR: &str = "LOG_PROCESSOR_LISTEN_ADDR";
/// Largest decoded request the server accepts, in bytes.
const ENV_MAX_RECEIVE_MESSAGE_SIZE: &str = "LOG_PROCESSOR_MAX_RECEIVE_MESSAGE_SIZE";
/// Attribute key whose values are counted.
const ENV_ATTRIBUTE_KEY: &str = "LOG_PROCESSOR_ATTRIBUTE_KEY";
/// Time between two stats reports (e.g. `10s`, `500ms`).
const ENV_DURATION: &str = "LOG_PROCESSOR_DURATION";
/// Capacity of the intake channel between ingestion and aggregation.
const ENV_BUFFER_SIZE: &str = "LOG_PROCESSOR_BUFFER_SIZE";
const ENV_LOG_LEVEL: &str = "LOG_PROCESSOR_LOG_LEVEL";
/// Where stats reports go: `stdout` or `log`.
const ENV_REPORTER: &str = "LOG_PROCESSOR_REPORTER";

pub const DEFAULT_LISTEN_ADDR: &str = "localhost:4317";
pub const DEFAULT_MAX_RECEIVE_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
pub const DEFAULT_ATTRIBUTE_KEY: &str = "service.name";
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReporterKind {
    /// Print the stats dump to standard output.
    #[default]
    Stdout,
    /// Emit the stats dump through the `tracing` subscriber.
    Log,
}

impl ReporterKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "log" | "tracing" => Some(Self::Log),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Host and port to bind, resolved at startup (e.g. `localhost:4317`)
    pub listen_addr: String,
    pub max_receive_message_size: usize,
    pub attribute_key: String,
    /// How often the running counts are reported
    pub flush_interval: Duration,
    /// Intake channel capacity; producers wait once it is full
    pub buffer_size: usize,
    pub log_level: String,
    pub reporter: ReporterKind,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_receive_message_size: DEFAULT_MAX_RECEIVE_MESSAGE_SIZE,
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            buffer_size: DEFAULT_BUFFER_SIZE,
            log_level: "info".to_string(),
            reporter: ReporterKind::default(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration from the process environment
    pub fn from_env() -> Result<Self, ProcessorError> {
        Self::from_env_iter(env::vars())
    }

    /// Create configuration from key/value pairs (typically for tests).
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env_iter<I, K, V>(iter: I) -> Result<Self, ProcessorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let defaults = Self::default();

        let listen_addr = map
            .get(ENV_LISTEN_ADDR)
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.listen_addr);
        let max_receive_message_size = map
            .get(ENV_MAX_RECEIVE_MESSAGE_SIZE)
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_receive_message_size);
        let attribute_key = map
            .get(ENV_ATTRIBUTE_KEY)
            .cloned()
            .unwrap_or(defaults.attribute_key);
        let flush_interval = map
            .get(ENV_DURATION)
            .and_then(|val| parse_duration(val))
            .unwrap_or(defaults.flush_interval);
        let buffer_size = map
            .get(ENV_BUFFER_SIZE)
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.buffer_size);
        let log_level = map
            .get(ENV_LOG_LEVEL)
            .map(|val| val.trim().to_lowercase())
            .unwrap_or(defaults.log_level);
        let reporter = map
            .get(ENV_REPORTER)
            .and_then(|val| ReporterKind::parse(val))
            .unwrap_or(defaults.reporter);

        let config = Self {
            listen_addr,
            max_receive_message_size,
            attribute_key,
            flush_interval,
            buffer_size,
            log_level,
            reporter,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ProcessorError> {
        if self.attribute_key.is_empty() {
            return Err(ProcessorError::InvalidConfig(
                "attribute key cannot be empty".to_string(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(ProcessorError::InvalidConfig(
                "buffer size must be greater than 0".to_string(),
            ));
        }

        if self.flush_interval.is_zero() {
            return Err(ProcessorError::InvalidConfig(
                "duration must be greater than 0".to_string(),
            ));
        }

        if self.max_receive_message_size == 0 {
            return Err(ProcessorError::InvalidConfig(
                "max receive message size must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ProcessorError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
