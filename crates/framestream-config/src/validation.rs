// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges before they reach the
//! logging and pipeline layers.

use crate::{ConfigError, ConfigResult, FramestreamConfig};

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound on the capacity reserved up front by eager materialization.
pub const MAX_MATERIALIZE_CAPACITY: usize = 1 << 24;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    UnknownLogLevel { level: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLogLevel { level } => write!(
                f,
                "Log level '{}' is not one of {}",
                level,
                KNOWN_LOG_LEVELS.join(", ")
            ),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &FramestreamConfig) -> ConfigResult<()> {
    let errors = collect_validation_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Returns every validation problem instead of stopping at the first one.
pub fn collect_validation_errors(config: &FramestreamConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::UnknownLogLevel {
            level: config.logging.level.clone(),
        });
    }

    if config.logging.retention_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: "must keep at least one run".to_string(),
        });
    }

    if config.pipeline.materialize_capacity > MAX_MATERIALIZE_CAPACITY {
        errors.push(ConfigValidationError::InvalidValue {
            field: "pipeline.materialize_capacity".to_string(),
            reason: format!(
                "{} exceeds the maximum of {}",
                config.pipeline.materialize_capacity, MAX_MATERIALIZE_CAPACITY
            ),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_case_insensitive() {
        let mut config = FramestreamConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FramestreamConfig::default();
        config.logging.level = "verbose".to_string();
        config.logging.retention_runs = 0;
        config.pipeline.materialize_capacity = MAX_MATERIALIZE_CAPACITY + 1;

        let errors = collect_validation_errors(&config);
        assert_eq!(errors.len(), 3);
        assert!(matches!(validate_config(&config), Err(ConfigError::ValidationError(_))));
    }
}
