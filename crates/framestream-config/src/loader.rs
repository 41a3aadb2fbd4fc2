// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are resolved in three tiers, later tiers winning:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, FramestreamConfig, LogFormat};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "framestream.toml";
const CONFIG_PATH_ENV: &str = "FRAMESTREAM_CONFIG_PATH";

/// Find the framestream configuration file
///
/// Search order:
/// 1. `FRAMESTREAM_CONFIG_PATH` environment variable
/// 2. Current working directory: `./framestream.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "framestream configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FramestreamConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: FramestreamConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `FRAMESTREAM_LOG_LEVEL` -> `logging.level`
/// - `FRAMESTREAM_LOG_FORMAT` -> `logging.format`
/// - `FRAMESTREAM_LOG_DIR` -> `logging.log_dir`
/// - `FRAMESTREAM_TRACE_FRAMES` -> `pipeline.trace_frames`
/// - `FRAMESTREAM_MATERIALIZE_CAPACITY` -> `pipeline.materialize_capacity`
///
/// Values that fail to parse are ignored and the previous value is kept.
pub fn apply_environment_overrides(config: &mut FramestreamConfig) {
    if let Ok(value) = env::var("FRAMESTREAM_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("FRAMESTREAM_LOG_FORMAT") {
        if let Ok(format) = value.parse::<LogFormat>() {
            config.logging.format = format;
        }
    }
    if let Ok(value) = env::var("FRAMESTREAM_LOG_DIR") {
        config.logging.log_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FRAMESTREAM_TRACE_FRAMES") {
        config.pipeline.trace_frames = parse_flag(&value);
    }
    if let Ok(value) = env::var("FRAMESTREAM_MATERIALIZE_CAPACITY") {
        if let Ok(capacity) = value.parse::<usize>() {
            config.pipeline.materialize_capacity = capacity;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"log_level": "debug", "trace_frames": "true"}`)
pub fn apply_cli_overrides(config: &mut FramestreamConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        if let Ok(format) = value.parse::<LogFormat>() {
            config.logging.format = format;
        }
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("trace_frames") {
        config.pipeline.trace_frames = parse_flag(value);
    }
    if let Some(value) = cli_args.get("materialize_capacity") {
        if let Ok(capacity) = value.parse::<usize>() {
            config.pipeline.materialize_capacity = capacity;
        }
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}
