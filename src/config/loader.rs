// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_BUNDLE_SIZE, DEFAULT_MAIN_OUTPUT};
use crate::errors::{ConfigError, FailureStrategy};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for a single-transform run.
///
/// # Fields
/// * `failure_strategy` - How to handle failed bundles (optional, defaults to FailFast)
/// * `executor_options` - Worker pool and retry options (optional)
/// * `transform` - The transform to apply to the input
/// * `side_inputs` - Materialized side-input values, keyed by view name
///
/// # Example
/// ```yaml
/// failure_strategy: continue_on_error
/// executor_options:
///   max_concurrency: 4
///   retry_attempts: 1
///   bundle_size: 2
/// transform:
///   name: filter
///   fn: stopword_filter
///   side_outputs: [dropped]
///   side_inputs: [stopwords]
/// side_inputs:
///   stopwords: [the, a, an]
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    pub transform: TransformConfig,
    #[serde(default)]
    pub side_inputs: HashMap<String, Vec<String>>,
}

/// Bundle executor options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of bundles in flight (defaults to CPU count)
/// * `retry_attempts` - Extra attempts for bundles that fail in user code (defaults to 0)
/// * `bundle_size` - Input lines per bundle
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
    pub retry_attempts: Option<u32>,
    pub bundle_size: Option<usize>,
}

impl ExecutorOptions {
    pub fn get_max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    pub fn get_retry_attempts(&self) -> u32 {
        self.retry_attempts.unwrap_or(0)
    }

    pub fn get_bundle_size(&self) -> usize {
        self.bundle_size.unwrap_or(DEFAULT_BUNDLE_SIZE).max(1)
    }
}

/// Configuration for the transform applied to every bundle.
///
/// # Example
/// ```yaml
/// name: "tokenize"
/// fn: "token_counter"
/// main_output: "main"
/// side_outputs: ["errors"]
/// ```
#[derive(Debug, Deserialize)]
pub struct TransformConfig {
    pub name: String,
    #[serde(rename = "fn")]
    pub fn_: String,
    #[serde(default = "default_main_output")]
    pub main_output: String,
    #[serde(default)]
    pub side_outputs: Vec<String>,
    #[serde(default)]
    pub side_inputs: Vec<String>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // function-specific options
}

impl TransformConfig {
    /// String-valued option, if present.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_yaml::Value::as_str)
    }
}

fn default_main_output() -> String {
    DEFAULT_MAIN_OUTPUT.to_string()
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config and reject it if the transform wiring is invalid.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_transform(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
