// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Problems found while validating a transform configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("output tag names must not be empty")]
    EmptyOutputTag,

    #[error("side output tag '{tag}' is declared more than once")]
    DuplicateOutputTag { tag: String },

    #[error("main output tag '{tag}' is also declared as a side output")]
    MainTagReusedAsSideOutput { tag: String },

    #[error("side input '{view}' is declared by the transform but has no materialized values")]
    UnresolvedSideInput { view: String },

    #[error("unknown local function '{name}'")]
    UnknownFunction { name: String },

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("failed to build function '{name}': {reason}")]
    FunctionCreation { name: String, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
