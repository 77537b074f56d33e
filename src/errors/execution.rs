// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EvaluationError;
use serde::Deserialize;
use thiserror::Error;

/// How the bundle executor reacts when a bundle fails after exhausting retries.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Stop scheduling new bundles and return the first failure.
    #[default]
    FailFast,
    /// Record the failure and keep executing the remaining bundles.
    ContinueOnError,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("bundle {bundle_index} failed after {attempts} attempt(s)")]
    BundleFailed {
        bundle_index: usize,
        attempts: u32,
        #[source]
        source: EvaluationError,
    },

    #[error("bundle worker panicked: {message}")]
    WorkerPanicked { message: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}
