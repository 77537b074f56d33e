// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the bundle executor.
//!
//! This module contains message types for logging events related to:
//! * Execution lifecycle (start, completion)
//! * Bundle retries after recoverable failures
//! * Bundles that failed for good

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Execution of a set of bundles started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use bundle_fanout::observability::messages::executor::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     transform: "tokenize",
///     bundle_count: 3,
///     max_concurrency: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub transform: &'a str,
    pub bundle_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting execution of '{}': {} bundles, max_concurrency={}",
            self.transform, self.bundle_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            transform = self.transform,
            bundle_count = self.bundle_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            transform = self.transform,
            bundle_count = self.bundle_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Execution finished, successfully or with recorded failures.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub transform: &'a str,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution of '{}' completed: succeeded={}, failed={}, duration={:?}",
            self.transform, self.succeeded, self.failed, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            transform = self.transform,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            transform = self.transform,
        )
    }
}

/// A bundle failed with a recoverable error and will run again.
///
/// # Log Level
/// `warn!` - Potential issue
pub struct BundleRetrying<'a> {
    pub bundle_index: usize,
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for BundleRetrying<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bundle {} failed on attempt {}/{}, retrying: {}",
            self.bundle_index, self.attempt, self.max_attempts, self.error
        )
    }
}

impl StructuredLog for BundleRetrying<'_> {
    fn log(&self) {
        tracing::warn!(
            bundle_index = self.bundle_index,
            attempt = self.attempt,
            max_attempts = self.max_attempts,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "bundle",
            span_name = name,
            bundle_index = self.bundle_index,
            attempt = self.attempt,
        )
    }
}

/// A bundle failed for good.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct BundleFailed<'a> {
    pub bundle_index: usize,
    pub attempts: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for BundleFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bundle {} failed after {} attempt(s): {}",
            self.bundle_index, self.attempts, self.error
        )
    }
}

impl StructuredLog for BundleFailed<'_> {
    fn log(&self) {
        tracing::error!(
            bundle_index = self.bundle_index,
            attempts = self.attempts,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "bundle",
            span_name = name,
            bundle_index = self.bundle_index,
        )
    }
}
