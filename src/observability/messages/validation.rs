// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration validation completed without errors.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use bundle_fanout::observability::messages::validation::ValidationCompleted;
///
/// let msg = ValidationCompleted {
///     transform: "tokenize",
///     output_tags: 2,
///     side_inputs: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ValidationCompleted<'a> {
    pub transform: &'a str,
    pub output_tags: usize,
    pub side_inputs: usize,
}

impl Display for ValidationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration for '{}' is valid: output_tags={}, side_inputs={}",
            self.transform, self.output_tags, self.side_inputs
        )
    }
}

impl StructuredLog for ValidationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            transform = self.transform,
            output_tags = self.output_tags,
            side_inputs = self.side_inputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("validation", span_name = name, transform = self.transform)
    }
}

/// Configuration validation found one or more errors.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed<'a> {
    pub transform: &'a str,
    pub error_count: usize,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration for '{}' failed validation with {} error(s)",
            self.transform, self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transform = self.transform,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "validation",
            span_name = name,
            transform = self.transform,
            error_count = self.error_count,
        )
    }
}
