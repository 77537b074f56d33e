// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for transform evaluator lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An evaluator was built for one input bundle.
///
/// # Log Level
/// `debug!` - Emitted once per bundle
///
/// # Example
/// ```
/// use bundle_fanout::observability::messages::evaluator::EvaluatorCreated;
///
/// let msg = EvaluatorCreated {
///     transform: "tokenize",
///     input_elements: 128,
///     side_outputs: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct EvaluatorCreated<'a> {
    pub transform: &'a str,
    pub input_elements: usize,
    pub side_outputs: usize,
}

impl Display for EvaluatorCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluator for '{}' created: input_elements={}, side_outputs={}",
            self.transform, self.input_elements, self.side_outputs
        )
    }
}

impl StructuredLog for EvaluatorCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform,
            input_elements = self.input_elements,
            side_outputs = self.side_outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluator",
            span_name = name,
            transform = self.transform,
            input_elements = self.input_elements,
        )
    }
}

/// A bundle finished and its result is ready for commit.
///
/// # Log Level
/// `debug!` - Emitted once per bundle
pub struct BundleFinished<'a> {
    pub transform: &'a str,
    pub elements_processed: usize,
    pub outputs_emitted: usize,
    pub duration: Duration,
}

impl Display for BundleFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bundle for '{}' finished: processed={}, emitted={}, duration={:?}",
            self.transform, self.elements_processed, self.outputs_emitted, self.duration
        )
    }
}

impl StructuredLog for BundleFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform,
            elements_processed = self.elements_processed,
            outputs_emitted = self.outputs_emitted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluator",
            span_name = name,
            transform = self.transform,
            elements_processed = self.elements_processed,
        )
    }
}

/// A forwarded evaluator call failed and the thread's clone was invalidated.
///
/// # Log Level
/// `warn!` - The failure itself is reported to the scheduler unchanged
pub struct EvaluatorInvalidated<'a> {
    pub transform: &'a str,
    pub stage: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EvaluatorInvalidated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluator for '{}' failed during {}; invalidating thread clone: {}",
            self.transform, self.stage, self.error
        )
    }
}

impl StructuredLog for EvaluatorInvalidated<'_> {
    fn log(&self) {
        tracing::warn!(
            transform = self.transform,
            stage = self.stage,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "evaluator",
            span_name = name,
            transform = self.transform,
            stage = self.stage,
        )
    }
}
