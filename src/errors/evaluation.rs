// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building or driving a transform evaluator.

use crate::values::{PCollectionView, TupleTag};
use thiserror::Error;

/// Error type returned by user functions.
pub type FnError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A user function could not produce an independent copy of itself.
///
/// This is a configuration problem, not a per-bundle one: retrying the bundle will
/// hit the same failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("function '{function}' cannot be cloned: {reason}")]
pub struct CloneError {
    pub function: String,
    pub reason: String,
}

impl CloneError {
    pub fn new(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The canonical function could not be cloned for the calling thread.
    #[error("transform '{transform}': clone construction failed")]
    CloneConstruction {
        transform: String,
        #[source]
        source: CloneError,
    },

    /// The user function failed in its start-of-bundle hook.
    #[error("transform '{transform}': start_bundle failed: {source}")]
    StartBundle {
        transform: String,
        #[source]
        source: FnError,
    },

    /// The user function failed while processing an element.
    #[error("transform '{transform}': element processing failed: {source}")]
    ElementProcessing {
        transform: String,
        #[source]
        source: FnError,
    },

    /// The user function failed in its end-of-bundle hook.
    #[error("transform '{transform}': finish_bundle failed: {source}")]
    FinishBundle {
        transform: String,
        #[source]
        source: FnError,
    },

    /// An element was emitted under a tag the transform never declared.
    #[error("transform '{transform}' emitted to undeclared output tag '{tag}'")]
    UnknownOutputTag { transform: String, tag: TupleTag },

    /// A declared side input has no materialized view in the evaluation context.
    #[error("transform '{transform}': side input '{view}' is not available")]
    SideInputUnavailable {
        transform: String,
        view: PCollectionView,
    },

    /// The user function read a side input the transform never declared.
    #[error("transform '{transform}' read undeclared side input '{view}'")]
    SideInputNotDeclared {
        transform: String,
        view: PCollectionView,
    },

    /// The side input exists but holds a different type than requested.
    #[error("transform '{transform}': side input '{view}' has an unexpected type")]
    SideInputTypeMismatch {
        transform: String,
        view: PCollectionView,
    },

    /// The evaluator already failed; its bundle must be re-run with a new evaluator.
    #[error("transform '{transform}': evaluator already failed and cannot be reused")]
    EvaluatorPoisoned { transform: String },
}

impl EvaluationError {
    /// Failures raised by user code that a scheduler may retry with a fresh clone.
    ///
    /// Clone failures, undeclared tags and side-input wiring problems are
    /// configuration or programming errors and will fail again on retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvaluationError::StartBundle { .. }
                | EvaluationError::ElementProcessing { .. }
                | EvaluationError::FinishBundle { .. }
        )
    }

    pub fn transform(&self) -> &str {
        match self {
            EvaluationError::CloneConstruction { transform, .. }
            | EvaluationError::StartBundle { transform, .. }
            | EvaluationError::ElementProcessing { transform, .. }
            | EvaluationError::FinishBundle { transform, .. }
            | EvaluationError::UnknownOutputTag { transform, .. }
            | EvaluationError::SideInputUnavailable { transform, .. }
            | EvaluationError::SideInputNotDeclared { transform, .. }
            | EvaluationError::SideInputTypeMismatch { transform, .. }
            | EvaluationError::EvaluatorPoisoned { transform } => transform,
        }
    }
}
