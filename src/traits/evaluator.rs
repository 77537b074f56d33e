use std::any::Any;
use std::sync::Arc;

use crate::engine::pardo::AppliedTransform;
use crate::errors::EvaluationError;
use crate::traits::DoFn;
use crate::values::{CommittedBundle, PCollectionView, TransformResult, WindowedValue};

/// Drives one input bundle through one transform.
///
/// An evaluator is created per (transform, bundle) pair, fed every element of the
/// bundle in order, and then finished exactly once. After any call returns an error
/// the evaluator is done; the scheduler re-runs the bundle with a new evaluator.
pub trait TransformEvaluator<In, Out> {
    fn process_element(&mut self, element: &WindowedValue<In>) -> Result<(), EvaluationError>;

    fn finish_bundle(self: Box<Self>) -> Result<TransformResult<Out>, EvaluationError>;
}

/// The slice of the surrounding engine an evaluator is allowed to see.
pub trait EvaluationContext: Send + Sync {
    /// Materialized contents of a side input, if it is ready.
    fn side_input(&self, view: &PCollectionView) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Entry point the scheduler uses to obtain a ready evaluator for a bundle.
pub trait TransformEvaluatorFactory<F: DoFn>: Send + Sync {
    fn for_application(
        &self,
        application: &AppliedTransform<F>,
        input: &CommittedBundle<F::Input>,
        context: &dyn EvaluationContext,
    ) -> Result<Box<dyn TransformEvaluator<F::Input, F::Output>>, EvaluationError>;
}
