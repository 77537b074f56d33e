pub mod do_fn;
pub mod evaluator;

pub use do_fn::{DoFn, FinishBundleContext, ProcessContext};
pub use evaluator::{EvaluationContext, TransformEvaluator, TransformEvaluatorFactory};
