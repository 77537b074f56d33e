pub mod bundle_executor;
pub mod clone_cache;
pub mod context;
pub mod factory;
pub mod invalidating;
pub mod pardo;
#[cfg(test)]
pub mod integration_tests;

pub use bundle_executor::{BundleExecutor, BundleOutcome};
pub use clone_cache::{CloneCache, ThreadLocalFn};
pub use context::InProcessEvaluationContext;
pub use factory::ParDoMultiEvaluatorFactory;
pub use invalidating::InvalidatingEvaluator;
pub use pardo::{AppliedTransform, ParDoBoundMulti, ParDoEvaluator};
