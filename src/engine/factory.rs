// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::thread;

use crate::engine::clone_cache::{CloneCache, FnClone, ThreadLocalFn};
use crate::engine::invalidating::InvalidatingEvaluator;
use crate::engine::pardo::{AppliedTransform, ParDoEvaluator};
use crate::errors::EvaluationError;
use crate::traits::{DoFn, EvaluationContext, TransformEvaluator, TransformEvaluatorFactory};
use crate::values::CommittedBundle;

/// Builds evaluators for multi-output element-wise transforms.
///
/// One factory serves every bundle of every application of its function type for the
/// whole run and owns the clone cache those bundles draw from. Each evaluator it
/// returns runs on the calling thread's clone and is wrapped so that a failure
/// discards that clone.
pub struct ParDoMultiEvaluatorFactory<F: DoFn> {
    fn_clones: CloneCache<F>,
}

impl<F: DoFn> ParDoMultiEvaluatorFactory<F> {
    pub fn new() -> Self {
        Self {
            fn_clones: CloneCache::new(),
        }
    }

    /// Per-thread clones for the canonical function of `application`.
    pub fn holder_for(&self, application: &AppliedTransform<F>) -> Arc<ThreadLocalFn<F>> {
        self.fn_clones.holder(application.transform().fn_())
    }

    pub fn cached_functions(&self) -> usize {
        self.fn_clones.len()
    }

    fn create_evaluator(
        application: &AppliedTransform<F>,
        input: &CommittedBundle<F::Input>,
        context: &dyn EvaluationContext,
        holder: &ThreadLocalFn<F>,
        thread: thread::ThreadId,
    ) -> Result<(ParDoEvaluator<F>, FnClone<F>), EvaluationError> {
        let fn_clone = holder
            .current(thread)
            .map_err(|source| EvaluationError::CloneConstruction {
                transform: application.full_name().to_string(),
                source,
            })?;
        let evaluator = ParDoEvaluator::create(application, input, Arc::clone(&fn_clone), context)?;
        Ok((evaluator, fn_clone))
    }
}

impl<F: DoFn> Default for ParDoMultiEvaluatorFactory<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: DoFn> TransformEvaluatorFactory<F> for ParDoMultiEvaluatorFactory<F> {
    fn for_application(
        &self,
        application: &AppliedTransform<F>,
        input: &CommittedBundle<F::Input>,
        context: &dyn EvaluationContext,
    ) -> Result<Box<dyn TransformEvaluator<F::Input, F::Output>>, EvaluationError> {
        let holder = self.holder_for(application);
        let thread = thread::current().id();

        match Self::create_evaluator(application, input, context, &holder, thread) {
            Ok((evaluator, fn_clone)) => Ok(InvalidatingEvaluator::wrapping(
                application.full_name(),
                Box::new(evaluator),
                holder,
                thread,
                fn_clone,
            )),
            Err(err) => {
                // Never hand out a clone whose bundle setup half-ran.
                holder.discard(thread);
                Err(err)
            }
        }
    }
}
