// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Evaluator decorator that invalidates a thread's function clone on failure.
//!
//! A function aborted halfway through a bundle may be left with partial state. The
//! policy is simple: any failure poisons the clone, any success trusts it. The wrapper
//! forwards each call untouched; when a call returns an error, or unwinds with a panic,
//! the calling thread's clone is discarded from its holder before the failure reaches
//! the scheduler. The error value itself is passed through as-is.
//!
//! Dropping an evaluator between calls (an abandoned bundle) leaves the clone cached.
//!
//! Only the clone the evaluator was built on is ever discarded. If that clone was
//! already replaced, for instance because a stale evaluator is driven after its
//! thread moved on to a fresh copy, the newer clone stays cached.

use std::sync::Arc;
use std::thread::ThreadId;

use crate::engine::clone_cache::{FnClone, ThreadLocalFn};
use crate::errors::EvaluationError;
use crate::observability::messages::evaluator::EvaluatorInvalidated;
use crate::observability::messages::StructuredLog;
use crate::traits::{DoFn, TransformEvaluator};
use crate::values::{TransformResult, WindowedValue};

pub struct InvalidatingEvaluator<F: DoFn> {
    transform: String,
    inner: Box<dyn TransformEvaluator<F::Input, F::Output>>,
    holder: Arc<ThreadLocalFn<F>>,
    thread: ThreadId,
    fn_clone: FnClone<F>,
}

impl<F: DoFn> InvalidatingEvaluator<F> {
    /// Wrap `inner`, which runs on `fn_clone`, the clone `holder` keeps for `thread`.
    pub fn wrapping(
        transform: impl Into<String>,
        inner: Box<dyn TransformEvaluator<F::Input, F::Output>>,
        holder: Arc<ThreadLocalFn<F>>,
        thread: ThreadId,
        fn_clone: FnClone<F>,
    ) -> Box<dyn TransformEvaluator<F::Input, F::Output>> {
        Box::new(Self {
            transform: transform.into(),
            inner,
            holder,
            thread,
            fn_clone,
        })
    }
}

impl<F: DoFn> TransformEvaluator<F::Input, F::Output> for InvalidatingEvaluator<F> {
    fn process_element(&mut self, element: &WindowedValue<F::Input>) -> Result<(), EvaluationError> {
        let guard = UnwindGuard::armed(&self.holder, self.thread, &self.fn_clone);
        let result = self.inner.process_element(element);
        guard.disarm();
        if let Err(err) = &result {
            invalidate(
                &self.transform,
                "process_element",
                err,
                &self.holder,
                self.thread,
                &self.fn_clone,
            );
        }
        result
    }

    fn finish_bundle(self: Box<Self>) -> Result<TransformResult<F::Output>, EvaluationError> {
        let Self {
            transform,
            inner,
            holder,
            thread,
            fn_clone,
        } = *self;

        let guard = UnwindGuard::armed(&holder, thread, &fn_clone);
        let result = inner.finish_bundle();
        guard.disarm();
        if let Err(err) = &result {
            invalidate(&transform, "finish_bundle", err, &holder, thread, &fn_clone);
        }
        result
    }
}

fn invalidate<F: DoFn>(
    transform: &str,
    stage: &str,
    error: &EvaluationError,
    holder: &ThreadLocalFn<F>,
    thread: ThreadId,
    fn_clone: &FnClone<F>,
) {
    // A poisoned evaluator already gave up its clone on the first failure.
    if matches!(error, EvaluationError::EvaluatorPoisoned { .. }) {
        return;
    }
    EvaluatorInvalidated {
        transform,
        stage,
        error,
    }
    .log();
    holder.discard_clone(thread, fn_clone);
}

/// Discards the clone if dropped while still armed, which only happens when a
/// forwarded call unwinds.
struct UnwindGuard<'a, F: DoFn> {
    holder: &'a ThreadLocalFn<F>,
    thread: ThreadId,
    fn_clone: &'a FnClone<F>,
    armed: bool,
}

impl<'a, F: DoFn> UnwindGuard<'a, F> {
    fn armed(holder: &'a ThreadLocalFn<F>, thread: ThreadId, fn_clone: &'a FnClone<F>) -> Self {
        Self {
            holder,
            thread,
            fn_clone,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<F: DoFn> Drop for UnwindGuard<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            self.holder.discard_clone(self.thread, self.fn_clone);
        }
    }
}
