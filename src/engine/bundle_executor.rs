// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bundle executor: runs input bundles through a transform on a pool of worker threads.
//!
//! The executor plays the scheduler's role around the evaluator core. It does not know
//! how evaluators are built or how function clones are managed; it asks a
//! [`TransformEvaluatorFactory`] for an evaluator, drives it through the bundle and
//! collects the result.
//!
//! # Execution model
//!
//! - Each bundle runs on a tokio blocking worker, so evaluator construction, every
//!   element and the finish call all happen on one OS thread.
//! - A semaphore caps the number of bundles in flight at `max_concurrency`.
//! - A bundle that fails with a recoverable error (user code failed) is re-run from its
//!   first element with a new evaluator, up to `retry_attempts` more times. The factory
//!   hands the retry a fresh function clone because the failed one was invalidated.
//! - Configuration and programming errors are never retried.
//!
//! # Failure strategies
//!
//! - [`FailureStrategy::FailFast`]: no new bundle is started after the first failure and
//!   that failure is returned. Bundles already in flight run to completion.
//! - [`FailureStrategy::ContinueOnError`]: every bundle runs; failures are reported in
//!   the returned outcomes.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bundle_fanout::backends::local::ChangeTextCaseFn;
//! use bundle_fanout::engine::{AppliedTransform, BundleExecutor, InProcessEvaluationContext, ParDoBoundMulti, ParDoMultiEvaluatorFactory};
//! use bundle_fanout::errors::FailureStrategy;
//! use bundle_fanout::values::{CommittedBundle, PCollectionId, TupleTag, WindowedValue};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let application = Arc::new(AppliedTransform::new(
//!     "upper",
//!     PCollectionId::new("lines"),
//!     ParDoBoundMulti::new(ChangeTextCaseFn::upper(), TupleTag::new("main")),
//! ));
//! let bundle = CommittedBundle::new(
//!     PCollectionId::new("lines"),
//!     vec![WindowedValue::timestamped("hello".to_string(), 0)],
//! );
//!
//! let executor = BundleExecutor::new(2, 0, FailureStrategy::FailFast);
//! let outcomes = executor
//!     .execute(
//!         Arc::new(ParDoMultiEvaluatorFactory::new()),
//!         application,
//!         vec![bundle],
//!         Arc::new(InProcessEvaluationContext::new()),
//!     )
//!     .await?;
//!
//! let result = outcomes[0].result.as_ref().unwrap();
//! assert_eq!(result.values(&TupleTag::new("main")), vec!["HELLO"]);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::engine::pardo::AppliedTransform;
use crate::errors::{EvaluationError, ExecutionError, FailureStrategy};
use crate::observability::messages::executor::{
    BundleFailed, BundleRetrying, ExecutionCompleted, ExecutionStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DoFn, EvaluationContext, TransformEvaluatorFactory};
use crate::values::{CommittedBundle, TransformResult};

/// What happened to one input bundle.
#[derive(Debug)]
pub struct BundleOutcome<T> {
    pub bundle_index: usize,
    pub attempts: u32,
    pub result: Result<TransformResult<T>, EvaluationError>,
}

impl<T> BundleOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct BundleExecutor {
    max_concurrency: usize,
    retry_attempts: u32,
    failure_strategy: FailureStrategy,
}

impl BundleExecutor {
    pub fn new(max_concurrency: usize, retry_attempts: u32, failure_strategy: FailureStrategy) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1), // Ensure at least 1
            retry_attempts,
            failure_strategy,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn failure_strategy(&self) -> FailureStrategy {
        self.failure_strategy
    }

    /// Run every bundle through `application` and return one outcome per started
    /// bundle, ordered by bundle index.
    pub async fn execute<F, Fac>(
        &self,
        factory: Arc<Fac>,
        application: Arc<AppliedTransform<F>>,
        bundles: Vec<CommittedBundle<F::Input>>,
        context: Arc<dyn EvaluationContext>,
    ) -> Result<Vec<BundleOutcome<F::Output>>, ExecutionError>
    where
        F: DoFn,
        Fac: TransformEvaluatorFactory<F> + 'static,
    {
        let started = Instant::now();
        let started_msg = ExecutionStarted {
            transform: application.full_name(),
            bundle_count: bundles.len(),
            max_concurrency: self.max_concurrency,
        };
        started_msg.log();
        let span = started_msg.span("execute");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let abort = Arc::new(AtomicBool::new(false));
        let max_attempts = self.retry_attempts.saturating_add(1);
        let fail_fast = self.failure_strategy == FailureStrategy::FailFast;
        let mut tasks = JoinSet::new();

        for (bundle_index, bundle) in bundles.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExecutionError::InternalError {
                    message: format!("worker semaphore closed: {}", e),
                })?;
            if abort.load(Ordering::SeqCst) {
                break;
            }

            let factory = Arc::clone(&factory);
            let application = Arc::clone(&application);
            let context = Arc::clone(&context);
            let abort = Arc::clone(&abort);
            let span = span.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let _entered = span.enter();
                let outcome = run_bundle(
                    factory.as_ref(),
                    &application,
                    &bundle,
                    context.as_ref(),
                    bundle_index,
                    max_attempts,
                );
                if fail_fast && !outcome.is_success() {
                    abort.store(true, Ordering::SeqCst);
                }
                outcome
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    return Err(ExecutionError::WorkerPanicked {
                        message: e.to_string(),
                    });
                }
            }
        }
        outcomes.sort_by_key(|outcome| outcome.bundle_index);

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        ExecutionCompleted {
            transform: application.full_name(),
            succeeded: outcomes.len() - failed,
            failed,
            duration: started.elapsed(),
        }
        .log();

        if fail_fast {
            if let Some(position) = outcomes.iter().position(|o| !o.is_success()) {
                let outcome = outcomes.swap_remove(position);
                if let Err(source) = outcome.result {
                    return Err(ExecutionError::BundleFailed {
                        bundle_index: outcome.bundle_index,
                        attempts: outcome.attempts,
                        source,
                    });
                }
            }
        }

        Ok(outcomes)
    }
}

impl Default for BundleExecutor {
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency, 0, FailureStrategy::default())
    }
}

/// Drive one bundle to completion on the calling thread, retrying recoverable failures.
fn run_bundle<F, Fac>(
    factory: &Fac,
    application: &AppliedTransform<F>,
    bundle: &CommittedBundle<F::Input>,
    context: &dyn EvaluationContext,
    bundle_index: usize,
    max_attempts: u32,
) -> BundleOutcome<F::Output>
where
    F: DoFn,
    Fac: TransformEvaluatorFactory<F>,
{
    let mut attempt = 1;
    loop {
        match evaluate_once(factory, application, bundle, context) {
            Ok(result) => {
                return BundleOutcome {
                    bundle_index,
                    attempts: attempt,
                    result: Ok(result),
                }
            }
            Err(err) if err.is_recoverable() && attempt < max_attempts => {
                BundleRetrying {
                    bundle_index,
                    attempt,
                    max_attempts,
                    error: &err,
                }
                .log();
                attempt += 1;
            }
            Err(err) => {
                BundleFailed {
                    bundle_index,
                    attempts: attempt,
                    error: &err,
                }
                .log();
                return BundleOutcome {
                    bundle_index,
                    attempts: attempt,
                    result: Err(err),
                };
            }
        }
    }
}

fn evaluate_once<F, Fac>(
    factory: &Fac,
    application: &AppliedTransform<F>,
    bundle: &CommittedBundle<F::Input>,
    context: &dyn EvaluationContext,
) -> Result<TransformResult<F::Output>, EvaluationError>
where
    F: DoFn,
    Fac: TransformEvaluatorFactory<F>,
{
    let mut evaluator = factory.for_application(application, bundle, context)?;
    for element in bundle.elements() {
        evaluator.process_element(element)?;
    }
    evaluator.finish_bundle()
}
