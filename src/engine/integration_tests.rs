// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Integration tests for the evaluator factory, invalidation and bundle executor
/// using stateful test functions and the built-in local functions.
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use crate::backends::local::{ConcatenateFn, FailOnMarkerFn, LocalFn, StopwordFilterFn};
    use crate::engine::{
        AppliedTransform, BundleExecutor, InProcessEvaluationContext, ParDoBoundMulti,
        ParDoMultiEvaluatorFactory,
    };
    use crate::errors::{
        CloneError, EvaluationError, ExecutionError, FailureStrategy, FnError,
    };
    use crate::traits::{
        DoFn, EvaluationContext, FinishBundleContext, ProcessContext, TransformEvaluatorFactory,
    };
    use crate::values::{CommittedBundle, PCollectionId, PCollectionView, TupleTag, WindowedValue};

    /// Counts the elements its clone has seen; fails on "FAIL"; can optionally emit
    /// every element to an "errors" side output or to an undeclared tag.
    #[derive(Debug, Default)]
    struct CountingFn {
        count: u64,
        mirror_to_errors: bool,
        swallow_undeclared: bool,
        fail_start: bool,
        flush_to_undeclared: bool,
    }

    impl DoFn for CountingFn {
        type Input = String;
        type Output = String;

        fn name(&self) -> &'static str {
            "counting"
        }

        fn clone_fn(&self) -> Result<Self, CloneError> {
            Ok(Self {
                count: 0,
                mirror_to_errors: self.mirror_to_errors,
                swallow_undeclared: self.swallow_undeclared,
                fail_start: self.fail_start,
                flush_to_undeclared: self.flush_to_undeclared,
            })
        }

        fn start_bundle(&mut self) -> Result<(), FnError> {
            if self.fail_start {
                return Err("cannot start".into());
            }
            Ok(())
        }

        fn process_element(
            &mut self,
            ctx: &mut ProcessContext<'_, String, String>,
        ) -> Result<(), FnError> {
            let element = ctx.element().clone();
            if element == "FAIL" {
                return Err(format!("boom on {}", element).into());
            }
            self.count += 1;
            if self.swallow_undeclared {
                let _ = ctx.side_output(&TupleTag::new("nope"), element.clone());
            }
            if self.mirror_to_errors {
                ctx.side_output(&TupleTag::new("errors"), format!("seen {}", element))?;
            }
            ctx.output(element);
            Ok(())
        }

        fn finish_bundle(
            &mut self,
            ctx: &mut FinishBundleContext<'_, String>,
        ) -> Result<(), FnError> {
            if self.flush_to_undeclared {
                let _ = ctx.side_output(&TupleTag::new("nope"), format!("count {}", self.count), 0);
            }
            Ok(())
        }
    }

    struct UncloneableFn;

    impl DoFn for UncloneableFn {
        type Input = String;
        type Output = String;

        fn name(&self) -> &'static str {
            "uncloneable"
        }

        fn clone_fn(&self) -> Result<Self, CloneError> {
            Err(CloneError::new("uncloneable", "holds a live socket"))
        }

        fn process_element(
            &mut self,
            _ctx: &mut ProcessContext<'_, String, String>,
        ) -> Result<(), FnError> {
            Ok(())
        }
    }

    /// Fails while the shared budget lasts; every clone draws from the same budget.
    struct FlakyFn {
        failures_left: Arc<AtomicUsize>,
    }

    impl DoFn for FlakyFn {
        type Input = String;
        type Output = String;

        fn name(&self) -> &'static str {
            "flaky"
        }

        fn clone_fn(&self) -> Result<Self, CloneError> {
            Ok(Self {
                failures_left: Arc::clone(&self.failures_left),
            })
        }

        fn process_element(
            &mut self,
            ctx: &mut ProcessContext<'_, String, String>,
        ) -> Result<(), FnError> {
            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err("transient failure".into());
            }
            let element = ctx.element().clone();
            ctx.output(element);
            Ok(())
        }
    }

    fn lines(values: &[&str]) -> CommittedBundle<String> {
        CommittedBundle::new(
            PCollectionId::new("input"),
            values
                .iter()
                .enumerate()
                .map(|(i, v)| WindowedValue::timestamped(v.to_string(), i as i64))
                .collect(),
        )
    }

    fn apply<F: DoFn>(fn_: F, side_outputs: &[&str]) -> AppliedTransform<F> {
        AppliedTransform::new(
            "count",
            PCollectionId::new("input"),
            ParDoBoundMulti::new(fn_, TupleTag::new("main"))
                .with_side_outputs(side_outputs.iter().map(|t| TupleTag::new(*t))),
        )
    }

    /// Elements counted by the calling thread's clone.
    fn clone_count(
        factory: &ParDoMultiEvaluatorFactory<CountingFn>,
        app: &AppliedTransform<CountingFn>,
    ) -> u64 {
        let fn_clone = factory.holder_for(app).current_thread().unwrap();
        let count = fn_clone.lock().count;
        count
    }

    #[test]
    fn test_counter_sees_every_element_in_order() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(CountingFn::default(), &[]);
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a", "b", "c"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        for element in bundle.elements() {
            evaluator.process_element(element).unwrap();
        }
        let result = evaluator.finish_bundle().unwrap();

        assert_eq!(result.values(&TupleTag::new("main")), vec!["a", "b", "c"]);
        assert_eq!(result.elements_processed, 3);
        assert_eq!(result.watermark_hold, None);
        assert_eq!(clone_count(&factory, &app), 3);

        // Another worker thread gets its own clone.
        thread::scope(|s| {
            s.spawn(|| {
                let bundle = lines(&["x"]);
                let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
                evaluator.process_element(&bundle.elements()[0]).unwrap();
                evaluator.finish_bundle().unwrap();
                assert_eq!(clone_count(&factory, &app), 1);
            });
        });
        assert_eq!(clone_count(&factory, &app), 3);
        assert_eq!(factory.holder_for(&app).live_clones(), 2);
    }

    #[test]
    fn test_failure_passes_cause_through_and_discards_clone() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(CountingFn::default(), &[]);
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a", "FAIL", "c"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        evaluator.process_element(&bundle.elements()[0]).unwrap();
        let err = evaluator.process_element(&bundle.elements()[1]).unwrap_err();

        match &err {
            EvaluationError::ElementProcessing { transform, source } => {
                assert_eq!(transform, "count");
                assert_eq!(source.to_string(), "boom on FAIL");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_recoverable());
        assert_eq!(factory.holder_for(&app).live_clones(), 0);

        // The next bundle on this thread starts from a fresh clone.
        assert_eq!(clone_count(&factory, &app), 0);
    }

    #[test]
    fn test_failed_evaluator_is_poisoned() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(CountingFn::default(), &[]);
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["FAIL", "c"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        assert!(evaluator.process_element(&bundle.elements()[0]).is_err());

        let err = evaluator.process_element(&bundle.elements()[1]).unwrap_err();
        assert!(matches!(err, EvaluationError::EvaluatorPoisoned { .. }));
        let err = evaluator.finish_bundle().unwrap_err();
        assert!(matches!(err, EvaluationError::EvaluatorPoisoned { .. }));
    }

    #[test]
    fn test_main_and_side_output_per_element() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(
            CountingFn {
                mirror_to_errors: true,
                ..CountingFn::default()
            },
            &["errors"],
        );
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a", "b"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        for element in bundle.elements() {
            evaluator.process_element(element).unwrap();
        }
        let result = evaluator.finish_bundle().unwrap();

        assert_eq!(result.values(&TupleTag::new("main")), vec!["a", "b"]);
        assert_eq!(
            result.values(&TupleTag::new("errors")),
            vec!["seen a", "seen b"]
        );
        assert_eq!(result.total_outputs(), 4);
        let errors = result.output(&TupleTag::new("errors")).unwrap();
        assert_eq!(errors.pcollection(), &PCollectionId::new("count.errors"));
        assert_eq!(errors.elements()[1].timestamp, 1);
    }

    #[test]
    fn test_same_thread_reuses_clone_across_bundles() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(CountingFn::default(), &[]);
        let context = InProcessEvaluationContext::new();

        let first = factory.holder_for(&app).current_thread().unwrap();
        for values in [&["a", "b"][..], &["c"][..]] {
            let bundle = lines(values);
            let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
            for element in bundle.elements() {
                evaluator.process_element(element).unwrap();
            }
            evaluator.finish_bundle().unwrap();
        }

        let second = factory.holder_for(&app).current_thread().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().count, 3);
        assert_eq!(factory.cached_functions(), 1);
    }

    #[test]
    fn test_swallowed_undeclared_tag_still_fails() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(
            CountingFn {
                swallow_undeclared: true,
                ..CountingFn::default()
            },
            &[],
        );
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        let err = evaluator.process_element(&bundle.elements()[0]).unwrap_err();

        match err {
            EvaluationError::UnknownOutputTag { tag, .. } => assert_eq!(tag, TupleTag::new("nope")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(factory.holder_for(&app).live_clones(), 0);
    }

    #[test]
    fn test_undeclared_tag_from_finish_bundle_fails_and_discards() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(
            CountingFn {
                flush_to_undeclared: true,
                ..CountingFn::default()
            },
            &[],
        );
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        evaluator.process_element(&bundle.elements()[0]).unwrap();
        let err = evaluator.finish_bundle().unwrap_err();

        match err {
            EvaluationError::UnknownOutputTag { tag, .. } => assert_eq!(tag, TupleTag::new("nope")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(factory.holder_for(&app).live_clones(), 0);
    }

    #[test]
    fn test_stale_evaluator_keeps_newer_clone() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(CountingFn::default(), &[]);
        let context = InProcessEvaluationContext::new();
        let failing = lines(&["FAIL"]);
        let healthy = lines(&["a", "b"]);

        let mut stale = factory.for_application(&app, &failing, &context).unwrap();
        assert!(stale.process_element(&failing.elements()[0]).is_err());

        let mut fresh = factory.for_application(&app, &healthy, &context).unwrap();
        for element in healthy.elements() {
            fresh.process_element(element).unwrap();
        }
        let fresh_clone = factory.holder_for(&app).current_thread().unwrap();

        let err = stale.finish_bundle().unwrap_err();
        assert!(matches!(err, EvaluationError::EvaluatorPoisoned { .. }));
        fresh.finish_bundle().unwrap();

        let holder = factory.holder_for(&app);
        assert_eq!(holder.live_clones(), 1);
        assert!(Arc::ptr_eq(&fresh_clone, &holder.current_thread().unwrap()));
        assert_eq!(clone_count(&factory, &app), 2);
    }

    #[test]
    fn test_missing_side_input_fails_construction_and_discards() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = AppliedTransform::new(
            "filter",
            PCollectionId::new("input"),
            ParDoBoundMulti::new(CountingFn::default(), TupleTag::new("main"))
                .with_side_inputs([PCollectionView::new("limits")]),
        );
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a"]);

        let err = match factory.for_application(&app, &bundle, &context) {
            Err(err) => err,
            Ok(_) => panic!("expected construction to fail"),
        };
        assert!(matches!(err, EvaluationError::SideInputUnavailable { .. }));
        assert!(!err.is_recoverable());
        assert_eq!(factory.holder_for(&app).live_clones(), 0);
    }

    #[test]
    fn test_start_bundle_failure_discards_clone() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(
            CountingFn {
                fail_start: true,
                ..CountingFn::default()
            },
            &[],
        );
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a"]);

        let err = match factory.for_application(&app, &bundle, &context) {
            Err(err) => err,
            Ok(_) => panic!("expected start_bundle to fail"),
        };
        assert!(matches!(err, EvaluationError::StartBundle { .. }));
        assert_eq!(factory.holder_for(&app).live_clones(), 0);
    }

    #[test]
    fn test_clone_failure_reports_clone_construction() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(UncloneableFn, &[]);
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a"]);

        let err = match factory.for_application(&app, &bundle, &context) {
            Err(err) => err,
            Ok(_) => panic!("expected clone construction to fail"),
        };
        match err {
            EvaluationError::CloneConstruction { transform, source } => {
                assert_eq!(transform, "count");
                assert_eq!(source.function, "uncloneable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_stopword_filter_reads_side_input() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let view = PCollectionView::new("stopwords");
        let app = AppliedTransform::new(
            "filter",
            PCollectionId::new("input"),
            ParDoBoundMulti::new(
                LocalFn::StopwordFilter(StopwordFilterFn::new(view.clone(), TupleTag::new("dropped"))),
                TupleTag::new("main"),
            )
            .with_side_outputs([TupleTag::new("dropped")])
            .with_side_inputs([view.clone()]),
        );
        let context = InProcessEvaluationContext::new()
            .with_side_input(view, vec!["the".to_string(), "a".to_string()]);
        let bundle = lines(&["The cat saw a dog"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        evaluator.process_element(&bundle.elements()[0]).unwrap();
        let result = evaluator.finish_bundle().unwrap();

        assert_eq!(result.values(&TupleTag::new("main")), vec!["cat", "saw", "dog"]);
        assert_eq!(result.values(&TupleTag::new("dropped")), vec!["The", "a"]);
    }

    #[test]
    fn test_concatenate_emits_at_finish_with_latest_timestamp() {
        let factory = ParDoMultiEvaluatorFactory::new();
        let app = apply(ConcatenateFn::new("+"), &[]);
        let context = InProcessEvaluationContext::new();
        let bundle = lines(&["a", "b", "c"]);

        let mut evaluator = factory.for_application(&app, &bundle, &context).unwrap();
        for element in bundle.elements() {
            evaluator.process_element(element).unwrap();
        }
        let result = evaluator.finish_bundle().unwrap();

        let main = result.output(&TupleTag::new("main")).unwrap();
        assert_eq!(main.len(), 1);
        assert_eq!(main.elements()[0].value, "a+b+c");
        assert_eq!(main.elements()[0].timestamp, 2);
    }

    #[tokio::test]
    async fn test_executor_retries_with_fresh_clone() {
        let failures_left = Arc::new(AtomicUsize::new(1));
        let app = Arc::new(apply(
            FlakyFn {
                failures_left: Arc::clone(&failures_left),
            },
            &[],
        ));
        let executor = BundleExecutor::new(1, 1, FailureStrategy::FailFast);
        let context: Arc<dyn EvaluationContext> = Arc::new(InProcessEvaluationContext::new());

        let outcomes = executor
            .execute(
                Arc::new(ParDoMultiEvaluatorFactory::new()),
                app,
                vec![lines(&["a", "b"])],
                context,
            )
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].attempts, 2);
        let result = outcomes[0].result.as_ref().unwrap();
        assert_eq!(result.values(&TupleTag::new("main")), vec!["a", "b"]);
        assert_eq!(failures_left.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_executor_fail_fast_reports_first_failure() {
        let app = Arc::new(apply(FailOnMarkerFn::new("FAIL"), &[]));
        let executor = BundleExecutor::new(1, 0, FailureStrategy::FailFast);
        let context: Arc<dyn EvaluationContext> = Arc::new(InProcessEvaluationContext::new());

        let err = executor
            .execute(
                Arc::new(ParDoMultiEvaluatorFactory::new()),
                app,
                vec![lines(&["a"]), lines(&["FAIL"]), lines(&["c"])],
                context,
            )
            .await
            .unwrap_err();

        match err {
            ExecutionError::BundleFailed {
                bundle_index,
                attempts,
                source,
            } => {
                assert_eq!(bundle_index, 1);
                assert_eq!(attempts, 1);
                assert!(matches!(source, EvaluationError::ElementProcessing { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_executor_continue_on_error_runs_every_bundle() {
        let app = Arc::new(apply(FailOnMarkerFn::new("FAIL"), &[]));
        let executor = BundleExecutor::new(2, 2, FailureStrategy::ContinueOnError);
        let context: Arc<dyn EvaluationContext> = Arc::new(InProcessEvaluationContext::new());

        let outcomes = executor
            .execute(
                Arc::new(ParDoMultiEvaluatorFactory::new()),
                app,
                vec![lines(&["a"]), lines(&["FAIL"]), lines(&["c"])],
                context,
            )
            .await
            .unwrap();

        let indexes: Vec<usize> = outcomes.iter().map(|o| o.bundle_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert_eq!(outcomes[1].attempts, 3);
        assert!(outcomes[2].is_success());
    }

    #[tokio::test]
    async fn test_executor_does_not_retry_configuration_errors() {
        let app = Arc::new(AppliedTransform::new(
            "filter",
            PCollectionId::new("input"),
            ParDoBoundMulti::new(FailOnMarkerFn::new("FAIL"), TupleTag::new("main"))
                .with_side_inputs([PCollectionView::new("missing")]),
        ));
        let executor = BundleExecutor::new(1, 3, FailureStrategy::ContinueOnError);
        let context: Arc<dyn EvaluationContext> = Arc::new(InProcessEvaluationContext::new());

        let outcomes = executor
            .execute(
                Arc::new(ParDoMultiEvaluatorFactory::new()),
                app,
                vec![lines(&["a"])],
                context,
            )
            .await
            .unwrap();

        assert_eq!(outcomes[0].attempts, 1);
        assert!(matches!(
            outcomes[0].result,
            Err(EvaluationError::SideInputUnavailable { .. })
        ));
    }
}
