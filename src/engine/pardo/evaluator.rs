// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::Instant;

use crate::engine::clone_cache::FnClone;
use crate::engine::pardo::{AppliedTransform, OutputManager, SideInputReader};
use crate::errors::EvaluationError;
use crate::observability::messages::evaluator::{BundleFinished, EvaluatorCreated};
use crate::observability::messages::StructuredLog;
use crate::traits::{DoFn, EvaluationContext, FinishBundleContext, ProcessContext, TransformEvaluator};
use crate::values::{CommittedBundle, TransformResult, WindowedValue};

/// Applies one thread's function clone to one input bundle.
///
/// Elements are handed to the clone in the order the scheduler delivers them. Every
/// emission lands in the output buffer of its tag; nothing leaves the evaluator until
/// [`TransformEvaluator::finish_bundle`] returns the [`TransformResult`]. Any failure
/// leaves the evaluator poisoned: later calls return
/// [`EvaluationError::EvaluatorPoisoned`] and no result is ever produced.
pub struct ParDoEvaluator<F: DoFn> {
    transform: String,
    fn_clone: FnClone<F>,
    side_inputs: SideInputReader,
    outputs: OutputManager<F::Output>,
    elements_processed: usize,
    started: Instant,
    failed: bool,
}

impl<F: DoFn> ParDoEvaluator<F> {
    /// Resolve side inputs, allocate output buffers and start the bundle on `fn_clone`.
    pub fn create(
        application: &AppliedTransform<F>,
        input: &CommittedBundle<F::Input>,
        fn_clone: FnClone<F>,
        context: &dyn EvaluationContext,
    ) -> Result<Self, EvaluationError> {
        let transform = application.full_name().to_string();
        let bound = application.transform();

        let mut views = HashMap::new();
        for view in bound.side_inputs() {
            let value = context
                .side_input(view)
                .ok_or_else(|| EvaluationError::SideInputUnavailable {
                    transform: transform.clone(),
                    view: view.clone(),
                })?;
            views.insert(view.clone(), value);
        }

        let outputs = OutputManager::new(
            transform.clone(),
            bound.main_output_tag().clone(),
            application.outputs(),
        );

        fn_clone
            .lock()
            .start_bundle()
            .map_err(|source| EvaluationError::StartBundle {
                transform: transform.clone(),
                source,
            })?;

        EvaluatorCreated {
            transform: &transform,
            input_elements: input.len(),
            side_outputs: bound.side_output_tags().len(),
        }
        .log();

        Ok(Self {
            side_inputs: SideInputReader::new(transform.clone(), views),
            transform,
            fn_clone,
            outputs,
            elements_processed: 0,
            started: Instant::now(),
            failed: false,
        })
    }

    fn ensure_usable(&self) -> Result<(), EvaluationError> {
        if self.failed {
            return Err(EvaluationError::EvaluatorPoisoned {
                transform: self.transform.clone(),
            });
        }
        Ok(())
    }
}

impl<F: DoFn> TransformEvaluator<F::Input, F::Output> for ParDoEvaluator<F> {
    fn process_element(&mut self, element: &WindowedValue<F::Input>) -> Result<(), EvaluationError> {
        self.ensure_usable()?;

        let result = {
            let mut fn_ = self.fn_clone.lock();
            let mut ctx = ProcessContext::new(element, &self.side_inputs, &mut self.outputs);
            fn_.process_element(&mut ctx)
        };

        // An undeclared tag outranks whatever the function returned.
        if let Some(violation) = self.outputs.take_violation() {
            self.failed = true;
            return Err(violation);
        }
        if let Err(source) = result {
            self.failed = true;
            return Err(EvaluationError::ElementProcessing {
                transform: self.transform.clone(),
                source,
            });
        }

        self.elements_processed += 1;
        Ok(())
    }

    fn finish_bundle(self: Box<Self>) -> Result<TransformResult<F::Output>, EvaluationError> {
        self.ensure_usable()?;
        let mut this = *self;

        let result = {
            let mut fn_ = this.fn_clone.lock();
            let mut ctx = FinishBundleContext::new(&this.side_inputs, &mut this.outputs);
            fn_.finish_bundle(&mut ctx)
        };

        if let Some(violation) = this.outputs.take_violation() {
            return Err(violation);
        }
        result.map_err(|source| EvaluationError::FinishBundle {
            transform: this.transform.clone(),
            source,
        })?;

        BundleFinished {
            transform: &this.transform,
            elements_processed: this.elements_processed,
            outputs_emitted: this.outputs.emitted(),
            duration: this.started.elapsed(),
        }
        .log();

        Ok(TransformResult {
            transform: this.transform,
            outputs: this.outputs.into_outputs(),
            // Element-wise transforms never hold the watermark.
            watermark_hold: None,
            elements_processed: this.elements_processed,
        })
    }
}
