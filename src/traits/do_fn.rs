use std::any::Any;
use std::sync::Arc;

use crate::engine::pardo::{OutputManager, SideInputReader};
use crate::errors::{CloneError, EvaluationError, FnError};
use crate::values::{PCollectionView, Timestamp, TupleTag, WindowedValue};

/// User processing logic applied element-by-element to a bundle.
///
/// The instance a transform is declared with is the *canonical* function and is never
/// invoked directly. Every worker thread works on its own copy obtained through
/// [`DoFn::clone_fn`], so implementations are free to keep mutable state in `&mut self`
/// across elements and across bundles processed by the same thread.
///
/// A copy that returns an error from any hook is thrown away and replaced by a fresh
/// copy of the canonical function before the thread touches the transform again.
pub trait DoFn: Sized + Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    fn name(&self) -> &'static str;

    /// Produce an independent copy with its own mutable state.
    ///
    /// Returning an error means the function cannot be executed at all.
    fn clone_fn(&self) -> Result<Self, CloneError>;

    /// Called once per bundle before the first element.
    fn start_bundle(&mut self) -> Result<(), FnError> {
        Ok(())
    }

    fn process_element(
        &mut self,
        ctx: &mut ProcessContext<'_, Self::Input, Self::Output>,
    ) -> Result<(), FnError>;

    /// Called once per bundle after the last element; flush buffered output here.
    fn finish_bundle(
        &mut self,
        _ctx: &mut FinishBundleContext<'_, Self::Output>,
    ) -> Result<(), FnError> {
        Ok(())
    }
}

/// What a [`DoFn`] can see and do while processing one element.
pub struct ProcessContext<'a, In, Out> {
    element: &'a WindowedValue<In>,
    side_inputs: &'a SideInputReader,
    outputs: &'a mut OutputManager<Out>,
}

impl<'a, In, Out> ProcessContext<'a, In, Out> {
    pub(crate) fn new(
        element: &'a WindowedValue<In>,
        side_inputs: &'a SideInputReader,
        outputs: &'a mut OutputManager<Out>,
    ) -> Self {
        Self {
            element,
            side_inputs,
            outputs,
        }
    }

    pub fn element(&self) -> &In {
        &self.element.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.element.timestamp
    }

    pub fn main_output_tag(&self) -> &TupleTag {
        self.outputs.main_tag()
    }

    /// Read a declared side input as `V`.
    pub fn side_input<V: Any + Send + Sync>(
        &self,
        view: &PCollectionView,
    ) -> Result<Arc<V>, EvaluationError> {
        self.side_inputs.get(view)
    }

    /// Emit to the main output with the current element's timestamp.
    pub fn output(&mut self, value: Out) {
        let timestamp = self.element.timestamp;
        self.outputs.emit_main(WindowedValue::timestamped(value, timestamp));
    }

    pub fn output_with_timestamp(&mut self, value: Out, timestamp: Timestamp) {
        self.outputs
            .emit_main(WindowedValue::timestamped(value, timestamp));
    }

    /// Emit under `tag` with the current element's timestamp.
    ///
    /// `tag` must be the main tag or one of the declared side tags. Emitting under any
    /// other tag fails the bundle even if the returned error is ignored.
    pub fn side_output(&mut self, tag: &TupleTag, value: Out) -> Result<(), EvaluationError> {
        let timestamp = self.element.timestamp;
        self.outputs
            .emit(tag, WindowedValue::timestamped(value, timestamp))
    }

    pub fn side_output_with_timestamp(
        &mut self,
        tag: &TupleTag,
        value: Out,
        timestamp: Timestamp,
    ) -> Result<(), EvaluationError> {
        self.outputs
            .emit(tag, WindowedValue::timestamped(value, timestamp))
    }
}

/// Output access for [`DoFn::finish_bundle`]. There is no current element, so every
/// emission names its timestamp.
pub struct FinishBundleContext<'a, Out> {
    side_inputs: &'a SideInputReader,
    outputs: &'a mut OutputManager<Out>,
}

impl<'a, Out> FinishBundleContext<'a, Out> {
    pub(crate) fn new(side_inputs: &'a SideInputReader, outputs: &'a mut OutputManager<Out>) -> Self {
        Self {
            side_inputs,
            outputs,
        }
    }

    pub fn side_input<V: Any + Send + Sync>(
        &self,
        view: &PCollectionView,
    ) -> Result<Arc<V>, EvaluationError> {
        self.side_inputs.get(view)
    }

    pub fn output(&mut self, value: Out, timestamp: Timestamp) {
        self.outputs
            .emit_main(WindowedValue::timestamped(value, timestamp));
    }

    pub fn side_output(
        &mut self,
        tag: &TupleTag,
        value: Out,
        timestamp: Timestamp,
    ) -> Result<(), EvaluationError> {
        self.outputs
            .emit(tag, WindowedValue::timestamped(value, timestamp))
    }
}
