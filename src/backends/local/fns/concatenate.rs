use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, FinishBundleContext, ProcessContext};
use crate::values::{Timestamp, TIMESTAMP_MIN};

/// Buffers every line of a bundle and emits them joined as one element when the
/// bundle finishes, stamped with the latest input timestamp.
#[derive(Debug, Clone)]
pub struct ConcatenateFn {
    separator: String,
    buffer: Vec<String>,
    latest: Timestamp,
}

impl ConcatenateFn {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            buffer: Vec::new(),
            latest: TIMESTAMP_MIN,
        }
    }
}

impl DoFn for ConcatenateFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "concatenate"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(Self::new(self.separator.clone()))
    }

    fn start_bundle(&mut self) -> Result<(), FnError> {
        self.buffer.clear();
        self.latest = TIMESTAMP_MIN;
        Ok(())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        self.buffer.push(ctx.element().clone());
        self.latest = self.latest.max(ctx.timestamp());
        Ok(())
    }

    fn finish_bundle(&mut self, ctx: &mut FinishBundleContext<'_, String>) -> Result<(), FnError> {
        if !self.buffer.is_empty() {
            let joined = self.buffer.join(&self.separator);
            self.buffer.clear();
            ctx.output(joined, self.latest);
        }
        Ok(())
    }
}
