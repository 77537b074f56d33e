use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, ProcessContext};
use crate::values::TupleTag;

/// Sends blank lines to a side output and everything else to the main output.
#[derive(Debug, Clone)]
pub struct RouteEmptyFn {
    empty_tag: TupleTag,
}

impl RouteEmptyFn {
    pub fn new(empty_tag: TupleTag) -> Self {
        Self { empty_tag }
    }
}

impl DoFn for RouteEmptyFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "route_empty"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        let line = ctx.element().clone();
        if line.trim().is_empty() {
            ctx.side_output(&self.empty_tag, line)?;
        } else {
            ctx.output(line);
        }
        Ok(())
    }
}
