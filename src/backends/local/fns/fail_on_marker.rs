use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, ProcessContext};

/// Passes lines through unchanged but fails on a marker line.
///
/// Useful for exercising bundle retry and clone invalidation: `passed` counts lines
/// this clone has let through, so a fresh clone always starts back at zero.
#[derive(Debug, Clone)]
pub struct FailOnMarkerFn {
    marker: String,
    passed: u64,
}

impl FailOnMarkerFn {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            passed: 0,
        }
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }
}

impl DoFn for FailOnMarkerFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "fail_on_marker"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        if *ctx.element() == self.marker {
            return Err(format!(
                "encountered marker '{}' after {} line(s)",
                self.marker, self.passed
            )
            .into());
        }
        self.passed += 1;
        let line = ctx.element().clone();
        ctx.output(line);
        Ok(())
    }
}
