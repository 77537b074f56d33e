use serde::Serialize;

use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, ProcessContext};

/// Token Counter - emits a JSON summary of characters and words per line.
///
/// `line` is a running count kept on the clone, so it keeps increasing across
/// bundles processed by the same worker thread and restarts from zero on a fresh clone.
#[derive(Debug, Clone, Default)]
pub struct TokenCounterFn {
    lines_seen: u64,
}

#[derive(Serialize)]
struct TokenCountResult {
    line: u64,
    char_count: usize,
    word_count: usize,
}

impl TokenCounterFn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }
}

impl DoFn for TokenCounterFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "token_counter"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        self.lines_seen += 1;
        let input = ctx.element();
        let result = TokenCountResult {
            line: self.lines_seen,
            char_count: input.chars().count(),
            word_count: input.split_whitespace().count(),
        };
        ctx.output(serde_json::to_string(&result)?);
        Ok(())
    }
}
