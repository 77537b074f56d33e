use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, ProcessContext};
use crate::values::{PCollectionView, TupleTag};

/// Splits lines into words and drops stopwords read from a side input.
///
/// The side input must hold a `Vec<String>`; matching is case-insensitive. Dropped
/// words go to `dropped_tag` so nothing disappears silently.
#[derive(Debug, Clone)]
pub struct StopwordFilterFn {
    stopwords: PCollectionView,
    dropped_tag: TupleTag,
}

impl StopwordFilterFn {
    pub fn new(stopwords: PCollectionView, dropped_tag: TupleTag) -> Self {
        Self {
            stopwords,
            dropped_tag,
        }
    }
}

impl DoFn for StopwordFilterFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "stopword_filter"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        let stopwords = ctx.side_input::<Vec<String>>(&self.stopwords)?;
        let words: Vec<String> = ctx.element().split_whitespace().map(str::to_string).collect();
        for word in words {
            let lower = word.to_lowercase();
            if stopwords.iter().any(|s| s.eq_ignore_ascii_case(&lower)) {
                ctx.side_output(&self.dropped_tag, word)?;
            } else {
                ctx.output(word);
            }
        }
        Ok(())
    }
}
