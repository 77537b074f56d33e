use serde::Deserialize;

use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, ProcessContext};

/// Case conversion applied by [`ChangeTextCaseFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Upper,
    Lower,
    Proper,
    Title,
}

/// Change Text Case - converts every line to a different case
#[derive(Debug, Clone)]
pub struct ChangeTextCaseFn {
    case_type: CaseType,
}

impl ChangeTextCaseFn {
    pub fn new(case_type: CaseType) -> Self {
        Self { case_type }
    }

    pub fn upper() -> Self {
        Self::new(CaseType::Upper)
    }

    pub fn lower() -> Self {
        Self::new(CaseType::Lower)
    }

    pub fn proper() -> Self {
        Self::new(CaseType::Proper)
    }

    pub fn title() -> Self {
        Self::new(CaseType::Title)
    }

    pub fn convert(&self, input: &str) -> String {
        match self.case_type {
            CaseType::Upper => input.to_uppercase(),
            CaseType::Lower => input.to_lowercase(),
            CaseType::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            CaseType::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    // Small words stay lowercase unless they open the line
                    if i == 0 || !is_small_word(&lower_word) {
                        capitalize(word)
                    } else {
                        lower_word
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

fn is_small_word(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by"
    )
}

impl DoFn for ChangeTextCaseFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "change_text_case"
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        let converted = self.convert(ctx.element());
        ctx.output(converted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        let test_cases = vec![
            (ChangeTextCaseFn::upper(), "hello", "HELLO"),
            (ChangeTextCaseFn::lower(), "HELLO", "hello"),
            (ChangeTextCaseFn::proper(), "hello world", "Hello World"),
            (ChangeTextCaseFn::title(), "the quick brown fox of doom", "The Quick Brown Fox of Doom"),
        ];

        for (fn_, input, expected) in test_cases {
            assert_eq!(fn_.convert(input), expected, "Failed for {:?}", fn_.case_type);
        }
    }
}
