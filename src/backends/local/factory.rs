use crate::config::consts::DEFAULT_SIDE_OUTPUT;
use crate::config::TransformConfig;
use crate::values::{PCollectionView, TupleTag};

use super::fns::*;

/// Factory for creating local (in-process) function instances
pub struct LocalFnFactory;

impl LocalFnFactory {
    /// Create a function instance from configuration
    ///
    /// The `fn` field in the config determines which function to create:
    /// - "change_text_case_upper" -> ChangeTextCaseFn (uppercase)
    /// - "change_text_case_lower" -> ChangeTextCaseFn (lowercase)
    /// - "change_text_case_proper" -> ChangeTextCaseFn (proper case)
    /// - "change_text_case_title" -> ChangeTextCaseFn (title case)
    /// - "token_counter" -> TokenCounterFn
    /// - "route_empty" -> RouteEmptyFn (option `empty_tag`)
    /// - "stopword_filter" -> StopwordFilterFn (options `stopwords`, `dropped_tag`)
    /// - "fail_on_marker" -> FailOnMarkerFn (option `marker`)
    /// - "concatenate" -> ConcatenateFn (option `separator`)
    ///
    /// Tag options fall back to the first declared side output, then to `"errors"`.
    pub fn create_fn(config: &TransformConfig) -> Result<LocalFn, String> {
        match config.fn_.as_str() {
            // Text case functions
            "change_text_case_upper" => Ok(LocalFn::ChangeTextCase(ChangeTextCaseFn::upper())),
            "change_text_case_lower" => Ok(LocalFn::ChangeTextCase(ChangeTextCaseFn::lower())),
            "change_text_case_proper" => Ok(LocalFn::ChangeTextCase(ChangeTextCaseFn::proper())),
            "change_text_case_title" => Ok(LocalFn::ChangeTextCase(ChangeTextCaseFn::title())),

            // Analysis
            "token_counter" => Ok(LocalFn::TokenCounter(TokenCounterFn::new())),

            // Routing functions
            "route_empty" => Ok(LocalFn::RouteEmpty(RouteEmptyFn::new(side_tag(
                config,
                "empty_tag",
            )))),
            "stopword_filter" => {
                let view = config
                    .option_str("stopwords")
                    .or_else(|| config.side_inputs.first().map(String::as_str))
                    .ok_or_else(|| {
                        format!(
                            "stopword_filter in '{}' needs a 'stopwords' option or a declared side input",
                            config.name
                        )
                    })?;
                Ok(LocalFn::StopwordFilter(StopwordFilterFn::new(
                    PCollectionView::new(view),
                    side_tag(config, "dropped_tag"),
                )))
            }

            "fail_on_marker" => Ok(LocalFn::FailOnMarker(FailOnMarkerFn::new(
                config.option_str("marker").unwrap_or("FAIL"),
            ))),
            "concatenate" => Ok(LocalFn::Concatenate(ConcatenateFn::new(
                config.option_str("separator").unwrap_or(" "),
            ))),

            _ => Err(format!("Unknown local function implementation: '{}'", config.fn_)),
        }
    }

    /// List all available local function implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "change_text_case_upper",
            "change_text_case_lower",
            "change_text_case_proper",
            "change_text_case_title",
            "token_counter",
            "route_empty",
            "stopword_filter",
            "fail_on_marker",
            "concatenate",
        ]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(impl_name: &str) -> bool {
        Self::list_available_implementations().contains(&impl_name)
    }
}

fn side_tag(config: &TransformConfig, option: &str) -> TupleTag {
    let tag = config
        .option_str(option)
        .or_else(|| config.side_outputs.first().map(String::as_str))
        .unwrap_or(DEFAULT_SIDE_OUTPUT);
    TupleTag::new(tag)
}
