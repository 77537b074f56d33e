// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for the transform wiring.
//!
//! A configuration is checked before any bundle runs so that wiring mistakes surface
//! as one report instead of as per-element failures at run time.
//!
//! # Checks
//!
//! 1. **Function**: the configured `fn` names a built-in local function
//! 2. **Output tags**: no empty tags, no duplicate side outputs, and the main tag is
//!    not reused as a side output
//! 3. **Side inputs**: every declared side input has materialized values
//! 4. **Executor options**: `max_concurrency`, when given, is at least 1
//!
//! All checks run; every problem found is reported.
//!
//! # Example
//! ```rust
//! use bundle_fanout::config::{validate_transform, Config};
//! use bundle_fanout::errors::ValidationError;
//!
//! let config: Config = serde_yaml::from_str(r#"
//! transform:
//!   name: filter
//!   fn: stopword_filter
//!   side_inputs: [stopwords]
//! "#).unwrap();
//!
//! let errors = validate_transform(&config).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::UnresolvedSideInput { view: "stopwords".into() }]);
//! ```

use std::collections::HashSet;

use crate::backends::local::LocalFnFactory;
use crate::config::Config;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{ValidationCompleted, ValidationFailed};
use crate::observability::messages::StructuredLog;

/// Validate a configuration, returning every problem found.
pub fn validate_transform(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_function(config, &mut errors);
    validate_output_tags(config, &mut errors);
    validate_side_inputs(config, &mut errors);
    if config.executor_options.max_concurrency == Some(0) {
        errors.push(ValidationError::ZeroConcurrency);
    }

    let transform = &config.transform;
    if errors.is_empty() {
        ValidationCompleted {
            transform: &transform.name,
            output_tags: transform.side_outputs.len() + 1,
            side_inputs: transform.side_inputs.len(),
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            transform: &transform.name,
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_function(config: &Config, errors: &mut Vec<ValidationError>) {
    let name = &config.transform.fn_;
    if !LocalFnFactory::is_implementation_available(name) {
        errors.push(ValidationError::UnknownFunction { name: name.clone() });
    }
}

fn validate_output_tags(config: &Config, errors: &mut Vec<ValidationError>) {
    let transform = &config.transform;
    if transform.main_output.is_empty() || transform.side_outputs.iter().any(String::is_empty) {
        errors.push(ValidationError::EmptyOutputTag);
    }

    let mut seen = HashSet::new();
    for tag in transform.side_outputs.iter().filter(|t| !t.is_empty()) {
        if *tag == transform.main_output {
            errors.push(ValidationError::MainTagReusedAsSideOutput { tag: tag.clone() });
        } else if !seen.insert(tag.as_str()) {
            errors.push(ValidationError::DuplicateOutputTag { tag: tag.clone() });
        }
    }
}

fn validate_side_inputs(config: &Config, errors: &mut Vec<ValidationError>) {
    for view in &config.transform.side_inputs {
        if !config.side_inputs.contains_key(view) {
            errors.push(ValidationError::UnresolvedSideInput { view: view.clone() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExecutorOptions, TransformConfig};
    use crate::errors::FailureStrategy;
    use std::collections::HashMap;

    fn create_test_config(fn_: &str, side_outputs: Vec<&str>) -> Config {
        Config {
            failure_strategy: FailureStrategy::FailFast,
            executor_options: ExecutorOptions::default(),
            transform: TransformConfig {
                name: "test".to_string(),
                fn_: fn_.to_string(),
                main_output: "main".to_string(),
                side_outputs: side_outputs.into_iter().map(String::from).collect(),
                side_inputs: vec![],
                options: HashMap::new(),
            },
            side_inputs: HashMap::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config("route_empty", vec!["errors"]);
        assert!(validate_transform(&config).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        let config = create_test_config("reverse_everything", vec![]);
        let errors = validate_transform(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownFunction {
                name: "reverse_everything".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_and_reused_tags() {
        let config = create_test_config("route_empty", vec!["errors", "main", "errors"]);
        let errors = validate_transform(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MainTagReusedAsSideOutput {
                    tag: "main".to_string()
                },
                ValidationError::DuplicateOutputTag {
                    tag: "errors".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_tags() {
        let mut config = create_test_config("route_empty", vec![""]);
        config.transform.main_output = String::new();
        let errors = validate_transform(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyOutputTag]);
    }

    #[test]
    fn test_side_input_must_be_materialized() {
        let mut config = create_test_config("stopword_filter", vec!["dropped"]);
        config.transform.side_inputs = vec!["stopwords".to_string()];
        assert!(validate_transform(&config).is_err());

        config
            .side_inputs
            .insert("stopwords".to_string(), vec!["the".to_string()]);
        assert!(validate_transform(&config).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let mut config = create_test_config("nope", vec!["main"]);
        config.executor_options.max_concurrency = Some(0);
        let errors = validate_transform(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroConcurrency));
    }
}
