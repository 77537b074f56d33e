// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::{LocalFn, LocalFnFactory};
use crate::config::consts::INPUT_PCOLLECTION;
use crate::config::Config;
use crate::engine::{AppliedTransform, BundleExecutor, InProcessEvaluationContext, ParDoBoundMulti};
use crate::errors::ConfigError;
use crate::values::{CommittedBundle, PCollectionId, PCollectionView, TupleTag, WindowedValue};

/// Everything needed to run the configured transform over a batch of lines.
pub struct Runtime {
    pub application: Arc<AppliedTransform<LocalFn>>,
    pub context: Arc<InProcessEvaluationContext>,
    pub executor: BundleExecutor,
    pub bundle_size: usize,
}

impl Runtime {
    /// Split input lines into committed bundles of `bundle_size` elements.
    ///
    /// Each line is timestamped with its position in the input, so outputs can be
    /// traced back to the line that produced them.
    pub fn bundles(&self, lines: &[String]) -> Vec<CommittedBundle<String>> {
        lines
            .chunks(self.bundle_size)
            .enumerate()
            .map(|(chunk, lines)| {
                let offset = chunk * self.bundle_size;
                let elements = lines
                    .iter()
                    .enumerate()
                    .map(|(i, line)| WindowedValue::timestamped(line.clone(), (offset + i) as i64))
                    .collect();
                CommittedBundle::new(self.application.input().clone(), elements)
            })
            .collect()
    }
}

/// Runtime builder - turns a validated configuration into a ready-to-run [`Runtime`].
///
/// The builder creates the configured local function, binds it with its output tags and
/// side inputs into an applied transform, materializes the side-input values into an
/// evaluation context and sizes the bundle executor.
///
/// # Examples
///
/// ```
/// use bundle_fanout::config::{Config, RuntimeBuilder};
/// use bundle_fanout::errors::FailureStrategy;
///
/// let config: Config = serde_yaml::from_str(r#"
/// failure_strategy: continue_on_error
/// executor_options:
///   bundle_size: 2
/// transform:
///   name: upper
///   fn: change_text_case_upper
/// "#).unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(runtime.executor.failure_strategy(), FailureStrategy::ContinueOnError);
///
/// let lines: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
/// assert_eq!(runtime.bundles(&lines).len(), 2);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the runtime from configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::FunctionCreation`] when the configured function cannot be
    /// created from its options.
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        let transform = &cfg.transform;
        let fn_ = LocalFnFactory::create_fn(transform).map_err(|reason| {
            ConfigError::FunctionCreation {
                name: transform.fn_.clone(),
                reason,
            }
        })?;

        let bound = ParDoBoundMulti::new(fn_, TupleTag::new(transform.main_output.as_str()))
            .with_side_outputs(transform.side_outputs.iter().map(|t| TupleTag::new(t.as_str())))
            .with_side_inputs(
                transform
                    .side_inputs
                    .iter()
                    .map(|v| PCollectionView::new(v.as_str())),
            );
        let application = AppliedTransform::new(
            transform.name.as_str(),
            PCollectionId::new(INPUT_PCOLLECTION),
            bound,
        );

        let context = cfg
            .side_inputs
            .iter()
            .fold(InProcessEvaluationContext::new(), |context, (view, values)| {
                context.with_side_input(PCollectionView::new(view.as_str()), values.clone())
            });

        let executor = BundleExecutor::new(
            cfg.executor_options.get_max_concurrency(),
            cfg.executor_options.get_retry_attempts(),
            cfg.failure_strategy,
        );

        Ok(Runtime {
            application: Arc::new(application),
            context: Arc::new(context),
            executor,
            bundle_size: cfg.executor_options.get_bundle_size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::EvaluationContext;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_builds_application_with_declared_outputs() {
        let config = parse(
            r#"
transform:
  name: filter
  fn: stopword_filter
  side_outputs: [dropped]
  side_inputs: [stopwords]
side_inputs:
  stopwords: [the]
"#,
        );

        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let outputs = runtime.application.outputs();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[&TupleTag::new("dropped")], PCollectionId::new("filter.dropped"));
        assert!(runtime
            .context
            .side_input(&PCollectionView::new("stopwords"))
            .is_some());
    }

    #[test]
    fn test_bundles_keep_line_positions() {
        let config = parse(
            r#"
executor_options:
  bundle_size: 2
transform:
  name: upper
  fn: change_text_case_upper
"#,
        );
        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let lines: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

        let bundles = runtime.bundles(&lines);
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[1].elements()[0].value, "c");
        assert_eq!(bundles[1].elements()[0].timestamp, 2);
        assert!(runtime.bundles(&[]).is_empty());
    }

    #[test]
    fn test_function_creation_failure() {
        let config = parse(
            r#"
transform:
  name: filter
  fn: stopword_filter
"#,
        );
        let result = RuntimeBuilder::from_config(&config);
        assert!(matches!(result, Err(ConfigError::FunctionCreation { .. })));
    }
}
