// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Function backends for the bundle evaluator.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process line-oriented functions, all with `String` input and output:
//! - **Text Transformation**: Case conversion, bundle concatenation
//! - **Text Analysis**: Token counting
//! - **Routing**: Blank-line routing, stopword filtering against a side input
//! - **Failure Injection**: Failing on a marker line, for exercising retries
//!
//! # Architecture
//!
//! ```text
//! Configuration → LocalFnFactory → LocalFn → ParDoMultiEvaluatorFactory → BundleExecutor
//! ```
//!
//! # Examples
//!
//! ```rust
//! use bundle_fanout::backends::local::LocalFnFactory;
//! use bundle_fanout::config::TransformConfig;
//! use bundle_fanout::traits::DoFn;
//! use std::collections::HashMap;
//!
//! let config = TransformConfig {
//!     name: "uppercase".to_string(),
//!     fn_: "change_text_case_upper".to_string(),
//!     main_output: "main".to_string(),
//!     side_outputs: vec![],
//!     side_inputs: vec![],
//!     options: HashMap::new(),
//! };
//!
//! let fn_ = LocalFnFactory::create_fn(&config).unwrap();
//! assert_eq!(fn_.name(), "change_text_case");
//! ```

pub mod local;
