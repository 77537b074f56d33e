// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in functions
pub mod config;     // config + runtime builder
pub mod engine;     // clone cache, evaluators, bundle executor
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // unified abstractions
pub mod values;     // elements, tags, bundles
