// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod evaluation;
mod execution;

pub use config::{ConfigError, ValidationError};
pub use evaluation::{CloneError, EvaluationError, FnError};
pub use execution::{ExecutionError, FailureStrategy};
