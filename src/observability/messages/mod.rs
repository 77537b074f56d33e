// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields at its fixed level.
//!
//! # Organization
//!
//! * `cache` - clone cache holder and per-thread clone lifecycle
//! * `evaluator` - evaluator construction, bundle completion and failure
//! * `executor` - bundle scheduling, retries and execution summaries
//! * `validation` - configuration validation results
//!
//! # Usage Pattern
//!
//! ```rust
//! use bundle_fanout::observability::messages::executor::ExecutionStarted;
//! use bundle_fanout::observability::messages::StructuredLog;
//!
//! let msg = ExecutionStarted {
//!     transform: "tokenize",
//!     bundle_count: 5,
//!     max_concurrency: 4,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod cache;
pub mod evaluator;
pub mod executor;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the event at the message's level.
    fn log(&self);

    /// A span carrying the message's fields, for scoping follow-up events.
    fn span(&self, name: &str) -> Span;
}
