// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the evaluator core.
//!
//! All diagnostic output goes through message structs in [`messages`] rather than
//! ad-hoc format strings, so every event has one wording and one set of fields.
//!
//! # Usage
//!
//! ```rust
//! use bundle_fanout::observability::messages::executor::BundleFailed;
//! use bundle_fanout::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = BundleFailed {
//!     bundle_index: 3,
//!     attempts: 2,
//!     error: &error,
//! };
//!
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the tracing subscriber used by the binary.
///
/// Reads `RUST_LOG`, defaulting to `info`. Output goes to stderr so stdout carries
/// only transform results.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
