// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the per-thread function clone cache.

use crate::errors::CloneError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::thread::ThreadId;
use tracing::Span;

/// First request for a canonical function created its holder.
///
/// # Log Level
/// `debug!` - Internal lifecycle detail
pub struct HolderCreated<'a> {
    pub function: &'a str,
}

impl Display for HolderCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created clone holder for function '{}'", self.function)
    }
}

impl StructuredLog for HolderCreated<'_> {
    fn log(&self) {
        tracing::debug!(function = self.function, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("clone_cache", span_name = name, function = self.function)
    }
}

/// A worker thread received its own clone of a canonical function.
///
/// # Log Level
/// `debug!` - Internal lifecycle detail
pub struct CloneCreated<'a> {
    pub function: &'a str,
    pub thread: ThreadId,
}

impl Display for CloneCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cloned function '{}' for thread {:?}",
            self.function, self.thread
        )
    }
}

impl StructuredLog for CloneCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            function = self.function,
            thread = ?self.thread,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "clone_cache",
            span_name = name,
            function = self.function,
            thread = ?self.thread,
        )
    }
}

/// A thread's clone was thrown away after a failure.
///
/// # Log Level
/// `warn!` - The next bundle on this thread starts from a fresh clone
///
/// # Example
/// ```
/// use bundle_fanout::observability::messages::cache::CloneDiscarded;
///
/// let msg = CloneDiscarded {
///     function: "token_counter",
///     thread: std::thread::current().id(),
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct CloneDiscarded<'a> {
    pub function: &'a str,
    pub thread: ThreadId,
}

impl Display for CloneDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discarded clone of function '{}' on thread {:?}",
            self.function, self.thread
        )
    }
}

impl StructuredLog for CloneDiscarded<'_> {
    fn log(&self) {
        tracing::warn!(
            function = self.function,
            thread = ?self.thread,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "clone_cache",
            span_name = name,
            function = self.function,
            thread = ?self.thread,
        )
    }
}

/// The canonical function could not be cloned.
///
/// # Log Level
/// `error!` - Configuration problem; the transform cannot run
pub struct CloneFailed<'a> {
    pub function: &'a str,
    pub thread: ThreadId,
    pub error: &'a CloneError,
}

impl Display for CloneFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to clone function '{}' for thread {:?}: {}",
            self.function, self.thread, self.error
        )
    }
}

impl StructuredLog for CloneFailed<'_> {
    fn log(&self) {
        tracing::error!(
            function = self.function,
            thread = ?self.thread,
            reason = %self.error.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "clone_cache",
            span_name = name,
            function = self.function,
            thread = ?self.thread,
        )
    }
}
