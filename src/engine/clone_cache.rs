// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-thread copies of user functions.
//!
//! A transform is declared with a single canonical [`DoFn`] that is shared read-only
//! by every worker. User functions are allowed to keep mutable state, so workers never
//! run the canonical instance itself. Instead each worker thread gets its own clone,
//! created lazily on first use and reused for every later bundle on that thread.
//!
//! ```text
//! CloneCache<F>
//!   └─ canonical fn identity ──► ThreadLocalFn<F>   (one per canonical fn)
//!                                  └─ ThreadId ──► Arc<Mutex<F>>   (one per thread)
//! ```
//!
//! The cache is keyed by the identity of the canonical `Arc<F>`, not by value: two
//! structurally equal functions declared on different transforms get separate holders.
//! The holder keeps its canonical `Arc` alive, so a keyed address is never reused while
//! its entry exists.
//!
//! # Concurrency
//!
//! Both levels are `DashMap`s, so callers never lock anything themselves. Holder and
//! clone creation go through `entry`, which holds the shard lock while the value is
//! built: racing first accesses produce exactly one holder per function and one clone
//! per thread.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::CloneError;
use crate::observability::messages::cache::{
    CloneCreated, CloneDiscarded, CloneFailed, HolderCreated,
};
use crate::observability::messages::StructuredLog;
use crate::traits::DoFn;

/// A thread's private copy of a canonical function.
///
/// Only the owning thread ever locks it; the mutex only makes the holder `Sync`.
pub type FnClone<F> = Arc<Mutex<F>>;

/// Process-wide map from canonical function identity to its per-thread holder.
pub struct CloneCache<F: DoFn> {
    holders: DashMap<usize, Arc<ThreadLocalFn<F>>>,
}

impl<F: DoFn> CloneCache<F> {
    pub fn new() -> Self {
        Self {
            holders: DashMap::new(),
        }
    }

    /// Holder for `canonical`, creating it on first request.
    pub fn holder(&self, canonical: &Arc<F>) -> Arc<ThreadLocalFn<F>> {
        let key = Arc::as_ptr(canonical) as usize;
        self.holders
            .entry(key)
            .or_insert_with(|| {
                HolderCreated {
                    function: canonical.name(),
                }
                .log();
                Arc::new(ThreadLocalFn::new(Arc::clone(canonical)))
            })
            .value()
            .clone()
    }

    /// Number of canonical functions with a holder.
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

impl<F: DoFn> Default for CloneCache<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-thread clones of one canonical function.
pub struct ThreadLocalFn<F: DoFn> {
    canonical: Arc<F>,
    clones: DashMap<ThreadId, FnClone<F>>,
}

impl<F: DoFn> ThreadLocalFn<F> {
    fn new(canonical: Arc<F>) -> Self {
        Self {
            canonical,
            clones: DashMap::new(),
        }
    }

    pub fn canonical(&self) -> &Arc<F> {
        &self.canonical
    }

    /// The clone owned by `thread`, cloning the canonical function on first access.
    ///
    /// A clone failure caches nothing, so the next call tries again.
    pub fn current(&self, thread: ThreadId) -> Result<FnClone<F>, CloneError> {
        match self.clones.entry(thread) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let clone = self.canonical.clone_fn().map_err(|err| {
                    CloneFailed {
                        function: self.canonical.name(),
                        thread,
                        error: &err,
                    }
                    .log();
                    err
                })?;
                CloneCreated {
                    function: self.canonical.name(),
                    thread,
                }
                .log();
                let inserted = entry.insert(Arc::new(Mutex::new(clone)));
                Ok(Arc::clone(inserted.value()))
            }
        }
    }

    pub fn current_thread(&self) -> Result<FnClone<F>, CloneError> {
        self.current(thread::current().id())
    }

    /// Forget `thread`'s clone so its next access starts from a fresh copy.
    ///
    /// Returns whether a clone was dropped.
    pub fn discard(&self, thread: ThreadId) -> bool {
        let removed = self.clones.remove(&thread).is_some();
        if removed {
            CloneDiscarded {
                function: self.canonical.name(),
                thread,
            }
            .log();
        }
        removed
    }

    /// Forget `thread`'s clone only if it is still `clone`.
    ///
    /// A clone that was already replaced by a fresh copy is left alone, so a stale
    /// evaluator cannot evict the copy a newer bundle is running on.
    pub fn discard_clone(&self, thread: ThreadId, clone: &FnClone<F>) -> bool {
        let removed = self
            .clones
            .remove_if(&thread, |_, cached| Arc::ptr_eq(cached, clone))
            .is_some();
        if removed {
            CloneDiscarded {
                function: self.canonical.name(),
                thread,
            }
            .log();
        }
        removed
    }

    pub fn discard_current_thread(&self) -> bool {
        self.discard(thread::current().id())
    }

    /// Number of threads currently holding a clone.
    pub fn live_clones(&self) -> usize {
        self.clones.len()
    }
}
