// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value types that flow between the scheduler and transform evaluators.
//!
//! These are the boundary types of the evaluator core:
//! * [`WindowedValue`] - one timestamped element
//! * [`CommittedBundle`] - an immutable, ordered batch of elements handed to one evaluator
//! * [`UncommittedBundle`] - an output buffer for one output collection
//! * [`TupleTag`] / [`PCollectionId`] / [`PCollectionView`] - identifiers for output tags,
//!   collections and side inputs
//! * [`TransformResult`] - what an evaluator hands back to the scheduler for commit

use std::collections::BTreeMap;
use std::fmt;

/// Event time in milliseconds since the epoch.
pub type Timestamp = i64;

/// Smallest representable timestamp, used for elements with no meaningful event time.
pub const TIMESTAMP_MIN: Timestamp = i64::MIN;

/// A single element together with its event timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedValue<T> {
    pub value: T,
    pub timestamp: Timestamp,
}

impl<T> WindowedValue<T> {
    pub fn timestamped(value: T, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }

    /// Wrap a value that carries no meaningful event time.
    pub fn value_in_global_window(value: T) -> Self {
        Self {
            value,
            timestamp: TIMESTAMP_MIN,
        }
    }
}

/// Names one output channel of a transform (the main output or a side output).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleTag(pub String);

impl TupleTag {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TupleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TupleTag {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifies a collection produced or consumed by a transform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PCollectionId(pub String);

impl PCollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PCollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a materialized side input a transform reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PCollectionView(pub String);

impl PCollectionView {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PCollectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable, ordered batch of elements belonging to one collection.
///
/// A committed bundle is consumed exactly once by one evaluator. Re-running a bundle
/// means handing the same committed bundle to a freshly created evaluator; the
/// elements themselves are never rewound or mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedBundle<T> {
    pcollection: PCollectionId,
    elements: Vec<WindowedValue<T>>,
}

impl<T> CommittedBundle<T> {
    pub fn new(pcollection: PCollectionId, elements: Vec<WindowedValue<T>>) -> Self {
        Self {
            pcollection,
            elements,
        }
    }

    pub fn pcollection(&self) -> &PCollectionId {
        &self.pcollection
    }

    pub fn elements(&self) -> &[WindowedValue<T>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Output buffer for a single output collection, filled by an evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct UncommittedBundle<T> {
    pcollection: PCollectionId,
    elements: Vec<WindowedValue<T>>,
}

impl<T> UncommittedBundle<T> {
    pub fn new(pcollection: PCollectionId) -> Self {
        Self {
            pcollection,
            elements: Vec::new(),
        }
    }

    pub fn add(&mut self, element: WindowedValue<T>) {
        self.elements.push(element);
    }

    pub fn pcollection(&self) -> &PCollectionId {
        &self.pcollection
    }

    pub fn elements(&self) -> &[WindowedValue<T>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Seal the buffer into an immutable bundle for downstream consumers.
    pub fn commit(self) -> CommittedBundle<T> {
        CommittedBundle::new(self.pcollection, self.elements)
    }
}

/// Summary handed back to the scheduler after a bundle completes.
///
/// The result owns one output buffer per declared tag. `watermark_hold` is opaque to
/// the evaluator core and only carried through for the surrounding engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult<T> {
    pub transform: String,
    pub outputs: BTreeMap<TupleTag, UncommittedBundle<T>>,
    pub watermark_hold: Option<Timestamp>,
    pub elements_processed: usize,
}

impl<T> TransformResult<T> {
    /// Output buffer for `tag`, if the tag was declared.
    pub fn output(&self, tag: &TupleTag) -> Option<&UncommittedBundle<T>> {
        self.outputs.get(tag)
    }

    /// Plain values emitted under `tag`, in emission order.
    pub fn values(&self, tag: &TupleTag) -> Vec<&T> {
        self.outputs
            .get(tag)
            .map(|bundle| bundle.elements().iter().map(|e| &e.value).collect())
            .unwrap_or_default()
    }

    pub fn total_outputs(&self) -> usize {
        self.outputs.values().map(UncommittedBundle::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncommitted_bundle_commit_preserves_order() {
        let mut bundle = UncommittedBundle::new(PCollectionId::new("words"));
        bundle.add(WindowedValue::timestamped("a", 1));
        bundle.add(WindowedValue::timestamped("b", 2));

        let committed = bundle.commit();
        assert_eq!(committed.pcollection(), &PCollectionId::new("words"));
        let values: Vec<_> = committed.elements().iter().map(|e| e.value).collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_transform_result_values_for_unknown_tag_is_empty() {
        let result: TransformResult<String> = TransformResult {
            transform: "t".to_string(),
            outputs: BTreeMap::new(),
            watermark_hold: None,
            elements_processed: 0,
        };
        assert!(result.values(&TupleTag::new("missing")).is_empty());
        assert_eq!(result.total_outputs(), 0);
    }

    #[test]
    fn test_global_window_value_uses_min_timestamp() {
        let value = WindowedValue::value_in_global_window(7);
        assert_eq!(value.timestamp, TIMESTAMP_MIN);
    }
}
