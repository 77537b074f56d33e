// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Multi-output element-wise transform: node descriptor and bundle evaluator.
//!
//! A [`ParDoBoundMulti`] pairs a canonical [`DoFn`] with the output tags it may emit
//! under and the side inputs it may read. An [`AppliedTransform`] places it in a
//! pipeline: it names the input collection and maps every declared tag to the output
//! collection that tag feeds.

mod evaluator;
mod output;

pub use evaluator::ParDoEvaluator;
pub use output::{OutputManager, SideInputReader};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::traits::DoFn;
use crate::values::{PCollectionId, PCollectionView, TupleTag};

/// A user function bound to its main output tag, side output tags and side inputs.
pub struct ParDoBoundMulti<F: DoFn> {
    fn_: Arc<F>,
    main_output_tag: TupleTag,
    side_output_tags: Vec<TupleTag>,
    side_inputs: Vec<PCollectionView>,
}

impl<F: DoFn> ParDoBoundMulti<F> {
    pub fn new(fn_: F, main_output_tag: TupleTag) -> Self {
        Self::from_shared(Arc::new(fn_), main_output_tag)
    }

    /// Bind an existing canonical function. Transforms sharing the same `Arc` share
    /// per-thread clones.
    pub fn from_shared(fn_: Arc<F>, main_output_tag: TupleTag) -> Self {
        Self {
            fn_,
            main_output_tag,
            side_output_tags: Vec::new(),
            side_inputs: Vec::new(),
        }
    }

    pub fn with_side_outputs(mut self, tags: impl IntoIterator<Item = TupleTag>) -> Self {
        for tag in tags {
            if tag != self.main_output_tag && !self.side_output_tags.contains(&tag) {
                self.side_output_tags.push(tag);
            }
        }
        self
    }

    pub fn with_side_inputs(mut self, views: impl IntoIterator<Item = PCollectionView>) -> Self {
        self.side_inputs.extend(views);
        self
    }

    pub fn fn_(&self) -> &Arc<F> {
        &self.fn_
    }

    pub fn main_output_tag(&self) -> &TupleTag {
        &self.main_output_tag
    }

    pub fn side_output_tags(&self) -> &[TupleTag] {
        &self.side_output_tags
    }

    pub fn side_inputs(&self) -> &[PCollectionView] {
        &self.side_inputs
    }
}

/// A [`ParDoBoundMulti`] placed in a pipeline.
pub struct AppliedTransform<F: DoFn> {
    full_name: String,
    input: PCollectionId,
    outputs: BTreeMap<TupleTag, PCollectionId>,
    transform: ParDoBoundMulti<F>,
}

impl<F: DoFn> AppliedTransform<F> {
    /// Output collections are named `<full_name>.<tag>`, one per declared tag.
    pub fn new(full_name: impl Into<String>, input: PCollectionId, transform: ParDoBoundMulti<F>) -> Self {
        let full_name = full_name.into();
        let outputs = std::iter::once(transform.main_output_tag())
            .chain(transform.side_output_tags())
            .map(|tag| {
                (
                    tag.clone(),
                    PCollectionId::new(format!("{}.{}", full_name, tag)),
                )
            })
            .collect();
        Self {
            full_name,
            input,
            outputs,
            transform,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn input(&self) -> &PCollectionId {
        &self.input
    }

    /// Every declared tag with the collection it feeds.
    pub fn outputs(&self) -> &BTreeMap<TupleTag, PCollectionId> {
        &self.outputs
    }

    pub fn transform(&self) -> &ParDoBoundMulti<F> {
        &self.transform
    }
}
