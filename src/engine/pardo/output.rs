// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::EvaluationError;
use crate::values::{PCollectionId, PCollectionView, TupleTag, UncommittedBundle, WindowedValue};

/// Routes emitted elements into one output buffer per declared tag.
///
/// An emission under an undeclared tag is refused and remembered, so the evaluator can
/// fail the bundle even when user code drops the returned error.
pub struct OutputManager<T> {
    transform: String,
    main_tag: TupleTag,
    bundles: BTreeMap<TupleTag, UncommittedBundle<T>>,
    violation: Option<TupleTag>,
}

impl<T> OutputManager<T> {
    pub fn new(
        transform: impl Into<String>,
        main_tag: TupleTag,
        outputs: &BTreeMap<TupleTag, PCollectionId>,
    ) -> Self {
        let bundles = outputs
            .iter()
            .map(|(tag, pcollection)| (tag.clone(), UncommittedBundle::new(pcollection.clone())))
            .collect();
        Self {
            transform: transform.into(),
            main_tag,
            bundles,
            violation: None,
        }
    }

    pub fn main_tag(&self) -> &TupleTag {
        &self.main_tag
    }

    pub fn emit_main(&mut self, element: WindowedValue<T>) {
        match self.bundles.get_mut(&self.main_tag) {
            Some(bundle) => bundle.add(element),
            None => {
                self.violation.get_or_insert_with(|| self.main_tag.clone());
            }
        }
    }

    pub fn emit(&mut self, tag: &TupleTag, element: WindowedValue<T>) -> Result<(), EvaluationError> {
        match self.bundles.get_mut(tag) {
            Some(bundle) => {
                bundle.add(element);
                Ok(())
            }
            None => {
                self.violation.get_or_insert_with(|| tag.clone());
                Err(EvaluationError::UnknownOutputTag {
                    transform: self.transform.clone(),
                    tag: tag.clone(),
                })
            }
        }
    }

    /// The first undeclared-tag emission since the last call, as an error.
    pub fn take_violation(&mut self) -> Option<EvaluationError> {
        self.violation
            .take()
            .map(|tag| EvaluationError::UnknownOutputTag {
                transform: self.transform.clone(),
                tag,
            })
    }

    pub fn emitted(&self) -> usize {
        self.bundles.values().map(UncommittedBundle::len).sum()
    }

    pub fn into_outputs(self) -> BTreeMap<TupleTag, UncommittedBundle<T>> {
        self.bundles
    }
}

/// Side-input views resolved for one bundle.
pub struct SideInputReader {
    transform: String,
    views: HashMap<PCollectionView, Arc<dyn Any + Send + Sync>>,
}

impl SideInputReader {
    pub fn new(
        transform: impl Into<String>,
        views: HashMap<PCollectionView, Arc<dyn Any + Send + Sync>>,
    ) -> Self {
        Self {
            transform: transform.into(),
            views,
        }
    }

    pub fn get<V: Any + Send + Sync>(&self, view: &PCollectionView) -> Result<Arc<V>, EvaluationError> {
        let value = self
            .views
            .get(view)
            .ok_or_else(|| EvaluationError::SideInputNotDeclared {
                transform: self.transform.clone(),
                view: view.clone(),
            })?;
        Arc::clone(value)
            .downcast::<V>()
            .map_err(|_| EvaluationError::SideInputTypeMismatch {
                transform: self.transform.clone(),
                view: view.clone(),
            })
    }
}
