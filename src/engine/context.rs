// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::EvaluationContext;
use crate::values::PCollectionView;

/// Evaluation context backed by side inputs that were materialized up front.
#[derive(Default, Clone)]
pub struct InProcessEvaluationContext {
    side_inputs: HashMap<PCollectionView, Arc<dyn Any + Send + Sync>>,
}

impl InProcessEvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_side_input<V: Any + Send + Sync>(mut self, view: PCollectionView, value: V) -> Self {
        self.side_inputs.insert(view, Arc::new(value));
        self
    }
}

impl std::fmt::Debug for InProcessEvaluationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessEvaluationContext")
            .field("side_inputs", &self.side_inputs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EvaluationContext for InProcessEvaluationContext {
    fn side_input(&self, view: &PCollectionView) -> Option<Arc<dyn Any + Send + Sync>> {
        self.side_inputs.get(view).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_registered_view() {
        let context = InProcessEvaluationContext::new()
            .with_side_input(PCollectionView::new("limit"), 10u64);

        let value = context.side_input(&PCollectionView::new("limit")).unwrap();
        assert_eq!(*value.downcast::<u64>().unwrap(), 10);
        assert!(context.side_input(&PCollectionView::new("missing")).is_none());
    }
}
