// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;
pub mod concatenate;
pub mod fail_on_marker;
pub mod route_empty;
pub mod stopword_filter;
pub mod token_counter;

pub use change_text_case::*;
pub use concatenate::*;
pub use fail_on_marker::*;
pub use route_empty::*;
pub use stopword_filter::*;
pub use token_counter::*;

use crate::errors::{CloneError, FnError};
use crate::traits::{DoFn, FinishBundleContext, ProcessContext};

/// Any built-in line-oriented function, so a configured transform has one concrete type.
#[derive(Debug, Clone)]
pub enum LocalFn {
    ChangeTextCase(ChangeTextCaseFn),
    Concatenate(ConcatenateFn),
    FailOnMarker(FailOnMarkerFn),
    RouteEmpty(RouteEmptyFn),
    StopwordFilter(StopwordFilterFn),
    TokenCounter(TokenCounterFn),
}

impl DoFn for LocalFn {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        match self {
            LocalFn::ChangeTextCase(f) => f.name(),
            LocalFn::Concatenate(f) => f.name(),
            LocalFn::FailOnMarker(f) => f.name(),
            LocalFn::RouteEmpty(f) => f.name(),
            LocalFn::StopwordFilter(f) => f.name(),
            LocalFn::TokenCounter(f) => f.name(),
        }
    }

    fn clone_fn(&self) -> Result<Self, CloneError> {
        Ok(match self {
            LocalFn::ChangeTextCase(f) => LocalFn::ChangeTextCase(f.clone_fn()?),
            LocalFn::Concatenate(f) => LocalFn::Concatenate(f.clone_fn()?),
            LocalFn::FailOnMarker(f) => LocalFn::FailOnMarker(f.clone_fn()?),
            LocalFn::RouteEmpty(f) => LocalFn::RouteEmpty(f.clone_fn()?),
            LocalFn::StopwordFilter(f) => LocalFn::StopwordFilter(f.clone_fn()?),
            LocalFn::TokenCounter(f) => LocalFn::TokenCounter(f.clone_fn()?),
        })
    }

    fn start_bundle(&mut self) -> Result<(), FnError> {
        match self {
            LocalFn::ChangeTextCase(f) => f.start_bundle(),
            LocalFn::Concatenate(f) => f.start_bundle(),
            LocalFn::FailOnMarker(f) => f.start_bundle(),
            LocalFn::RouteEmpty(f) => f.start_bundle(),
            LocalFn::StopwordFilter(f) => f.start_bundle(),
            LocalFn::TokenCounter(f) => f.start_bundle(),
        }
    }

    fn process_element(&mut self, ctx: &mut ProcessContext<'_, String, String>) -> Result<(), FnError> {
        match self {
            LocalFn::ChangeTextCase(f) => f.process_element(ctx),
            LocalFn::Concatenate(f) => f.process_element(ctx),
            LocalFn::FailOnMarker(f) => f.process_element(ctx),
            LocalFn::RouteEmpty(f) => f.process_element(ctx),
            LocalFn::StopwordFilter(f) => f.process_element(ctx),
            LocalFn::TokenCounter(f) => f.process_element(ctx),
        }
    }

    fn finish_bundle(&mut self, ctx: &mut FinishBundleContext<'_, String>) -> Result<(), FnError> {
        match self {
            LocalFn::ChangeTextCase(f) => f.finish_bundle(ctx),
            LocalFn::Concatenate(f) => f.finish_bundle(ctx),
            LocalFn::FailOnMarker(f) => f.finish_bundle(ctx),
            LocalFn::RouteEmpty(f) => f.finish_bundle(ctx),
            LocalFn::StopwordFilter(f) => f.finish_bundle(ctx),
            LocalFn::TokenCounter(f) => f.finish_bundle(ctx),
        }
    }
}
