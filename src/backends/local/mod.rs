// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod fns;

pub use factory::LocalFnFactory;
pub use fns::*;
