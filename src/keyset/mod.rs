// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Open-addressing key set used by the tree storage layers.

pub mod oa_set;

pub use oa_set::{Iter, OaHashSet};
