// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the Merkle tree engine.
//!
//! Every failure here is local and deterministic. There is no retry logic:
//! errors propagate to the caller, whose sole recovery path is rebuilding
//! the tree from scratch by replaying the partition contents.

use thiserror::Error;

/// Errors produced by the Merkle tree and its backing structures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Tree construction was attempted with an unsupported depth.
    /// A 1-level tree is degenerate (a single node covers the whole hash
    /// codomain) and a tree deeper than 27 levels exceeds the addressable
    /// node range.
    #[error("tree depth {0} is outside the supported range 2..=27")]
    InvalidDepth(usize),

    /// A key set was configured with a load factor outside (0, 1).
    #[error("load factor {0} must be greater than 0 and less than 1")]
    InvalidLoadFactor(f32),

    /// Doubling the key set table would exceed the maximum addressable
    /// capacity. The set refuses to wrap rather than corrupt its probe
    /// sequences.
    #[error("key set capacity exhausted at size {0}")]
    CapacityExhausted(usize),

    /// The key set was structurally modified while an iterator was live.
    #[error("key set was structurally modified during iteration")]
    ConcurrentModification,
}
