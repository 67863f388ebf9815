// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Construction parameters for a per-partition Merkle tree.
//!
//! # Example
//!
//! ```
//! use merkle_sync::{MerkleTreeConfig, StorageStrategy};
//!
//! // Minimal config (uses defaults)
//! let config = MerkleTreeConfig::default();
//! assert_eq!(config.depth, 10);
//! assert_eq!(config.storage_strategy, StorageStrategy::Shared);
//!
//! // Full config
//! let config = MerkleTreeConfig {
//!     depth: 12,
//!     storage_strategy: StorageStrategy::PerLeaf,
//!     leaf_set_initial_capacity: 4,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

use crate::storage::StorageStrategy;

/// Configuration for one partition's Merkle tree.
///
/// Depth is the main tuning knob: each extra level doubles the number of
/// leaves, halving the hash range a leaf covers and with it the amount of
/// data a single divergent leaf drags into reconciliation. Two peers being
/// compared may legitimately use different depths; their trees agree on
/// every node order both contain.
#[derive(Debug, Clone, Deserialize)]
pub struct MerkleTreeConfig {
    /// Number of tree levels, between 2 and 27 (default: 10, i.e. 512 leaves)
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Leaf key membership layout (default: shared)
    #[serde(default)]
    pub storage_strategy: StorageStrategy,

    /// Initial capacity of each per-leaf key set (default: 1).
    /// Only used by the per-leaf strategy.
    #[serde(default = "default_leaf_set_initial_capacity")]
    pub leaf_set_initial_capacity: usize,

    /// Load factor of the key set tables, in (0, 1) (default: 0.6)
    #[serde(default = "default_load_factor")]
    pub load_factor: f32,
}

impl Default for MerkleTreeConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            storage_strategy: StorageStrategy::default(),
            leaf_set_initial_capacity: default_leaf_set_initial_capacity(),
            load_factor: default_load_factor(),
        }
    }
}

fn default_depth() -> usize {
    10
}

fn default_leaf_set_initial_capacity() -> usize {
    1
}

fn default_load_factor() -> f32 {
    0.6
}
