// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use serde::Deserialize;

use crate::error::TreeError;

/// Storage contract used by [`MerkleTree`](crate::tree::MerkleTree).
///
/// `node_order` and `leaf_order` arguments are breadth-first orders as
/// produced by the [`index`](crate::index) module. Callers pass orders that
/// exist in the tree the storage was sized for; out-of-range orders panic.
pub trait TreeStorage<K> {
    /// Returns the hash of the node.
    fn node_hash(&self, node_order: usize) -> i32;

    /// Sets the hash of the node.
    fn set_node_hash(&mut self, node_order: usize, hash: i32);

    /// Records the key as a member of the leaf.
    fn add_key_to_leaf(&mut self, leaf_order: usize, key_hash: i32, key: K)
        -> Result<(), TreeError>;

    /// Removes the key from the leaf's membership.
    fn remove_key_from_leaf(&mut self, leaf_order: usize, key_hash: i32, key: &K);

    /// Calls the visitor for every key currently under the leaf.
    fn for_each_key_of_leaf(&self, leaf_order: usize, visitor: &mut dyn FnMut(&K));

    /// Number of keys currently under the leaf.
    fn leaf_key_count(&self, leaf_order: usize) -> usize;

    /// Recomputes the hashes of all ancestors of the leaf up to the root.
    fn update_branch(&mut self, leaf_order: usize);

    /// Zeroes every node hash and empties every leaf's key membership.
    fn clear(&mut self);

    /// Estimated memory consumption of the storage in bytes.
    fn footprint(&self) -> usize;
}

/// Selects the leaf key membership layout at tree construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageStrategy {
    /// One key set per leaf.
    PerLeaf,
    /// One shared key set for all leaves, discriminated by leaf order.
    #[default]
    Shared,
}
