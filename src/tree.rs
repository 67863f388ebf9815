// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The per-partition Merkle tree façade.
//!
//! The tree is a derived index over one partition's record store: every
//! committed put, replace or remove is folded into the leaf owning the
//! key's hash range, then the leaf's ancestors are recomposed up to the
//! root. Because the per-node hash is an order-independent wrapping sum of
//! the value hashes under the node, an update touches one leaf slot and
//! `depth - 1` ancestor slots, never the data itself.
//!
//! # Concurrency
//!
//! The tree is **not** internally synchronized, on purpose. It is always
//! mutated as a side effect of a record store operation that the owning
//! partition already serializes, so the update path carries no locks and no
//! atomics. A [`MerkleTree`] shared across threads without external
//! serialization loses its sum consistency; that is a caller contract, not
//! something this type defends against.
//!
//! # Example
//!
//! ```
//! use merkle_sync::MerkleTree;
//!
//! let mut tree = MerkleTree::with_depth(3).unwrap();
//! tree.update_add(1001i32, &42i32).unwrap();
//! tree.update_replace(&1001i32, &42i32, &43i32).unwrap();
//!
//! // The root hash now reflects exactly one value with hash 43.
//! assert_eq!(tree.node_hash(0), 43);
//! assert_eq!(tree.node_key_count(0), 1);
//! ```

use tracing::debug;

use crate::config::MerkleTreeConfig;
use crate::error::TreeError;
use crate::hash::{add_hash, remove_hash, spread, Hash32};
use crate::index::{
    is_leaf, leaf_order_for_hash, left_most_leaf_under_node, nodes_on_level,
    right_most_leaf_under_node,
};
use crate::storage::{PerLeafStorage, SharedStorage, StorageStrategy, TreeStorage};

/// Smallest supported tree depth. A 1-level tree would map the whole hash
/// codomain onto a single node and could not localise anything.
pub const MIN_DEPTH: usize = 2;

/// Largest supported tree depth; 27 levels already mean 2^26 leaves.
pub const MAX_DEPTH: usize = 27;

/// A partition's Merkle tree over the signed 32-bit key hash codomain.
///
/// Holds no reference to the record store it mirrors; it is rebuildable
/// from scratch by replaying all live entries through [`update_add`].
///
/// [`update_add`]: MerkleTree::update_add
pub struct MerkleTree<K> {
    storage: Box<dyn TreeStorage<K>>,
    depth: usize,
    leaf_level: usize,
}

impl<K: Hash32 + Eq + 'static> MerkleTree<K> {
    /// Creates a tree from the given configuration.
    ///
    /// Fails with [`TreeError::InvalidDepth`] outside `2..=27` and
    /// [`TreeError::InvalidLoadFactor`] outside (0, 1); no partially
    /// constructed tree is observable on failure.
    pub fn new(config: &MerkleTreeConfig) -> Result<Self, TreeError> {
        let depth = config.depth;
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
            return Err(TreeError::InvalidDepth(depth));
        }

        let storage: Box<dyn TreeStorage<K>> = match config.storage_strategy {
            StorageStrategy::PerLeaf => Box::new(PerLeafStorage::new(
                depth,
                config.leaf_set_initial_capacity,
                config.load_factor,
            )?),
            StorageStrategy::Shared => Box::new(SharedStorage::new(depth, config.load_factor)?),
        };

        debug!(
            depth,
            leaves = nodes_on_level(depth - 1),
            strategy = ?config.storage_strategy,
            "created merkle tree"
        );

        Ok(Self {
            storage,
            depth,
            leaf_level: depth - 1,
        })
    }

    /// Creates a tree with the given depth and default storage settings.
    pub fn with_depth(depth: usize) -> Result<Self, TreeError> {
        Self::new(&MerkleTreeConfig {
            depth,
            ..MerkleTreeConfig::default()
        })
    }

    /// Folds a newly inserted entry into the tree.
    pub fn update_add<V>(&mut self, key: K, value: &V) -> Result<(), TreeError>
    where
        V: Hash32 + ?Sized,
    {
        let key_hash = spread(key.hash32());
        let value_hash = value.hash32();

        let leaf_order = leaf_order_for_hash(key_hash, self.leaf_level);
        let leaf_hash = add_hash(self.storage.node_hash(leaf_order), value_hash);

        self.storage.set_node_hash(leaf_order, leaf_hash);
        self.storage.add_key_to_leaf(leaf_order, key_hash, key)?;
        self.storage.update_branch(leaf_order);
        Ok(())
    }

    /// Replaces an entry's value contribution. Key membership is unchanged.
    pub fn update_replace<V>(
        &mut self,
        key: &K,
        old_value: &V,
        new_value: &V,
    ) -> Result<(), TreeError>
    where
        V: Hash32 + ?Sized,
    {
        let key_hash = spread(key.hash32());

        let leaf_order = leaf_order_for_hash(key_hash, self.leaf_level);
        let mut leaf_hash = remove_hash(self.storage.node_hash(leaf_order), old_value.hash32());
        leaf_hash = add_hash(leaf_hash, new_value.hash32());

        self.storage.set_node_hash(leaf_order, leaf_hash);
        self.storage.update_branch(leaf_order);
        Ok(())
    }

    /// Removes an entry's contribution and its key membership.
    pub fn update_remove<V>(&mut self, key: &K, removed_value: &V) -> Result<(), TreeError>
    where
        V: Hash32 + ?Sized,
    {
        let key_hash = spread(key.hash32());

        let leaf_order = leaf_order_for_hash(key_hash, self.leaf_level);
        let leaf_hash = remove_hash(self.storage.node_hash(leaf_order), removed_value.hash32());

        self.storage.set_node_hash(leaf_order, leaf_hash);
        self.storage.remove_key_from_leaf(leaf_order, key_hash, key);
        self.storage.update_branch(leaf_order);
        Ok(())
    }

    /// Hash of the node, by breadth-first order.
    ///
    /// # Panics
    ///
    /// Panics if `node_order` does not exist in this tree.
    #[must_use]
    pub fn node_hash(&self, node_order: usize) -> i32 {
        self.storage.node_hash(node_order)
    }

    /// Number of keys under the node (the node's whole leaf range for an
    /// inner node).
    #[must_use]
    pub fn node_key_count(&self, node_order: usize) -> usize {
        if is_leaf(node_order, self.depth) {
            return self.storage.leaf_key_count(node_order);
        }

        let left_most = left_most_leaf_under_node(node_order, self.depth);
        let right_most = right_most_leaf_under_node(node_order, self.depth);
        (left_most..=right_most)
            .map(|leaf_order| self.storage.leaf_key_count(leaf_order))
            .sum()
    }

    /// Calls the visitor for every key under the node, each exactly once.
    pub fn for_each_key_of_node<F: FnMut(&K)>(&self, node_order: usize, mut visitor: F) {
        if is_leaf(node_order, self.depth) {
            self.storage.for_each_key_of_leaf(node_order, &mut visitor);
            return;
        }

        let left_most = left_most_leaf_under_node(node_order, self.depth);
        let right_most = right_most_leaf_under_node(node_order, self.depth);
        for leaf_order in left_most..=right_most {
            self.storage.for_each_key_of_leaf(leaf_order, &mut visitor);
        }
    }

    /// Number of levels in this tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Level the leaves live on (`depth - 1`).
    #[must_use]
    pub fn leaf_level(&self) -> usize {
        self.leaf_level
    }

    /// Zeroes every node hash and empties every leaf's key membership.
    pub fn clear(&mut self) {
        debug!(depth = self.depth, "clearing merkle tree");
        self.storage.clear();
    }

    /// Estimated memory consumption of the tree in bytes.
    #[must_use]
    pub fn footprint(&self) -> usize {
        self.storage.footprint() + std::mem::size_of::<Self>()
    }
}
