// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tree storage keeping all leaf keys in one shared, discriminated set.

use std::mem;

use crate::error::TreeError;
use crate::index::{leftmost_node_order_on_level, nodes_on_level};
use crate::keyset::OaHashSet;
use crate::storage::traits::TreeStorage;
use crate::storage::NodeArray;

/// Storage with a single [`OaHashSet`] for all leaves, tagging every key
/// with the owning leaf's order as discriminator.
///
/// One shared table avoids the per-set fixed cost of
/// [`PerLeafStorage`](crate::storage::PerLeafStorage), which dominates when
/// a deep tree spreads few keys over many leaves. Leaf-scoped queries scan
/// the whole table and filter by discriminator, so they are O(capacity)
/// instead of O(leaf size); reconciliation only runs them on the handful of
/// nodes found to diverge.
#[derive(Debug)]
pub struct SharedStorage<K> {
    nodes: NodeArray,
    leaf_keys: OaHashSet<K>,
    /// Order of the leftmost leaf; valid leaf orders span
    /// `leaf_level_order..leaf_level_order + leaf_count`.
    leaf_level_order: usize,
    leaf_count: usize,
    /// Running byte estimate, adjusted from key set footprint deltas on
    /// every membership mutation. Observability only; tree correctness
    /// never reads it.
    footprint: usize,
}

impl<K: Eq> SharedStorage<K> {
    pub fn new(depth: usize, load_factor: f32) -> Result<Self, TreeError> {
        let leaves = nodes_on_level(depth - 1);

        let mut storage = Self {
            nodes: NodeArray::new(depth),
            leaf_keys: OaHashSet::with_load_factor(leaves * 2, load_factor)?,
            leaf_level_order: leftmost_node_order_on_level(depth - 1),
            leaf_count: leaves,
            footprint: 0,
        };
        storage.footprint =
            storage.leaf_keys.footprint() + storage.nodes.footprint() + mem::size_of::<Self>();
        Ok(storage)
    }

    fn check_leaf_order(&self, leaf_order: usize) {
        assert!(
            leaf_order >= self.leaf_level_order
                && leaf_order < self.leaf_level_order + self.leaf_count,
            "leaf order out of range: {leaf_order}"
        );
    }
}

impl<K: Eq> TreeStorage<K> for SharedStorage<K> {
    fn node_hash(&self, node_order: usize) -> i32 {
        self.nodes.get(node_order)
    }

    fn set_node_hash(&mut self, node_order: usize, hash: i32) {
        self.nodes.set(node_order, hash);
    }

    fn add_key_to_leaf(
        &mut self,
        leaf_order: usize,
        key_hash: i32,
        key: K,
    ) -> Result<(), TreeError> {
        self.check_leaf_order(leaf_order);
        let before = self.leaf_keys.footprint();
        let result = self
            .leaf_keys
            .add_discriminated(key, key_hash, leaf_order as i32);
        // the set never shrinks, so the delta is non-negative
        self.footprint += self.leaf_keys.footprint() - before;
        result.map(|_| ())
    }

    fn remove_key_from_leaf(&mut self, leaf_order: usize, key_hash: i32, key: &K) {
        self.check_leaf_order(leaf_order);
        self.leaf_keys.remove(key, key_hash);
    }

    fn for_each_key_of_leaf(&self, leaf_order: usize, visitor: &mut dyn FnMut(&K)) {
        self.check_leaf_order(leaf_order);
        self.leaf_keys
            .for_each_matching(&[leaf_order as i32], |key| visitor(key));
    }

    fn leaf_key_count(&self, leaf_order: usize) -> usize {
        self.check_leaf_order(leaf_order);
        self.leaf_keys.count_matching(&[leaf_order as i32])
    }

    fn update_branch(&mut self, leaf_order: usize) {
        self.nodes.update_branch(leaf_order);
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.leaf_keys.clear();
    }

    fn footprint(&self) -> usize {
        self.footprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(depth: usize) -> SharedStorage<i32> {
        SharedStorage::new(depth, 0.6).unwrap()
    }

    #[test]
    fn test_leaf_membership_is_discriminated() {
        let mut s = storage(3);

        s.add_key_to_leaf(3, 100, 1).unwrap();
        s.add_key_to_leaf(4, 200, 2).unwrap();
        s.add_key_to_leaf(4, 300, 3).unwrap();

        assert_eq!(s.leaf_key_count(3), 1);
        assert_eq!(s.leaf_key_count(4), 2);
        assert_eq!(s.leaf_key_count(5), 0);

        let mut leaf_four = Vec::new();
        s.for_each_key_of_leaf(4, &mut |&k| leaf_four.push(k));
        leaf_four.sort_unstable();
        assert_eq!(leaf_four, vec![2, 3]);
    }

    #[test]
    fn test_remove_key_from_leaf() {
        let mut s = storage(3);
        s.add_key_to_leaf(5, 42, 7).unwrap();

        s.remove_key_from_leaf(5, 42, &7);

        assert_eq!(s.leaf_key_count(5), 0);
    }

    #[test]
    fn test_update_branch() {
        let mut s = storage(3);
        s.set_node_hash(4, 2);
        s.update_branch(4);
        s.set_node_hash(5, -1);
        s.update_branch(5);

        assert_eq!(s.node_hash(1), 2);
        assert_eq!(s.node_hash(2), -1);
        assert_eq!(s.node_hash(0), 1);
    }

    #[test]
    fn test_clear_resets_hashes_and_membership() {
        let mut s = storage(4);
        s.set_node_hash(9, 5);
        s.update_branch(9);
        s.add_key_to_leaf(9, 5, 5).unwrap();

        s.clear();

        for order in 0..15 {
            assert_eq!(s.node_hash(order), 0);
        }
        for leaf in 7..15 {
            assert_eq!(s.leaf_key_count(leaf), 0);
        }
    }

    #[test]
    fn test_footprint_tracks_set_growth() {
        let mut s = storage(3);
        let before = s.footprint();

        for i in 0..100 {
            s.add_key_to_leaf(3, i, i).unwrap();
        }

        assert!(s.footprint() > before);
    }

    #[test]
    #[should_panic(expected = "leaf order out of range")]
    fn test_interior_order_rejected_for_leaf_query() {
        let s = storage(3);
        s.leaf_key_count(2);
    }

    #[test]
    #[should_panic(expected = "leaf order out of range")]
    fn test_order_past_last_leaf_rejected() {
        let s = storage(3);
        s.for_each_key_of_leaf(7, &mut |_| {});
    }

    #[test]
    fn test_shared_is_cheaper_than_per_leaf_for_deep_trees() {
        use crate::storage::PerLeafStorage;

        let shared = SharedStorage::<i32>::new(12, 0.6).unwrap();
        let per_leaf = PerLeafStorage::<i32>::new(12, 1, 0.6).unwrap();

        assert!(shared.footprint() < per_leaf.footprint());
    }
}
