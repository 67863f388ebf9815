// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tree storage keeping one key set per leaf.

use std::mem;

use crate::error::TreeError;
use crate::index::{leftmost_node_order_on_level, nodes_on_level};
use crate::keyset::OaHashSet;
use crate::storage::traits::TreeStorage;
use crate::storage::NodeArray;

/// Storage with a dedicated [`OaHashSet`] per leaf, indexed by the leaf's
/// offset on the leaf level.
///
/// The sets are created eagerly at construction with a small initial
/// capacity, so sparsely populated trees pay the per-set fixed cost up
/// front. [`SharedStorage`](crate::storage::SharedStorage) avoids that cost
/// at the price of scanning one large table for leaf-scoped queries.
#[derive(Debug)]
pub struct PerLeafStorage<K> {
    nodes: NodeArray,
    leaf_sets: Vec<OaHashSet<K>>,
    leaf_level_order: usize,
    /// Running byte estimate, adjusted from key set footprint deltas on
    /// every membership mutation. Observability only; tree correctness
    /// never reads it.
    footprint: usize,
}

impl<K: Eq> PerLeafStorage<K> {
    pub fn new(
        depth: usize,
        leaf_set_initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self, TreeError> {
        let leaf_level = depth - 1;
        let leaves = nodes_on_level(leaf_level);

        let mut leaf_sets = Vec::with_capacity(leaves);
        for _ in 0..leaves {
            leaf_sets.push(OaHashSet::with_load_factor(
                leaf_set_initial_capacity,
                load_factor,
            )?);
        }

        let mut storage = Self {
            nodes: NodeArray::new(depth),
            leaf_sets,
            leaf_level_order: leftmost_node_order_on_level(leaf_level),
            footprint: 0,
        };
        storage.footprint = storage.initial_footprint();
        Ok(storage)
    }

    fn initial_footprint(&self) -> usize {
        let sets: usize = self.leaf_sets.iter().map(OaHashSet::footprint).sum();
        sets + self.nodes.footprint() + mem::size_of::<Self>()
    }

    #[inline]
    fn leaf_set_index(&self, leaf_order: usize) -> usize {
        leaf_order - self.leaf_level_order
    }
}

impl<K: Eq> TreeStorage<K> for PerLeafStorage<K> {
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
        let index = self.leaf_set_index(leaf_order);
        let set = &mut self.leaf_sets[index];
        let before = set.footprint();
        let result = set.add(key, key_hash);
        // the sets never shrink, so the delta is non-negative
        self.footprint += self.leaf_sets[index].footprint() - before;
        result.map(|_| ())
    }

    fn remove_key_from_leaf(&mut self, leaf_order: usize, key_hash: i32, key: &K) {
        let index = self.leaf_set_index(leaf_order);
        self.leaf_sets[index].remove(key, key_hash);
    }

    fn for_each_key_of_leaf(&self, leaf_order: usize, visitor: &mut dyn FnMut(&K)) {
        let index = self.leaf_set_index(leaf_order);
        for key in self.leaf_sets[index].iter().flatten() {
            visitor(key);
        }
    }

    fn leaf_key_count(&self, leaf_order: usize) -> usize {
        self.leaf_sets[self.leaf_set_index(leaf_order)].len()
    }

    fn update_branch(&mut self, leaf_order: usize) {
        self.nodes.update_branch(leaf_order);
    }

    fn clear(&mut self) {
        self.nodes.clear();
        for set in &mut self.leaf_sets {
            set.clear();
        }
    }

    fn footprint(&self) -> usize {
        self.footprint
    }
}
