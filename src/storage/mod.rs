// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Backing storage for the Merkle tree.
//!
//! Storage owns two things: the flat array of per-node hashes, and the key
//! membership of every leaf. The two strategies differ only in how they lay
//! out leaf key membership:
//!
//! - [`PerLeafStorage`]: one key set per leaf. Simple, but each leaf pays
//!   the fixed per-set overhead even when it holds a single key.
//! - [`SharedStorage`]: one shared key set for all leaves, with the leaf
//!   order as discriminator. Better footprint for many small leaves.

pub mod per_leaf;
pub mod shared;
pub mod traits;

pub use per_leaf::PerLeafStorage;
pub use shared::SharedStorage;
pub use traits::{StorageStrategy, TreeStorage};

use std::mem;

use crate::hash::sum_hash;
use crate::index::{left_child_order, number_of_nodes, parent_order, right_child_order};

/// The flat breadth-first array of node hashes, shared by both storage
/// strategies.
#[derive(Debug)]
pub(crate) struct NodeArray {
    nodes: Vec<i32>,
}

impl NodeArray {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            nodes: vec![0; number_of_nodes(depth)],
        }
    }

    #[inline]
    pub(crate) fn get(&self, node_order: usize) -> i32 {
        self.nodes[node_order]
    }

    #[inline]
    pub(crate) fn set(&mut self, node_order: usize, hash: i32) {
        self.nodes[node_order] = hash;
    }

    /// Recomputes every ancestor of the leaf from its parent up to the
    /// root. Each ancestor becomes the sum of its two children, which the
    /// breadth-first layout turns into a short strided walk towards the
    /// front of the array.
    pub(crate) fn update_branch(&mut self, leaf_order: usize) {
        let mut node_order = leaf_order;
        while node_order > 0 {
            node_order = parent_order(node_order);
            let left = self.nodes[left_child_order(node_order)];
            let right = self.nodes[right_child_order(node_order)];
            self.nodes[node_order] = sum_hash(left, right);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.fill(0);
    }

    pub(crate) fn footprint(&self) -> usize {
        self.nodes.capacity() * mem::size_of::<i32>() + mem::size_of::<Self>()
    }
}
