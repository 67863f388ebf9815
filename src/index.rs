// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Pure node-order math for the breadth-first array tree.
//!
//! Nodes are referenced by their breadth-first order: the root is order 0,
//! node `n` has children `2n + 1` and `2n + 2`, and the leaves occupy the
//! last level. The order of a node is the same in every tree that contains
//! that level, which is what lets two replicas with different tree depths
//! compare the node orders they share.
//!
//! The signed 32-bit hash codomain is split into `2^level` equal contiguous
//! ranges on each level, one per node, ordered left to right. Because the
//! range widths are powers of two, the range of a node is exactly the union
//! of its children's ranges, so the partition is depth-consistent by
//! construction.

/// Total number of nodes in a complete binary tree of the given depth.
#[inline]
#[must_use]
pub fn number_of_nodes(depth: usize) -> usize {
    (1 << depth) - 1
}

/// Number of nodes on a single level (level 0 is the root).
#[inline]
#[must_use]
pub fn nodes_on_level(level: usize) -> usize {
    1 << level
}

/// Breadth-first order of the leftmost node on a level.
#[inline]
#[must_use]
pub fn leftmost_node_order_on_level(level: usize) -> usize {
    (1 << level) - 1
}

/// Order of a node's parent. The root has no parent; callers never pass 0.
#[inline]
#[must_use]
pub fn parent_order(node_order: usize) -> usize {
    (node_order - 1) / 2
}

/// Order of a node's left child.
#[inline]
#[must_use]
pub fn left_child_order(node_order: usize) -> usize {
    2 * node_order + 1
}

/// Order of a node's right child.
#[inline]
#[must_use]
pub fn right_child_order(node_order: usize) -> usize {
    2 * node_order + 2
}

/// Level of a node, derived from its order alone.
#[inline]
#[must_use]
pub fn level_of_node(node_order: usize) -> usize {
    (node_order + 1).ilog2() as usize
}

/// Whether the node is on the leaf level of a tree with the given depth.
#[inline]
#[must_use]
pub fn is_leaf(node_order: usize, depth: usize) -> bool {
    node_order >= leftmost_node_order_on_level(depth - 1)
}

/// Maps a key hash to the order of the leaf whose range contains it.
///
/// The mapping biases the signed hash into unsigned space and takes its top
/// `leaf_level` bits, which is an exact equal-width partition of the
/// codomain and monotonic in `hash`.
#[inline]
#[must_use]
pub fn leaf_order_for_hash(hash: i32, leaf_level: usize) -> usize {
    if leaf_level == 0 {
        return 0;
    }
    let biased = (hash as u32) ^ 0x8000_0000;
    let step = (biased >> (32 - leaf_level)) as usize;
    leftmost_node_order_on_level(leaf_level) + step
}

/// Lowest key hash covered by a node (inclusive).
#[must_use]
pub fn node_range_low(node_order: usize) -> i32 {
    let level = level_of_node(node_order);
    let offset = node_order - leftmost_node_order_on_level(level);
    let width = node_range_width(level);
    (i32::MIN as i64 + offset as i64 * width) as i32
}

/// Highest key hash covered by a node (inclusive).
#[must_use]
pub fn node_range_high(node_order: usize) -> i32 {
    let level = level_of_node(node_order);
    let offset = node_order - leftmost_node_order_on_level(level);
    let width = node_range_width(level);
    (i32::MIN as i64 + (offset as i64 + 1) * width - 1) as i32
}

/// Width of each node's hash range on a level.
#[inline]
fn node_range_width(level: usize) -> i64 {
    (1i64 << 32) / nodes_on_level(level) as i64
}

/// Order of the leftmost leaf under a node.
#[must_use]
pub fn left_most_leaf_under_node(node_order: usize, depth: usize) -> usize {
    let leaf_level = depth - 1;
    let level = level_of_node(node_order);
    let offset = node_order - leftmost_node_order_on_level(level);
    let leaves_per_node = 1 << (leaf_level - level);
    leftmost_node_order_on_level(leaf_level) + offset * leaves_per_node
}

/// Order of the rightmost leaf under a node.
#[must_use]
pub fn right_most_leaf_under_node(node_order: usize, depth: usize) -> usize {
    let leaf_level = depth - 1;
    let level = level_of_node(node_order);
    let offset = node_order - leftmost_node_order_on_level(level);
    let leaves_per_node = 1 << (leaf_level - level);
    leftmost_node_order_on_level(leaf_level) + (offset + 1) * leaves_per_node - 1
}
