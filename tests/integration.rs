//! Integration tests exercising the public API end to end.
//!
//! These model the two sides of anti-entropy: a record store feeding
//! mutations into a partition's tree, and a reconciliation coordinator
//! comparing two trees top-down to localise divergence.
//!
//! # Test Organization
//! - `replica_*` - two trees fed identical/divergent mutation streams
//! - `diff_*` - top-down divergence walks over the node orders
//! - `rebuild_*` - replaying a record store from scratch

use merkle_sync::index::{
    left_child_order, leftmost_node_order_on_level, node_range_high, node_range_low,
    number_of_nodes, right_child_order,
};
use merkle_sync::{
    Hash32, MerkleTree, MerkleTreeConfig, PartitionMerkleObserver, RecordStoreObserver,
    StorageStrategy,
};

fn tree_with(depth: usize, strategy: StorageStrategy) -> MerkleTree<i64> {
    MerkleTree::new(&MerkleTreeConfig {
        depth,
        storage_strategy: strategy,
        ..MerkleTreeConfig::default()
    })
    .expect("valid test config")
}

/// Walks two trees of equal depth top-down and returns the leaf orders
/// whose hashes differ, the way a reconciliation coordinator would.
fn divergent_leaves(a: &MerkleTree<i64>, b: &MerkleTree<i64>) -> Vec<usize> {
    assert_eq!(a.depth(), b.depth());
    let leaf_level_order = leftmost_node_order_on_level(a.depth() - 1);

    let mut divergent = Vec::new();
    let mut frontier = vec![0usize];
    while let Some(order) = frontier.pop() {
        if a.node_hash(order) == b.node_hash(order) {
            continue;
        }
        if order >= leaf_level_order {
            divergent.push(order);
        } else {
            frontier.push(left_child_order(order));
            frontier.push(right_child_order(order));
        }
    }
    divergent.sort_unstable();
    divergent
}

#[test]
fn replica_trees_with_identical_data_agree_everywhere() {
    for strategy in [StorageStrategy::Shared, StorageStrategy::PerLeaf] {
        let mut local = tree_with(6, strategy);
        let mut remote = tree_with(6, strategy);

        for i in 0..500i64 {
            local.update_add(i, &(i * 31)).unwrap();
            remote.update_add(i, &(i * 31)).unwrap();
        }

        assert!(divergent_leaves(&local, &remote).is_empty());
    }
}

#[test]
fn replica_trees_with_different_depths_agree_on_shared_orders() {
    let mut shallow = tree_with(3, StorageStrategy::Shared);
    let mut deep = tree_with(7, StorageStrategy::PerLeaf);

    for i in 0..1000i64 {
        shallow.update_add(i, &(i ^ 0x5A5A)).unwrap();
        deep.update_add(i, &(i ^ 0x5A5A)).unwrap();
    }

    for order in 0..number_of_nodes(shallow.depth()) {
        assert_eq!(shallow.node_hash(order), deep.node_hash(order), "node {order}");
    }
}

#[test]
fn diff_walk_localises_a_single_divergent_entry() {
    let mut local = tree_with(6, StorageStrategy::Shared);
    let mut remote = tree_with(6, StorageStrategy::Shared);

    for i in 0..300i64 {
        local.update_add(i, &(i * 7)).unwrap();
        remote.update_add(i, &(i * 7)).unwrap();
    }

    // The remote replica saw one extra write.
    remote.update_replace(&123i64, &(123 * 7), &0i64).unwrap();

    let divergent = divergent_leaves(&local, &remote);
    assert_eq!(divergent.len(), 1);

    // The divergent key is enumerable under the reported leaf.
    let mut keys = Vec::new();
    remote.for_each_key_of_node(divergent[0], |&k| keys.push(k));
    assert!(keys.contains(&123));
}

#[test]
fn diff_walk_finds_missing_entries_on_either_side() {
    let mut local = tree_with(5, StorageStrategy::Shared);
    let mut remote = tree_with(5, StorageStrategy::Shared);

    for i in 0..200i64 {
        local.update_add(i, &i).unwrap();
        remote.update_add(i, &i).unwrap();
    }
    local.update_add(9001, &1i64).unwrap();
    remote.update_add(9002, &2i64).unwrap();

    let divergent = divergent_leaves(&local, &remote);
    assert!(!divergent.is_empty());

    // Every divergent leaf holds at least one of the two lonely keys on
    // one of the sides.
    let mut suspects = Vec::new();
    for &leaf in &divergent {
        local.for_each_key_of_node(leaf, |&k| suspects.push(k));
        remote.for_each_key_of_node(leaf, |&k| suspects.push(k));
    }
    assert!(suspects.contains(&9001));
    assert!(suspects.contains(&9002));
}

#[test]
fn rebuild_by_replay_reproduces_the_tree() {
    let mut original = tree_with(6, StorageStrategy::Shared);
    let entries: Vec<(i64, i64)> = (0..400).map(|i| (i, i * 13)).collect();

    for &(k, v) in &entries {
        original.update_add(k, &v).unwrap();
    }
    // Some churn the rebuilt tree never sees.
    original.update_add(9999, &1i64).unwrap();
    original.update_remove(&9999i64, &1i64).unwrap();

    let mut rebuilt = tree_with(6, StorageStrategy::Shared);
    for &(k, v) in &entries {
        rebuilt.update_add(k, &v).unwrap();
    }

    for order in 0..number_of_nodes(6) {
        assert_eq!(original.node_hash(order), rebuilt.node_hash(order));
    }
    assert_eq!(original.node_key_count(0), rebuilt.node_key_count(0));
}

#[test]
fn observer_relays_record_store_lifecycle() {
    let mut observer: PartitionMerkleObserver<i64> =
        PartitionMerkleObserver::new(&MerkleTreeConfig {
            depth: 5,
            ..MerkleTreeConfig::default()
        })
        .unwrap();

    observer.on_put_record(1, &100i64).unwrap();
    observer.on_put_record(2, &200i64).unwrap();
    observer.on_evict_record(&1, &100i64).unwrap();
    observer.on_replace_record(&2, &200i64, &201i64).unwrap();

    let expected = 100i64.hash32().wrapping_add(201i64.hash32());
    assert_eq!(observer.tree().node_hash(0), expected);
    assert_eq!(observer.tree().node_key_count(0), 2);

    observer.on_clear();
    assert_eq!(observer.tree().node_hash(0), 0);
    assert_eq!(observer.tree().node_key_count(0), 0);
}

#[test]
fn node_ranges_cover_exactly_the_keys_mapped_to_them() {
    let mut tree = tree_with(4, StorageStrategy::Shared);
    for i in 0..500i64 {
        tree.update_add(i, &1i64).unwrap();
    }

    // Each leaf's key count equals the number of keys whose spread hash
    // falls into the leaf's advertised range.
    for leaf in 7..15 {
        let low = node_range_low(leaf);
        let high = node_range_high(leaf);
        let expected = (0..500i64)
            .filter(|k| {
                let h = merkle_sync::hash::spread(k.hash32());
                h >= low && h <= high
            })
            .count();
        assert_eq!(tree.node_key_count(leaf), expected, "leaf {leaf}");
    }
}

#[test]
fn byte_keys_work_end_to_end() {
    let mut tree: MerkleTree<Vec<u8>> = MerkleTree::new(&MerkleTreeConfig {
        depth: 4,
        ..MerkleTreeConfig::default()
    })
    .unwrap();

    let payload = vec![0xDE, 0xAD, 0xBE, 0xEF];
    tree.update_add(b"record-1".to_vec(), &payload).unwrap();
    assert_eq!(tree.node_hash(0), payload.hash32());

    tree.update_remove(&b"record-1".to_vec(), &payload).unwrap();
    assert_eq!(tree.node_hash(0), 0);
    assert_eq!(tree.node_key_count(0), 0);
}
