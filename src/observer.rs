// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The boundary between a partition's record store and its Merkle tree.
//!
//! The record store calls the observer on every committed mutation; the
//! observer folds the event into the tree. Eviction is the one event with
//! non-obvious handling: an evicted entry leaves memory but stays part of
//! the logical data set a peer replica sees, so the tree keeps tracking it
//! and [`on_evict_record`](RecordStoreObserver::on_evict_record) does not
//! touch the tree at all.

use crate::config::MerkleTreeConfig;
use crate::error::TreeError;
use crate::hash::Hash32;
use crate::tree::MerkleTree;

/// Mutation events emitted by a partition's record store.
///
/// Implementations are called after the mutation committed, from the same
/// serialized context that performed it.
pub trait RecordStoreObserver<K> {
    /// A new entry was inserted.
    fn on_put_record<V: Hash32 + ?Sized>(&mut self, key: K, value: &V) -> Result<(), TreeError>;

    /// An existing entry's value was replaced.
    fn on_replace_record<V: Hash32 + ?Sized>(
        &mut self,
        key: &K,
        old_value: &V,
        new_value: &V,
    ) -> Result<(), TreeError>;

    /// An entry was removed from the data set.
    fn on_remove_record<V: Hash32 + ?Sized>(
        &mut self,
        key: &K,
        removed_value: &V,
    ) -> Result<(), TreeError>;

    /// An entry was evicted from memory but remains logically present.
    fn on_evict_record<V: Hash32 + ?Sized>(&mut self, key: &K, value: &V)
        -> Result<(), TreeError>;

    /// The partition's record store was cleared.
    fn on_clear(&mut self);

    /// The partition is being destroyed.
    fn on_destroy(&mut self);
}

/// [`RecordStoreObserver`] maintaining one partition's [`MerkleTree`].
pub struct PartitionMerkleObserver<K> {
    tree: MerkleTree<K>,
}

impl<K: Hash32 + Eq + 'static> PartitionMerkleObserver<K> {
    pub fn new(config: &MerkleTreeConfig) -> Result<Self, TreeError> {
        Ok(Self {
            tree: MerkleTree::new(config)?,
        })
    }

    /// The tree, for hash and key queries by the reconciliation side.
    #[must_use]
    pub fn tree(&self) -> &MerkleTree<K> {
        &self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> MerkleTree<K> {
        self.tree
    }
}

impl<K> RecordStoreObserver<K> for PartitionMerkleObserver<K>
where
    K: Hash32 + Eq + 'static,
{
    fn on_put_record<V: Hash32 + ?Sized>(&mut self, key: K, value: &V) -> Result<(), TreeError> {
        self.tree.update_add(key, value)
    }

    fn on_replace_record<V: Hash32 + ?Sized>(
        &mut self,
        key: &K,
        old_value: &V,
        new_value: &V,
    ) -> Result<(), TreeError> {
        self.tree.update_replace(key, old_value, new_value)
    }

    fn on_remove_record<V: Hash32 + ?Sized>(
        &mut self,
        key: &K,
        removed_value: &V,
    ) -> Result<(), TreeError> {
        self.tree.update_remove(key, removed_value)
    }

    fn on_evict_record<V: Hash32 + ?Sized>(
        &mut self,
        _key: &K,
        _value: &V,
    ) -> Result<(), TreeError> {
        // The entry was folded in by its original put and still counts.
        Ok(())
    }

    fn on_clear(&mut self) {
        self.tree.clear();
    }

    fn on_destroy(&mut self) {
        self.tree.clear();
    }
}
