// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Not thread-safe open-addressing hash set with linear probing.
//!
//! Every operation takes the element's hash alongside the element itself.
//! The caller already computed that hash to map the key to a leaf, so the
//! set never has to recompute it, not even when rehashing. Each slot's hash
//! is cached in a packed auxiliary word next to an optional discriminator
//! tag, and probing compares against the packed word before touching the
//! element array, which keeps the probe loop a sequential scan over one
//! `u64` array.
//!
//! The discriminator lets one table hold many logical groups: the shared
//! tree storage stores the keys of every leaf in a single set, tagged with
//! the owning leaf's order, trading per-group overhead for one contiguous
//! table.
//!
//! The set never shrinks, and removal during iteration is not supported:
//! removal compacts the collision chain, which could move a not yet visited
//! element behind the iterator's position.

use std::mem;

use tracing::debug;

use crate::error::TreeError;

const DEFAULT_LOAD_FACTOR: f32 = 0.6;
const NO_DISCRIMINATOR: i32 = 0;

/// Doubling past this point would overflow the probe mask arithmetic.
const MAX_CAPACITY: usize = 1 << 30;

/// Open-addressing hash set storing `(element, hash, discriminator)` per
/// entry, with externally supplied hashes.
#[derive(Debug)]
pub struct OaHashSet<T> {
    table: Vec<Option<T>>,
    /// Packed `(discriminator:32 | hash:32)` per slot; 0 for empty slots.
    aux: Vec<u64>,
    load_factor: f32,
    resize_threshold: usize,
    mask: usize,
    size: usize,
    /// Bumped on every structural mutation, checked by live iterators.
    version: u64,
}

#[inline]
fn pack(hash: i32, discriminator: i32) -> u64 {
    ((discriminator as u32 as u64) << 32) | (hash as u32 as u64)
}

#[inline]
fn unpack_hash(aux: u64) -> i32 {
    aux as u32 as i32
}

#[inline]
fn unpack_discriminator(aux: u64) -> i32 {
    (aux >> 32) as u32 as i32
}

impl<T: Eq> OaHashSet<T> {
    /// Creates a set with the given initial capacity (rounded up to a power
    /// of two) and the default load factor.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self::build(initial_capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a set with an explicit load factor in (0, 1).
    pub fn with_load_factor(initial_capacity: usize, load_factor: f32) -> Result<Self, TreeError> {
        if !(load_factor > 0.0 && load_factor < 1.0) {
            return Err(TreeError::InvalidLoadFactor(load_factor));
        }
        Ok(Self::build(initial_capacity, load_factor))
    }

    fn build(initial_capacity: usize, load_factor: f32) -> Self {
        let capacity = initial_capacity.next_power_of_two().max(1);
        Self {
            table: (0..capacity).map(|_| None).collect(),
            aux: vec![0; capacity],
            load_factor,
            resize_threshold: (capacity as f32 * load_factor) as usize,
            mask: capacity - 1,
            size: 0,
            version: 0,
        }
    }

    /// Adds an element with its precomputed hash.
    ///
    /// Returns `Ok(true)` if the set did not already contain the element.
    /// Fails only when the table needs to grow past the maximum capacity.
    pub fn add(&mut self, element: T, hash: i32) -> Result<bool, TreeError> {
        self.add_discriminated(element, hash, NO_DISCRIMINATOR)
    }

    /// Adds an element with its precomputed hash, tagged with a
    /// discriminator identifying the logical group it belongs to.
    ///
    /// Membership is decided by `(hash, element)` alone; adding an element
    /// that is already present leaves its existing discriminator untouched.
    pub fn add_discriminated(
        &mut self,
        element: T,
        hash: i32,
        discriminator: i32,
    ) -> Result<bool, TreeError> {
        let mut index = (hash as u32 as usize) & self.mask;

        while let Some(existing) = &self.table[index] {
            if unpack_hash(self.aux[index]) == hash && *existing == element {
                return Ok(false);
            }
            index = (index + 1) & self.mask;
        }

        self.table[index] = Some(element);
        self.aux[index] = pack(hash, discriminator);
        self.size += 1;
        self.version += 1;

        if self.size > self.resize_threshold {
            self.grow()?;
        }

        Ok(true)
    }

    /// Returns whether the set contains the element with the given hash.
    #[must_use]
    pub fn contains(&self, element: &T, hash: i32) -> bool {
        let mut index = (hash as u32 as usize) & self.mask;

        while let Some(existing) = &self.table[index] {
            if unpack_hash(self.aux[index]) == hash && existing == element {
                return true;
            }
            index = (index + 1) & self.mask;
        }

        false
    }

    /// Removes the element with the given hash if present.
    ///
    /// Returns whether the set contained the element.
    pub fn remove(&mut self, element: &T, hash: i32) -> bool {
        let mut index = (hash as u32 as usize) & self.mask;

        while let Some(existing) = &self.table[index] {
            if unpack_hash(self.aux[index]) == hash && existing == element {
                self.remove_from_index(index);
                return true;
            }
            index = (index + 1) & self.mask;
        }

        false
    }

    fn remove_from_index(&mut self, index: usize) {
        self.table[index] = None;
        self.aux[index] = 0;
        self.size -= 1;
        self.version += 1;

        self.compact_chain(index);
    }

    /// Relocates entries whose probe sequence crossed the freed slot.
    ///
    /// Linear probing requires this: an entry displaced past the removed
    /// slot would otherwise become unreachable, because lookups stop at the
    /// first empty slot.
    fn compact_chain(&mut self, index_of_removed: usize) {
        let mut delete_index = index_of_removed;
        let mut index = index_of_removed;

        loop {
            index = (index + 1) & self.mask;

            if self.table[index].is_none() {
                return;
            }

            let hashed_index = (unpack_hash(self.aux[index]) as u32 as usize) & self.mask;
            if (index < hashed_index && (hashed_index <= delete_index || delete_index <= index))
                || (hashed_index <= delete_index && delete_index <= index)
            {
                self.table[delete_index] = self.table[index].take();
                self.aux[delete_index] = self.aux[index];
                self.aux[index] = 0;
                delete_index = index;
            }
        }
    }

    /// Calls `f` for every element tagged with one of the discriminators.
    pub fn for_each_matching<F: FnMut(&T)>(&self, discriminators: &[i32], mut f: F) {
        for (index, slot) in self.table.iter().enumerate() {
            if let Some(element) = slot {
                let discriminator = unpack_discriminator(self.aux[index]);
                if discriminators.contains(&discriminator) {
                    f(element);
                }
            }
        }
    }

    /// Counts the elements tagged with one of the discriminators.
    #[must_use]
    pub fn count_matching(&self, discriminators: &[i32]) -> usize {
        let mut count = 0;
        for (index, slot) in self.table.iter().enumerate() {
            if slot.is_some() && discriminators.contains(&unpack_discriminator(self.aux[index])) {
                count += 1;
            }
        }
        count
    }

    /// Iterates over all elements in table order.
    ///
    /// The iterator yields `Err(TreeError::ConcurrentModification)` if the
    /// set's version moves under it. Removal through the iterator is not
    /// offered at all, since chain compaction could skip unvisited
    /// elements.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            set: self,
            expected_version: self.version,
            index: 0,
            visited: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current number of slots in the backing table.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Removes all elements; the table keeps its current capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.table {
            *slot = None;
        }
        self.aux.fill(0);
        self.size = 0;
        self.version += 1;
    }

    /// Estimated memory consumption of the set in bytes.
    #[must_use]
    pub fn footprint(&self) -> usize {
        self.table.capacity() * mem::size_of::<Option<T>>()
            + self.aux.capacity() * mem::size_of::<u64>()
            + mem::size_of::<Self>()
    }

    fn grow(&mut self) -> Result<(), TreeError> {
        if self.capacity() >= MAX_CAPACITY {
            return Err(TreeError::CapacityExhausted(self.size));
        }
        let new_capacity = self.capacity() << 1;
        debug!(
            old_capacity = self.capacity(),
            new_capacity,
            size = self.size,
            "growing key set table"
        );
        self.rehash(new_capacity);
        Ok(())
    }

    fn rehash(&mut self, new_capacity: usize) {
        let old_table = mem::replace(&mut self.table, (0..new_capacity).map(|_| None).collect());
        let old_aux = mem::replace(&mut self.aux, vec![0; new_capacity]);

        self.mask = new_capacity - 1;
        self.resize_threshold = (new_capacity as f32 * self.load_factor) as usize;

        for (slot, aux) in old_table.into_iter().zip(old_aux) {
            if let Some(element) = slot {
                let mut index = (unpack_hash(aux) as u32 as usize) & self.mask;
                while self.table[index].is_some() {
                    index = (index + 1) & self.mask;
                }
                self.table[index] = Some(element);
                self.aux[index] = aux;
            }
        }
    }
}

/// Single-pass iterator over an [`OaHashSet`], version-stamped at creation.
pub struct Iter<'a, T> {
    set: &'a OaHashSet<T>,
    expected_version: u64,
    index: usize,
    visited: usize,
}

impl<'a, T: Eq> Iterator for Iter<'a, T> {
    type Item = Result<&'a T, TreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.visited >= self.set.size {
            return None;
        }
        if self.set.version != self.expected_version {
            self.visited = self.set.size;
            return Some(Err(TreeError::ConcurrentModification));
        }

        while self.index < self.set.table.len() {
            let slot = self.set.table[self.index].as_ref();
            self.index += 1;
            if let Some(element) = slot {
                self.visited += 1;
                return Some(Ok(element));
            }
        }

        None
    }
}
