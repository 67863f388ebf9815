// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! 32-bit hash plumbing for the Merkle tree.
//!
//! Node hashes are combined with plain wrapping addition over `i32`. The
//! combination is associative, commutative and invertible, so a node's hash
//! equals the sum of the hashes of all values under it no matter in which
//! order the sum was accumulated. That property is what makes O(1)
//! incremental updates and depth-independent comparison possible, and it is
//! why overflow is defined behavior here rather than an error.
//!
//! # Example
//!
//! ```
//! use merkle_sync::hash::{add_hash, remove_hash, sum_hash};
//!
//! let h = add_hash(add_hash(0, 7), -3);
//! assert_eq!(h, sum_hash(7, -3));
//! assert_eq!(remove_hash(h, -3), 7);
//!
//! // Wraparound is deliberate, not a bug.
//! assert_eq!(add_hash(i32::MAX, 1), i32::MIN);
//! ```

/// Large odd prime used to spread key hashes over the full signed 32-bit
/// codomain before leaf mapping. Low-entropy key hashes (small integers,
/// sequential ids) would otherwise all collapse into the middle leaves.
pub const SPREAD_PRIME: i32 = 0x9E37_79B1_u32 as i32;

/// A stable 32-bit hash, in the style of a JVM `hashCode`.
///
/// The Merkle tree works entirely in the signed 32-bit hash codomain, so
/// keys and values supply their hash through this trait rather than through
/// [`std::hash::Hash`] (which is 64-bit and hasher-dependent). Two replicas
/// comparing trees must agree on these hashes, so implementations must be
/// deterministic across processes and architectures.
pub trait Hash32 {
    fn hash32(&self) -> i32;
}

impl Hash32 for i32 {
    #[inline]
    fn hash32(&self) -> i32 {
        *self
    }
}

impl Hash32 for u32 {
    #[inline]
    fn hash32(&self) -> i32 {
        *self as i32
    }
}

impl Hash32 for i64 {
    #[inline]
    fn hash32(&self) -> i32 {
        (*self ^ ((*self as u64) >> 32) as i64) as i32
    }
}

impl Hash32 for u64 {
    #[inline]
    fn hash32(&self) -> i32 {
        (*self ^ (*self >> 32)) as i32
    }
}

impl Hash32 for [u8] {
    fn hash32(&self) -> i32 {
        self.iter()
            .fold(0i32, |h, &b| h.wrapping_mul(31).wrapping_add(b as i32))
    }
}

impl Hash32 for str {
    #[inline]
    fn hash32(&self) -> i32 {
        self.as_bytes().hash32()
    }
}

impl Hash32 for String {
    #[inline]
    fn hash32(&self) -> i32 {
        self.as_str().hash32()
    }
}

impl Hash32 for Vec<u8> {
    #[inline]
    fn hash32(&self) -> i32 {
        self.as_slice().hash32()
    }
}

impl<T: Hash32 + ?Sized> Hash32 for &T {
    #[inline]
    fn hash32(&self) -> i32 {
        (**self).hash32()
    }
}

/// Spread a raw key hash over the full signed 32-bit codomain.
#[inline]
#[must_use]
pub fn spread(hash: i32) -> i32 {
    hash.wrapping_mul(SPREAD_PRIME)
}

/// Fold a value hash into a node hash.
#[inline]
#[must_use]
pub fn add_hash(current: i32, value_hash: i32) -> i32 {
    current.wrapping_add(value_hash)
}

/// Remove a previously folded value hash from a node hash.
/// Exact inverse of [`add_hash`].
#[inline]
#[must_use]
pub fn remove_hash(current: i32, value_hash: i32) -> i32 {
    current.wrapping_sub(value_hash)
}

/// Combine the hashes of two sibling nodes into their parent's hash.
#[inline]
#[must_use]
pub fn sum_hash(left: i32, right: i32) -> i32 {
    left.wrapping_add(right)
}
