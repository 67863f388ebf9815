// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Merkle Sync
//!
//! A per-partition Merkle-tree anti-entropy engine for distributed
//! in-memory data grids. Two replicas of the same keyspace each maintain a
//! tree derived from their record store; comparing node hashes top-down
//! localises the hash ranges where the replicas diverge, without
//! transferring or re-hashing the data itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Record Store (caller)                  │
//! │  • Serialized per-partition mutations                       │
//! │  • Notifies the observer on every committed change          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MerkleTree façade                        │
//! │  • Maps key hash → leaf via the index math                  │
//! │  • Folds value hashes with wrapping addition                │
//! │  • Recomputes the leaf's ancestors up to the root           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Tree storage                           │
//! │  • Flat breadth-first array of 32-bit node hashes           │
//! │  • Leaf key membership: per-leaf sets, or one shared        │
//! │    open-addressing set discriminated by leaf order          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use merkle_sync::{MerkleTree, MerkleTreeConfig, StorageStrategy};
//!
//! let config = MerkleTreeConfig {
//!     depth: 4,
//!     storage_strategy: StorageStrategy::Shared,
//!     ..Default::default()
//! };
//! let mut tree = MerkleTree::new(&config).expect("valid config");
//!
//! // Fold record store mutations into the tree.
//! tree.update_add("user:1".to_string(), "alice").unwrap();
//! tree.update_add("user:2".to_string(), "bob").unwrap();
//! tree.update_replace(&"user:2".to_string(), "bob", "carol").unwrap();
//!
//! // A peer with identical data computes the identical root hash,
//! // even with a different tree depth.
//! let root = tree.node_hash(0);
//!
//! // Once a divergent node is found, enumerate the keys under it.
//! let mut keys = Vec::new();
//! tree.for_each_key_of_node(0, |k| keys.push(k.clone()));
//! assert_eq!(keys.len(), 2);
//! # let _ = root;
//! ```
//!
//! ## Properties
//!
//! - **Depth independence**: trees of different depths over identical data
//!   agree on every node order they share
//! - **Incremental updates**: one leaf slot plus `depth - 1` ancestor slots
//!   per mutation, O(1) amortized set maintenance
//! - **Invertible hashing**: add/remove are exact inverses, so the tree
//!   never needs to be rebuilt for ordinary churn
//! - **No internal locking**: mutations ride the partition's existing
//!   serialization; see [`tree`] for the caller contract
//!
//! ## Modules
//!
//! - [`tree`]: the [`MerkleTree`] façade and its update protocol
//! - [`storage`]: node hash array and the two leaf membership layouts
//! - [`keyset`]: open-addressing hash set with externally supplied hashes
//! - [`index`]: pure breadth-first order and hash range math
//! - [`hash`]: the 32-bit additive hash plumbing
//! - [`observer`]: record store boundary
//! - [`config`]: construction parameters

pub mod config;
pub mod error;
pub mod hash;
pub mod index;
pub mod keyset;
pub mod observer;
pub mod storage;
pub mod tree;

pub use config::MerkleTreeConfig;
pub use error::TreeError;
pub use hash::Hash32;
pub use keyset::OaHashSet;
pub use observer::{PartitionMerkleObserver, RecordStoreObserver};
pub use storage::{PerLeafStorage, SharedStorage, StorageStrategy, TreeStorage};
pub use tree::{MerkleTree, MAX_DEPTH, MIN_DEPTH};
