//! Merkle trees over ordered leaves, with inclusion proofs that serialize to a compact base64 string.
//!
//! ```
//! use merkle_tree::{Tree, TreeOptions};
//!
//! let mut tree = Tree::new(TreeOptions::default()).unwrap();
//! let proofs = tree.add_leaves(true, &["data1", "data2", "data3"]).unwrap();
//! let root = tree.root_hash().unwrap();
//!
//! let leaf = &tree.leaves()[1];
//! let proof = proofs[1].to_string().parse().unwrap();
//! assert!(tree.validate_proof(&proof, leaf, &root, false));
//! ```

pub mod error;
pub mod hash;
pub mod merkle;

#[cfg(test)]
mod proptest;

pub use error::{Error, Result};
pub use hash::{BLAKE3, Engine, Hash, HashFunction, SHA_256, is_correct, sort_hashes};
pub use merkle::{Path, Proof, Tree, TreeOptions};
