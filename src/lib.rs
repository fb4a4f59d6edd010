//! A streaming, append-only Merkle accumulator.
//!
//! Values are appended one at a time. The tree keeps a frontier of perfect subtrees ("peaks"), one per set bit
//! of the leaf count, and folds every new leaf into it the way a binary counter carries. After each append the
//! peaks are reduced into a single root, and an inclusion proof for any leaf can be produced against that root.
//!
//! ```rust
//! use streaming_merkle::hashtree::HashTree;
//! use streaming_merkle::hashtree::streaming::StreamingHashTree;
//!
//! let mut tree = StreamingHashTree::<streaming_merkle::Blake3>::new();
//! let first = tree.append(b"1 transaction".to_vec()).unwrap();
//! tree.append(b"2 transaction".to_vec()).unwrap();
//!
//! let proof = tree.generate_proof(first).unwrap();
//! assert_eq!(tree.root_hash().unwrap(), proof.root());
//! ```

pub mod error;
pub mod hash;
pub mod hashtree;

pub use error::{Error, Result};
pub use hash::{Blake3, DIGEST_LEN, Digest, HashFunction, Sha256};

/// Deterministic pseudo-random sequence used to generate leaf values in drivers and tests.
pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}
