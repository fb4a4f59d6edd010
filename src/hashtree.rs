use crate::Digest;

pub mod event;
mod frontier;
pub mod node;
pub mod proof;
pub mod streaming;

pub use node::{LeafHandle, NodeHandle, Side};
pub use proof::{Proof, ProofStep};

/// Core hash tree abstraction
pub trait HashTree {
  type Error;

  /// Append a new data item to the tree
  fn append(&mut self, data: Vec<u8>) -> Result<LeafHandle, Self::Error>;

  /// Retrieve data by 0-based index
  fn get(&self, index: u64) -> Option<&[u8]>;

  /// Get the current size (number of leaf nodes)
  fn size(&self) -> u64;

  /// Get the root hash
  fn root_hash(&self) -> Result<Digest, Self::Error>;

  /// Generate proof path from the given leaf to the current root
  fn generate_proof(&self, leaf: LeafHandle) -> Result<Proof, Self::Error>;
}
