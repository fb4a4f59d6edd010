use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// No value has been appended yet.
  #[error("the tree is empty")]
  EmptyTree,

  /// The handle belongs to another tree, names a discarded node, or its parent chain does not end at the current
  /// root.
  #[error("node #{index} (generation {generation}) is not reachable from the current root")]
  UnreachableNode { index: usize, generation: u64 },

  /// An internal invariant of the merge or the root rebuild was broken.
  #[error("malformed merge: {0}")]
  MalformedMerge(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
