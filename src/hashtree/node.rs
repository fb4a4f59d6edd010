use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Digest, Error, HashFunction, Result};

pub(crate) type NodeId = usize;

/// Opaque reference to a node of a [`StreamingHashTree`](super::streaming::StreamingHashTree).
///
/// The tree id keeps a handle from resolving in any other tree. The generation distinguishes a recycled arena slot
/// from the node that previously lived there, so a handle to a discarded node never silently resolves to a different
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
  tree: u64,
  index: usize,
  generation: u64,
}

impl NodeHandle {
  pub fn tree(&self) -> u64 {
    self.tree
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }
}

/// Handle returned by `append`, naming the leaf that holds the appended value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafHandle(pub(crate) NodeHandle);

impl LeafHandle {
  pub fn node(&self) -> NodeHandle {
    self.0
  }
}

impl From<LeafHandle> for NodeHandle {
  fn from(leaf: LeafHandle) -> Self {
    leaf.0
  }
}

/// The side a sibling occupies under the shared parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Left,
  Right,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
  Leaf { value: Vec<u8> },
  Internal { left: NodeId, right: NodeId },
}

/// Node representation in the hash tree
#[derive(Debug, Clone)]
pub(crate) struct Node {
  pub hash: Digest,
  pub parent: Option<NodeId>,
  pub kind: NodeKind,
}

impl Node {
  /// The other child of this node relative to `child`, with the side it sits on.
  pub(crate) fn sibling_of(&self, child: NodeId) -> Option<(NodeId, Side)> {
    match self.kind {
      NodeKind::Internal { left, right } if left == child => Some((right, Side::Right)),
      NodeKind::Internal { left, right } if right == child => Some((left, Side::Left)),
      _ => None,
    }
  }
}

#[derive(Debug)]
struct Slot {
  generation: u64,
  node: Option<Node>,
}

/// Index-addressed node storage. Children are referenced by index and parents by a plain, non-owning index, so
/// the tree never forms an ownership cycle.
#[derive(Debug)]
pub(crate) struct Arena {
  id: u64,
  slots: Vec<Slot>,
  free: Vec<NodeId>,
  live: usize,
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

impl Arena {
  pub fn new() -> Self {
    let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
    Arena { id, slots: Vec::new(), free: Vec::new(), live: 0 }
  }

  pub fn len(&self) -> usize {
    self.live
  }

  /// Number of slots ever allocated, live or free.
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  fn insert(&mut self, node: Node) -> NodeId {
    self.live += 1;
    if let Some(id) = self.free.pop() {
      self.slots[id].node = Some(node);
      id
    } else {
      self.slots.push(Slot { generation: 0, node: Some(node) });
      self.slots.len() - 1
    }
  }

  /// Drops the node in `id` and retires every handle that still refers to it.
  pub fn release(&mut self, id: NodeId) -> Option<Node> {
    let slot = self.slots.get_mut(id)?;
    let node = slot.node.take()?;
    slot.generation += 1;
    self.free.push(id);
    self.live -= 1;
    Some(node)
  }

  pub fn get(&self, id: NodeId) -> Option<&Node> {
    self.slots.get(id).and_then(|slot| slot.node.as_ref())
  }

  pub fn node(&self, id: NodeId) -> Result<&Node> {
    self.get(id).ok_or_else(|| Error::MalformedMerge(format!("node #{id} is not in the arena")))
  }

  pub fn digest(&self, id: NodeId) -> Result<Digest> {
    Ok(self.node(id)?.hash)
  }

  pub fn handle(&self, id: NodeId) -> NodeHandle {
    let generation = self.slots.get(id).map(|slot| slot.generation).unwrap_or_default();
    NodeHandle { tree: self.id, index: id, generation }
  }

  pub fn resolve(&self, handle: NodeHandle) -> Option<NodeId> {
    if handle.tree != self.id {
      return None;
    }
    match self.slots.get(handle.index) {
      Some(Slot { generation, node: Some(_) }) if *generation == handle.generation => Some(handle.index),
      _ => None,
    }
  }

  pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
    match self.slots.get_mut(id).and_then(|slot| slot.node.as_mut()) {
      Some(node) => {
        node.parent = parent;
        Ok(())
      }
      None => Err(Error::MalformedMerge(format!("cannot re-parent missing node #{id}"))),
    }
  }

  pub fn make_leaf<H: HashFunction>(&mut self, value: Vec<u8>) -> NodeId {
    let hash = H::hash(&value);
    self.insert(Node { hash, parent: None, kind: NodeKind::Leaf { value } })
  }

  /// Builds the parent of `left` and `right` and points both children at it.
  pub fn make_internal<H: HashFunction>(&mut self, left: NodeId, right: NodeId) -> Result<NodeId> {
    if left == right {
      return Err(Error::MalformedMerge(format!("node #{left} cannot be its own sibling")));
    }
    let hash = H::combine(&self.digest(left)?, &self.digest(right)?);
    let id = self.insert(Node { hash, parent: None, kind: NodeKind::Internal { left, right } });
    self.set_parent(left, Some(id))?;
    self.set_parent(right, Some(id))?;
    Ok(id)
  }
}
