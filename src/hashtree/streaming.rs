use std::marker::PhantomData;

use crate::hashtree::event::{Event, EventSink, TraceEvents};
use crate::hashtree::frontier::Frontier;
use crate::hashtree::node::{Arena, NodeId, NodeKind};
use crate::hashtree::{HashTree, LeafHandle, NodeHandle, Proof, ProofStep};
use crate::{Blake3, Digest, Error, HashFunction, Result};

/// Append-only Merkle accumulator.
///
/// Leaves are folded into a frontier of perfect subtrees, one per set bit of the leaf count. After every append
/// the peaks are reduced, ascending by weight, into a single root: consecutive peaks are paired left to right and
/// an unpaired last peak is promoted to the next level as is. The nodes created by that reduction ("bridges") are
/// discarded and rebuilt on the next append, so proofs are always relative to the current root.
///
/// ```text
///   5 leaves: frontier {1: e, 4: abcd}
///
///            root
///           /    \
///          e     abcd
///               /    \
///             ab      cd
///            /  \    /  \
///           a    b  c    d
/// ```
pub struct StreamingHashTree<H: HashFunction = Blake3, E: EventSink = TraceEvents> {
  arena: Arena,
  frontier: Frontier,
  root: Option<NodeId>,
  bridges: Vec<NodeId>,
  leaves: Vec<NodeId>,
  size: u64,
  events: E,
  _hash: PhantomData<H>,
}

impl<H: HashFunction, E: EventSink + Default> StreamingHashTree<H, E> {
  pub fn new() -> Self {
    Self::with_events(E::default())
  }
}

impl<H: HashFunction, E: EventSink + Default> Default for StreamingHashTree<H, E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<H: HashFunction, E: EventSink> StreamingHashTree<H, E> {
  pub fn with_events(events: E) -> Self {
    StreamingHashTree {
      arena: Arena::new(),
      frontier: Frontier::new(),
      root: None,
      bridges: Vec::new(),
      leaves: Vec::new(),
      size: 0,
      events,
      _hash: PhantomData,
    }
  }

  pub fn events(&self) -> &E {
    &self.events
  }

  pub fn events_mut(&mut self) -> &mut E {
    &mut self.events
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Handle of the leaf appended at the 0-based `index`.
  pub fn leaf(&self, index: u64) -> Option<LeafHandle> {
    let id = *self.leaves.get(usize::try_from(index).ok()?)?;
    Some(LeafHandle(self.arena.handle(id)))
  }

  /// Handle of the current root node. When the root is a bridge node, the handle goes stale on the next append.
  pub fn root_handle(&self) -> Option<NodeHandle> {
    self.root.map(|id| self.arena.handle(id))
  }

  pub fn is_live(&self, handle: NodeHandle) -> bool {
    self.arena.resolve(handle).is_some()
  }

  /// `(weight, digest)` of every peak, ascending by weight.
  pub fn frontier(&self) -> Vec<(u64, Digest)> {
    self.frontier.iter().filter_map(|(weight, id)| self.arena.get(id).map(|node| (weight, node.hash))).collect()
  }

  /// The weights present in the frontier. They are exactly the powers of two that sum to [`HashTree::size`].
  pub fn weights(&self) -> Vec<u64> {
    self.frontier.iter().map(|(weight, _)| weight).collect()
  }

  /// Number of live nodes: every leaf, every merged frontier node and the current bridges.
  pub fn node_count(&self) -> usize {
    self.arena.len()
  }

  /// Inclusion proof for any live node of the current tree shape, leaf or internal.
  pub fn generate_proof_for(&self, handle: NodeHandle) -> Result<Proof> {
    let root = self.root.ok_or(Error::EmptyTree)?;
    let unreachable = || Error::UnreachableNode { index: handle.index(), generation: handle.generation() };
    let start = self.arena.resolve(handle).ok_or_else(unreachable)?;

    let mut steps = Vec::new();
    let mut current = start;
    while current != root {
      if steps.len() >= self.arena.capacity() {
        return Err(unreachable());
      }
      let parent = self.arena.node(current)?.parent.ok_or_else(unreachable)?;
      let (sibling, side) = self.arena.node(parent)?.sibling_of(current).ok_or_else(|| {
        Error::MalformedMerge(format!("node #{parent} is linked as the parent of #{current} but does not own it"))
      })?;
      steps.push(ProofStep { sibling: self.arena.digest(sibling)?, side });
      current = parent;
    }

    Ok(Proof { target: self.arena.digest(start)?, steps, root: self.arena.digest(root)? })
  }

  /// Reduces the frontier peaks into a new root, replacing the bridges of the previous rebuild.
  ///
  /// The new shape is built completely before the previous bridges are released and the root is swapped. On failure
  /// the partial bridges are dropped and the peaks get their previous parents back, so the current root stays intact.
  fn rebuild_root(&mut self) -> Result<()> {
    let peaks = self.frontier.peaks();
    if peaks.is_empty() {
      return Err(Error::MalformedMerge("cannot build a root from an empty frontier".to_string()));
    }
    let previous = self.root.map(|id| self.arena.digest(id)).transpose()?;
    let parents = peaks.iter().map(|&id| Ok((id, self.arena.node(id)?.parent))).collect::<Result<Vec<_>>>()?;

    let mut bridges = Vec::with_capacity(peaks.len());
    let root = match self.reduce(peaks, &mut bridges) {
      Ok(root) => root,
      Err(e) => {
        for id in bridges {
          self.arena.release(id);
        }
        for (id, parent) in parents {
          self.arena.set_parent(id, parent)?;
        }
        return Err(e);
      }
    };

    for id in std::mem::replace(&mut self.bridges, bridges) {
      self.arena.release(id);
    }
    self.arena.set_parent(root, None)?;
    self.root = Some(root);
    self.events.on_event(Event::RootRebuilt {
      leaves: self.size,
      peaks: self.frontier.len(),
      previous,
      root: self.arena.digest(root)?,
    });
    Ok(())
  }

  /// Pairs consecutive nodes left to right until one remains; an unpaired last node is promoted as is.
  fn reduce(&mut self, mut level: Vec<NodeId>, bridges: &mut Vec<NodeId>) -> Result<NodeId> {
    while level.len() > 1 {
      let mut next = Vec::with_capacity(level.len().div_ceil(2));
      for pair in level.chunks(2) {
        if let [left, right] = *pair {
          let bridge = self.arena.make_internal::<H>(left, right)?;
          bridges.push(bridge);
          next.push(bridge);
        } else {
          next.extend_from_slice(pair);
        }
      }
      level = next;
    }
    level.first().copied().ok_or_else(|| Error::MalformedMerge("no node left to become the root".to_string()))
  }
}

impl<H: HashFunction, E: EventSink> HashTree for StreamingHashTree<H, E> {
  type Error = Error;

  fn append(&mut self, data: Vec<u8>) -> Result<LeafHandle> {
    let leaf = self.arena.make_leaf::<H>(data);
    if let Err(e) = self.frontier.push::<H, E>(&mut self.arena, leaf, &mut self.events) {
      self.arena.release(leaf);
      return Err(e);
    }
    self.leaves.push(leaf);
    self.size += 1;
    self.rebuild_root()?;
    Ok(LeafHandle(self.arena.handle(leaf)))
  }

  fn get(&self, index: u64) -> Option<&[u8]> {
    let id = *self.leaves.get(usize::try_from(index).ok()?)?;
    match &self.arena.get(id)?.kind {
      NodeKind::Leaf { value } => Some(value.as_slice()),
      NodeKind::Internal { .. } => None,
    }
  }

  fn size(&self) -> u64 {
    self.size
  }

  fn root_hash(&self) -> Result<Digest> {
    let root = self.root.ok_or(Error::EmptyTree)?;
    self.arena.digest(root)
  }

  fn generate_proof(&self, leaf: LeafHandle) -> Result<Proof> {
    self.generate_proof_for(leaf.node())
  }
}
