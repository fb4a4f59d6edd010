use std::collections::BTreeMap;

use crate::hashtree::event::{Event, EventSink};
use crate::hashtree::node::{Arena, NodeId};
use crate::{Error, HashFunction, Result};

/// Peaks of the tree keyed by weight, the number of leaves under each peak.
///
/// The weights present are exactly the set bits of the leaf count, so there is at most one peak per bit.
#[derive(Debug, Default, Clone)]
pub(crate) struct Frontier {
  peaks: BTreeMap<u64, NodeId>,
}

impl Frontier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.peaks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.peaks.is_empty()
  }

  /// `(weight, peak)` pairs, ascending by weight.
  pub fn iter(&self) -> impl Iterator<Item = (u64, NodeId)> + '_ {
    self.peaks.iter().map(|(weight, id)| (*weight, *id))
  }

  pub fn peaks(&self) -> Vec<NodeId> {
    self.peaks.values().copied().collect()
  }

  #[cfg(test)]
  pub(crate) fn insert(&mut self, weight: u64, id: NodeId) {
    self.peaks.insert(weight, id);
  }

  /// Folds `leaf` into the frontier like incrementing a binary counter. Each existing peak of the carried weight
  /// becomes the left child, the carried subtree the right child, so leaves read left to right in append order.
  /// Note this puts the newer subtree on the right, the opposite of a "new side first" merge. Returns the weight the
  /// carry settled at.
  pub fn push<H, E>(&mut self, arena: &mut Arena, leaf: NodeId, events: &mut E) -> Result<u64>
  where
    H: HashFunction,
    E: EventSink,
  {
    let mut combine = leaf;
    let mut weight = 1u64;
    while let Some(&sibling) = self.peaks.get(&weight) {
      let next = weight.checked_mul(2).ok_or_else(|| Error::MalformedMerge(format!("weight {weight} overflows")))?;
      let merged = arena.make_internal::<H>(sibling, combine)?;
      self.peaks.remove(&weight);
      events.on_event(Event::Merged {
        weight: next,
        left: arena.digest(sibling)?,
        right: arena.digest(combine)?,
        parent: arena.digest(merged)?,
      });
      combine = merged;
      weight = next;
    }
    self.peaks.insert(weight, combine);
    Ok(weight)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Blake3;
  use crate::hashtree::event::NoEvents;

  fn weights(frontier: &Frontier) -> Vec<u64> {
    frontier.iter().map(|(weight, _)| weight).collect()
  }

  #[test]
  fn carries_like_a_binary_counter() {
    let mut arena = Arena::new();
    let mut frontier = Frontier::new();
    assert!(frontier.is_empty());
    for n in 1..=64u64 {
      let leaf = arena.make_leaf::<Blake3>(n.to_le_bytes().to_vec());
      let settled = frontier.push::<Blake3, _>(&mut arena, leaf, &mut NoEvents).unwrap();
      assert_eq!(1u64 << n.trailing_zeros(), settled, "n={n}");
      let expected = (0..u64::BITS).map(|bit| 1u64 << bit).filter(|w| n & w != 0).collect::<Vec<_>>();
      assert_eq!(expected, weights(&frontier), "n={n}");
      assert_eq!(n.count_ones() as usize, frontier.len());
    }
  }

  #[test]
  fn older_peak_is_left_child() {
    let mut arena = Arena::new();
    let mut frontier = Frontier::new();
    let mut events: Vec<Event> = Vec::new();
    let a = arena.make_leaf::<Blake3>(b"a".to_vec());
    frontier.push::<Blake3, _>(&mut arena, a, &mut events).unwrap();
    let b = arena.make_leaf::<Blake3>(b"b".to_vec());
    frontier.push::<Blake3, _>(&mut arena, b, &mut events).unwrap();

    let peaks = frontier.peaks();
    assert_eq!(1, peaks.len());
    let expected = Blake3::combine(&Blake3::hash(b"a"), &Blake3::hash(b"b"));
    assert_eq!(expected, arena.digest(peaks[0]).unwrap());
    assert_eq!(Some(peaks[0]), arena.get(a).unwrap().parent);
    assert_eq!(
      vec![Event::Merged { weight: 2, left: Blake3::hash(b"a"), right: Blake3::hash(b"b"), parent: expected }],
      events
    );
  }
}
