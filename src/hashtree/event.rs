//! Observability hook for tree mutations.
//!
//! The tree reports every carry merge and every root rebuild to an [`EventSink`]. The default sink,
//! [`TraceEvents`], forwards them to `tracing`; [`NoEvents`] discards them, and `Vec<Event>` records them.

use crate::Digest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// Two peaks of `weight / 2` leaves were combined into a peak of `weight` leaves.
  Merged { weight: u64, left: Digest, right: Digest, parent: Digest },
  /// The root was recomputed from the frontier after an append.
  RootRebuilt { leaves: u64, peaks: usize, previous: Option<Digest>, root: Digest },
}

pub trait EventSink {
  fn on_event(&mut self, event: Event);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TraceEvents;

impl EventSink for TraceEvents {
  fn on_event(&mut self, event: Event) {
    match event {
      Event::Merged { weight, left, right, parent } => {
        tracing::trace!(weight, %left, %right, %parent, "merged peaks");
      }
      Event::RootRebuilt { leaves, peaks, previous: Some(previous), root } => {
        tracing::debug!(leaves, peaks, %previous, %root, "root rebuilt");
      }
      Event::RootRebuilt { leaves, peaks, previous: None, root } => {
        tracing::debug!(leaves, peaks, %root, "root built");
      }
    }
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl EventSink for NoEvents {
  #[inline]
  fn on_event(&mut self, _event: Event) {}
}

impl EventSink for Vec<Event> {
  fn on_event(&mut self, event: Event) {
    self.push(event);
  }
}
