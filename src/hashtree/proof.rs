use crate::Digest;
use crate::hashtree::Side;

/// One level of an inclusion proof: the digest next to the path and the side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
  pub sibling: Digest,
  pub side: Side,
}

/// Inclusion proof of a node against the root that was current when the proof was generated.
///
/// Steps are ordered bottom-up. Recombining the node digest with each sibling, on the recorded side, using
/// `H(left ++ right)` yields [`Proof::root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
  pub(crate) target: Digest,
  pub(crate) steps: Vec<ProofStep>,
  pub(crate) root: Digest,
}

impl Proof {
  /// Digest of the node the proof was generated for.
  pub fn target(&self) -> Digest {
    self.target
  }

  pub fn steps(&self) -> &[ProofStep] {
    &self.steps
  }

  pub fn root(&self) -> Digest {
    self.root
  }

  /// Number of edges between the node and the root.
  pub fn depth(&self) -> usize {
    self.steps.len()
  }

  /// Flat form: the sibling digests bottom-up, followed by the root digest.
  pub fn digests(&self) -> Vec<Digest> {
    self.steps.iter().map(|step| step.sibling).chain(std::iter::once(self.root)).collect()
  }
}
