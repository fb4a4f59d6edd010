use std::fmt::{Debug, Display};

use sha2::Digest as _;

pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Fixed-width output of a [`HashFunction`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
  pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
    Digest(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
    &self.0
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl From<blake3::Hash> for Digest {
  fn from(hash: blake3::Hash) -> Self {
    Digest(*hash.as_bytes())
  }
}

impl AsRef<[u8]> for Digest {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Display for Digest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl Debug for Digest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Digest({})", self.to_hex())
  }
}

/// Pure, deterministic hash with a fixed [`DIGEST_LEN`]-byte output.
pub trait HashFunction {
  /// Name used in logs and report file names.
  const NAME: &'static str;

  fn hash(data: &[u8]) -> Digest;

  /// Digest of an internal node: `H(left ++ right)` over the raw digest bytes, with no separator.
  fn combine(left: &Digest, right: &Digest) -> Digest {
    let mut buffer = [0u8; DIGEST_LEN * 2];
    buffer[..DIGEST_LEN].copy_from_slice(left.as_bytes());
    buffer[DIGEST_LEN..].copy_from_slice(right.as_bytes());
    Self::hash(&buffer)
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3;

impl HashFunction for Blake3 {
  const NAME: &'static str = "blake3";

  fn hash(data: &[u8]) -> Digest {
    blake3::hash(data).into()
  }

  fn combine(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hasher.finalize().into()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256;

impl HashFunction for Sha256 {
  const NAME: &'static str = "sha256";

  fn hash(data: &[u8]) -> Digest {
    let output = sha2::Sha256::digest(data);
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&output);
    Digest(bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blake3_combine_is_hash_of_concatenation() {
    let left = Blake3::hash(b"1 transaction");
    let right = Blake3::hash(b"2 transaction");
    let concat = [left.as_bytes().as_slice(), right.as_bytes().as_slice()].concat();
    assert_eq!(Blake3::hash(&concat), Blake3::combine(&left, &right));
    assert_ne!(Blake3::combine(&left, &right), Blake3::combine(&right, &left));
  }

  #[test]
  fn sha256_matches_known_vector() {
    assert_eq!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad", Sha256::hash(b"abc").to_hex());
    assert_eq!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855", Sha256::hash(b"").to_hex());
  }

  #[test]
  fn digest_renders_as_hex() {
    let digest = Digest::from_bytes([0xab; DIGEST_LEN]);
    assert_eq!("ab".repeat(DIGEST_LEN), digest.to_string());
    assert_eq!(format!("Digest({})", "ab".repeat(DIGEST_LEN)), format!("{digest:?}"));
  }
}
