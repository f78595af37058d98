use std::fmt::{self, Display};
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};

use crate::error::{Error, Result};
use crate::hash::{Engine, Hash, HashFunction};
use crate::merkle::path::{Path, Step};

/// Inclusion proof: the sibling hashes from the root down to the leaf, the path, the number of leaves of the tree
/// when the proof was issued, and the engine that produced the hashes.
///
/// The canonical string form is
///
/// ```text
/// Base64("<hex(trail[0])><hex(trail[1])>...<path>.<engine>.<size>")
/// ```
///
/// with the trail hashes concatenated and the four fields joined by dots.
#[derive(Debug, Clone)]
pub struct Proof {
  trail: Vec<Hash>,
  path: Path,
  size: usize,
  engine: Engine,
}

impl Proof {
  pub fn new(trail: Vec<Hash>, path: Path, size: usize, engine: Engine) -> Self {
    Proof { trail, path, size, engine }
  }

  /// Sibling hashes, top-down. Levels where the node was promoted have no entry.
  pub fn trail(&self) -> &[Hash] {
    &self.trail
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn engine(&self) -> Engine {
    self.engine
  }

  /// Folds `leaf` with the trail up to the root, without access to the tree.
  ///
  /// Returns `None` if the path does not fit the declared size, the trail does not match the path, or `function`
  /// uses another engine.
  pub fn compute_root(&self, leaf: &[u8], function: &HashFunction) -> Option<Hash> {
    if function.engine() != self.engine {
      return None;
    }
    let steps = self.path.steps(self.size)?;
    let mut trail = self.trail.iter().rev();
    let mut hash = leaf.to_vec();
    for step in steps.iter().rev() {
      hash = match step {
        Step::Promoted => hash,
        Step::Left => function.combine(&hash, trail.next()?),
        Step::Right => function.combine(trail.next()?, &hash),
      };
    }
    if trail.next().is_some() {
      return None;
    }
    Some(hash)
  }

  /// Whether `leaf` folds up to the root given in hex.
  pub fn validate(&self, leaf: &[u8], root_hash: &str, function: &HashFunction) -> bool {
    self.compute_root(leaf, function).is_some_and(|root| hex::encode(root) == root_hash)
  }
}

impl Display for Proof {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let trail = self.trail.iter().map(hex::encode).collect::<String>();
    let readable = format!("{trail}.{}.{}.{}", self.path, self.engine, self.size);
    f.write_str(&general_purpose::STANDARD.encode(readable))
  }
}

impl FromStr for Proof {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidMerkleProof(s.to_string());
    let decoded = general_purpose::STANDARD.decode(s).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let parts = decoded.split('.').collect::<Vec<_>>();
    let [trail, path, engine, size] = parts.as_slice() else {
      return Err(invalid());
    };

    let engine = engine.parse::<Engine>().map_err(|_| invalid())?;
    let size = size.parse::<usize>().ok().filter(|size| *size > 0).ok_or_else(invalid)?;
    let path = Path::try_from(*path).map_err(|_| invalid())?;

    let chunk = engine.output_len() * 2;
    if trail.len() % chunk != 0 {
      return Err(invalid());
    }
    let trail = trail
      .as_bytes()
      .chunks(chunk)
      .map(hex::decode)
      .collect::<std::result::Result<Vec<_>, _>>()
      .map_err(|_| invalid())?;

    Ok(Proof::new(trail, path, size, engine))
  }
}

/// Two proofs are the same proof when their canonical strings are.
impl PartialEq for Proof {
  fn eq(&self, other: &Self) -> bool {
    self.to_string() == other.to_string()
  }
}

impl Eq for Proof {}
