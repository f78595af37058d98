use std::fmt::{self, Display};
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Raw digest output.
pub type Hash = Vec<u8>;

pub const SHA_256: &str = "sha-256";
pub const BLAKE3: &str = "blake3";

/// Digest algorithms known to the registry, addressed by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
  #[default]
  Sha256,
  Blake3,
}

impl Engine {
  pub fn name(&self) -> &'static str {
    match self {
      Engine::Sha256 => SHA_256,
      Engine::Blake3 => BLAKE3,
    }
  }

  /// Number of bytes produced by a single digest.
  pub fn output_len(&self) -> usize {
    match self {
      Engine::Sha256 => 32,
      Engine::Blake3 => blake3::OUT_LEN,
    }
  }

  fn digest(&self, parts: &[&[u8]]) -> Hash {
    match self {
      Engine::Sha256 => {
        let mut hasher = Sha256::new();
        for part in parts {
          hasher.update(part);
        }
        hasher.finalize().to_vec()
      }
      Engine::Blake3 => {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
          hasher.update(part);
        }
        hasher.finalize().as_bytes().to_vec()
      }
    }
  }
}

impl FromStr for Engine {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      SHA_256 => Ok(Engine::Sha256),
      BLAKE3 => Ok(Engine::Blake3),
      _ => Err(Error::InvalidEngine(s.to_string())),
    }
  }
}

impl Display for Engine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A digest function resolved from the registry, optionally applied twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFunction {
  engine: Engine,
  double_hash: bool,
}

impl HashFunction {
  /// Resolve the engine registered under `engine`.
  pub fn build(engine: &str, double_hash: bool) -> Result<Self> {
    let engine = engine.parse::<Engine>()?;
    Ok(HashFunction { engine, double_hash })
  }

  pub fn engine(&self) -> Engine {
    self.engine
  }

  pub fn double_hash(&self) -> bool {
    self.double_hash
  }

  pub fn hash(&self, data: &[u8]) -> Hash {
    self.digest(&[data])
  }

  /// Digest of `left ++ right`. The order matters.
  pub fn combine(&self, left: &[u8], right: &[u8]) -> Hash {
    self.digest(&[left, right])
  }

  fn digest(&self, parts: &[&[u8]]) -> Hash {
    let hash = self.engine.digest(parts);
    if self.double_hash { self.engine.digest(&[hash.as_slice()]) } else { hash }
  }
}

/// Whether `hash` is a well-formed output of the named engine. Unknown engines are never correct.
pub fn is_correct(hash: &[u8], engine: &str) -> bool {
  match engine.parse::<Engine>() {
    Ok(engine) => hex::encode(hash).len() == engine.output_len() * 2,
    Err(_) => false,
  }
}

/// Stable lexicographic sort on the raw bytes.
pub fn sort_hashes(hashes: &mut [Hash]) {
  hashes.sort();
}
