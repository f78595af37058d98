use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// The digest engine name is not registered.
  #[error("invalid engine: {0}")]
  InvalidEngine(String),

  /// The string is not a canonical Merkle proof.
  #[error("invalid proof: {0}")]
  InvalidMerkleProof(String),

  #[error("tree not built")]
  TreeNotBuilt,

  /// The path encoder stopped before reaching the requested depth; carries the partial path.
  #[error("unable to build path, found: {0}")]
  UnableToBuildPath(String),

  #[error("empty tree")]
  EmptyTree,

  /// A proof could not be derived for the leaf at this index right after a build.
  #[error("unable to retrieve proof for leaf #{0}")]
  UnableToRetrieveProof(usize),

  #[error("invalid JSON: {0}")]
  InvalidJson(#[from] serde_json::Error),
}
