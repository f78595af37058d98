use serde::{Deserialize, Serialize};

use crate::hash::SHA_256;

/// Settings a tree is built with. They cannot change once the tree exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeOptions {
  pub double_hash: bool,
  pub engine: String,
  pub sort: bool,
}

impl TreeOptions {
  pub fn new(double_hash: bool, engine: &str, sort: bool) -> Self {
    TreeOptions { double_hash, engine: engine.to_string(), sort }
  }
}

/// No double hashing, `sha-256`, leaves kept in insertion order.
impl Default for TreeOptions {
  fn default() -> Self {
    TreeOptions::new(false, SHA_256, false)
  }
}
