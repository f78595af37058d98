use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::{Hash, HashFunction, is_correct, sort_hashes};
use crate::merkle::options::TreeOptions;
use crate::merkle::path::{Path, Step};
use crate::merkle::proof::Proof;


/// In-memory Merkle tree.
///
/// `levels[0]` holds the root and the last level holds the leaves. Adjacent pairs are hashed left to right into the
/// level above, and the last node of an odd-sized level is promoted unchanged.
///
/// A tree is not synchronized: a rebuild replaces the leaves and levels in place, so callers sharing it across
/// threads must serialize access.
#[derive(Debug, Clone)]
pub struct Tree {
  ready: bool,
  function: HashFunction,
  leaves: Vec<Hash>,
  levels: Vec<Vec<Hash>>,
  options: TreeOptions,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
  #[serde(default)]
  options: Option<TreeOptions>,
  #[serde(default)]
  leaves: Vec<String>,
}

impl Tree {
  /// Creates an empty, unbuilt tree. Fails if the options name an unknown engine.
  pub fn new(options: TreeOptions) -> Result<Self> {
    let function = HashFunction::build(&options.engine, options.double_hash)?;
    Ok(Tree { ready: false, function, leaves: Vec::new(), levels: Vec::new(), options })
  }

  /// Restores a tree from the JSON produced by [`Tree::to_json`]. Leaves that are not valid hex are skipped.
  pub fn from_json(json: &str) -> Result<Self> {
    let snapshot = serde_json::from_str::<Snapshot>(json)?;
    let mut tree = Tree::new(snapshot.options.unwrap_or_default())?;
    let leaves = snapshot
      .leaves
      .iter()
      .filter_map(|leaf| match hex::decode(leaf) {
        Ok(leaf) => Some(leaf),
        Err(e) => {
          trace!("skipping snapshot leaf {leaf:?}: {e}");
          None
        }
      })
      .collect::<Vec<_>>();
    if leaves.is_empty() {
      return Err(Error::EmptyTree);
    }
    tree.add_leaves(false, &leaves)?;
    Ok(tree)
  }

  /// Replaces all leaves and rebuilds the tree, returning one proof per leaf in leaf order.
  ///
  /// With `do_hash` each item is raw data and gets hashed; otherwise each item is taken as a leaf hash, and items
  /// that are not well-formed hashes for the engine are dropped.
  pub fn add_leaves<D: AsRef<[u8]>>(&mut self, do_hash: bool, data: &[D]) -> Result<Vec<Proof>> {
    self.ready = false;
    if data.is_empty() {
      return Err(Error::EmptyTree);
    }
    let engine = self.options.engine.as_str();
    let mut leaves = if do_hash {
      data.iter().map(|item| self.function.hash(item.as_ref())).collect::<Vec<_>>()
    } else {
      data
        .iter()
        .map(|item| item.as_ref())
        .filter(|item| {
          let correct = is_correct(item, engine);
          if !correct {
            trace!("dropping malformed {engine} leaf: {}", hex::encode(item));
          }
          correct
        })
        .map(<[u8]>::to_vec)
        .collect::<Vec<_>>()
    };
    if self.options.sort {
      sort_hashes(&mut leaves);
    }
    self.leaves = leaves;
    self.make()
  }

  /// Number of levels below the root.
  pub fn depth(&self) -> Result<usize> {
    if !self.ready {
      return Err(Error::TreeNotBuilt);
    }
    Ok(self.levels.len() - 1)
  }

  pub fn engine(&self) -> &str {
    &self.options.engine
  }

  /// Proof for the first leaf equal to `leaf`, if the tree is built and holds it.
  pub fn get_proof(&self, leaf: &[u8]) -> Option<Proof> {
    if !self.ready {
      return None;
    }
    let index = self.leaves.iter().position(|l| l.as_slice() == leaf)?;
    self.proof_at(index)
  }

  /// Hex form of the root hash.
  pub fn root_hash(&self) -> Result<String> {
    if !self.ready {
      return Err(Error::TreeNotBuilt);
    }
    Ok(hex::encode(&self.levels[0][0]))
  }

  pub fn is_ready(&self) -> bool {
    self.ready
  }

  pub fn is_sorted(&self) -> bool {
    self.options.sort
  }

  pub fn leaves(&self) -> &[Hash] {
    &self.leaves
  }

  pub fn options(&self) -> &TreeOptions {
    &self.options
  }

  pub fn size(&self) -> usize {
    self.leaves.len()
  }

  /// Snapshot of the options and the hex leaves in build order.
  pub fn to_json(&self) -> Result<String> {
    if !self.ready && !self.leaves.is_empty() {
      return Err(Error::TreeNotBuilt);
    }
    let snapshot = Snapshot { options: Some(self.options.clone()), leaves: self.leaves.iter().map(hex::encode).collect() };
    Ok(serde_json::to_string(&snapshot)?)
  }

  pub fn use_double_hash(&self) -> bool {
    self.options.double_hash
  }

  /// Checks `proof` for `leaf` against `root_hash`, which must be this tree's current root.
  ///
  /// By default the trail is folded up from the leaf. With `rebuild` the proof must instead be identical to the one
  /// this tree derives for `leaf`.
  pub fn validate_proof(&self, proof: &Proof, leaf: &[u8], root_hash: &str, rebuild: bool) -> bool {
    match self.root_hash() {
      Ok(root) if root == root_hash => (),
      _ => return false,
    }
    if rebuild {
      self.get_proof(leaf).is_some_and(|rebuilt| rebuilt == *proof)
    } else {
      proof.validate(leaf, root_hash, &self.function)
    }
  }

  fn make(&mut self) -> Result<Vec<Proof>> {
    self.levels.clear();
    if self.leaves.is_empty() {
      return Err(Error::EmptyTree);
    }

    let mut levels = vec![self.leaves.clone()];
    while let Some(top) = levels.last().filter(|level| level.len() > 1) {
      let next = self.next_level(top);
      levels.push(next);
    }
    levels.reverse();
    self.levels = levels;
    self.ready = true;
    debug!("tree built: {} leaves, depth {}, root {}", self.size(), self.levels.len() - 1, hex::encode(&self.levels[0][0]));

    (0..self.size()).map(|i| self.proof_at(i).ok_or(Error::UnableToRetrieveProof(i))).collect()
  }

  fn next_level(&self, level: &[Hash]) -> Vec<Hash> {
    level
      .chunks(2)
      .map(|pair| match pair {
        [left, right] => self.function.combine(left, right),
        // odd node promoted to the next level
        _ => pair[0].clone(),
      })
      .collect()
  }

  fn proof_at(&self, index: usize) -> Option<Proof> {
    let depth = self.levels.len().checked_sub(1)?;
    let path = Path::build(index, self.size(), depth).ok()?;

    // siblings bottom-up, skipping the levels where the node is promoted
    let mut siblings = Vec::with_capacity(depth);
    let mut position = index;
    for level in self.levels[1..].iter().rev() {
      if let Some(sibling) = level.get(position ^ 1) {
        let side = if position % 2 == 0 { Step::Left } else { Step::Right };
        siblings.push((side, sibling.clone()));
      }
      position /= 2;
    }
    siblings.reverse();

    let steps = path.steps(self.size())?;
    if !steps.into_iter().filter(|step| *step != Step::Promoted).eq(siblings.iter().map(|(side, _)| *side)) {
      return None;
    }
    let trail = siblings.into_iter().map(|(_, sibling)| sibling).collect();
    Some(Proof::new(trail, path, self.size(), self.function.engine()))
  }
}
