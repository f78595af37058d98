use std::fmt::{self, Display};

use crate::error::{Error, Result};

pub const LEFT: char = '1';
pub const RIGHT: char = '0';

/// One root-to-leaf move decoded from a [`Path`] against the tree size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// The node is the left child; its sibling is on the right.
  Left,
  /// The node is the right child; its sibling is on the left.
  Right,
  /// The node is carried up unchanged; there is no sibling at this level.
  Promoted,
}

/// Branch choices from the root down to a leaf, one character per level below the root, e.g.
///
/// ```text
///          (root)
///           /  \
///         ()   hash2
///        /  \
///    hash1  (leaf)
/// ```
///
/// gives `"10"`. `LEFT` is `'1'` and `RIGHT` is `'0'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(String);

impl Path {
  /// Computes the path to the leaf at `index` in a tree of `size` leaves and `depth` levels below the root.
  ///
  /// Each level splits the current subtree into a left part of `2^ceil(log2(size)) / 2` leaves and the remainder,
  /// which is how the levels pair up when an odd node is promoted. Once a subtree is down to a single leaf the
  /// remaining levels are filled with `LEFT`.
  pub fn build(index: usize, size: usize, depth: usize) -> Result<Path> {
    let mut path = String::with_capacity(depth);
    let (mut index, mut size) = (index, size);
    while size > 0 && path.len() < depth {
      if size == 1 {
        path.push(if index == 0 { LEFT } else { RIGHT });
        continue;
      }
      let Some(half) = half_bucket(size) else { break };
      if index < half {
        path.push(LEFT);
        size = half;
      } else {
        path.push(RIGHT);
        index -= half;
        size -= half;
      }
    }
    if path.len() != depth {
      return Err(Error::UnableToBuildPath(path));
    }
    Ok(Path(path))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Replays the subtree sizes of a tree with `size` leaves over this path. `None` if the path cannot belong to
  /// such a tree.
  pub fn steps(&self, size: usize) -> Option<Vec<Step>> {
    let mut size = size;
    let mut steps = Vec::with_capacity(self.len());
    for c in self.0.chars() {
      let step = match (size, c) {
        (0, _) => return None,
        (1, LEFT) => Step::Promoted,
        (1, _) => return None,
        (_, LEFT) => {
          size = half_bucket(size)?;
          Step::Left
        }
        (_, RIGHT) => {
          size -= half_bucket(size)?;
          Step::Right
        }
        _ => return None,
      };
      steps.push(step);
    }
    Some(steps)
  }
}

impl TryFrom<String> for Path {
  type Error = String;

  fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
    if value.chars().all(|c| c == LEFT || c == RIGHT) { Ok(Path(value)) } else { Err(value) }
  }
}

impl TryFrom<&str> for Path {
  type Error = String;

  fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
    Path::try_from(value.to_string())
  }
}

impl Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Size of the left subtree: the smallest power of two not less than `size`, halved. `None` past the largest
/// power of two a `usize` holds.
fn half_bucket(size: usize) -> Option<usize> {
  size.checked_next_power_of_two().map(|bucket| bucket / 2)
}
