//! Property-based tests for tree construction, proofs and their string form.

use proptest::prelude::*;

use crate::hash::{BLAKE3, SHA_256};
use crate::merkle::{Path, Proof, Step, Tree, TreeOptions};

fn arb_items(max_count: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
  prop::collection::vec(prop::collection::vec(any::<u8>(), 0..48), 1..max_count)
}

fn arb_options() -> impl Strategy<Value = TreeOptions> {
  (any::<bool>(), prop_oneof![Just(SHA_256), Just(BLAKE3)], any::<bool>())
    .prop_map(|(double_hash, engine, sort)| TreeOptions::new(double_hash, engine, sort))
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  /// Every extracted proof folds its leaf back to the root, and survives the string round trip.
  #[test]
  fn prop_every_proof_validates(items in arb_items(80), options in arb_options()) {
    let mut tree = Tree::new(options).unwrap();
    let proofs = tree.add_leaves(true, &items).unwrap();
    let root = tree.root_hash().unwrap();
    prop_assert_eq!(items.len(), proofs.len());
    for (leaf, proof) in tree.leaves().iter().zip(proofs.iter()) {
      prop_assert!(tree.validate_proof(proof, leaf, &root, false));
      let restored = proof.to_string().parse::<Proof>().unwrap();
      prop_assert_eq!(proof, &restored);
      prop_assert_eq!(proof.trail(), restored.trail());
      prop_assert_eq!(proof.path(), restored.path());
      prop_assert_eq!(proof.size(), restored.size());
      prop_assert_eq!(proof.engine(), restored.engine());
    }
  }

  /// Flipping a single bit of the leaf breaks validation.
  #[test]
  fn prop_tampered_leaf_is_rejected(items in arb_items(40), pick in any::<prop::sample::Index>(), bit in 0usize..256) {
    let mut tree = Tree::new(TreeOptions::default()).unwrap();
    let proofs = tree.add_leaves(true, &items).unwrap();
    let root = tree.root_hash().unwrap();
    let i = pick.index(items.len());
    let mut leaf = tree.leaves()[i].clone();
    leaf[bit / 8] ^= 1 << (bit % 8);
    prop_assert!(!tree.validate_proof(&proofs[i], &leaf, &root, false));
  }

  /// Identical inputs give identical roots and proofs.
  #[test]
  fn prop_build_is_deterministic(items in arb_items(40), options in arb_options()) {
    let mut tree1 = Tree::new(options.clone()).unwrap();
    let mut tree2 = Tree::new(options).unwrap();
    let proofs1 = tree1.add_leaves(true, &items).unwrap();
    let proofs2 = tree2.add_leaves(true, &items).unwrap();
    prop_assert_eq!(tree1.root_hash().unwrap(), tree2.root_hash().unwrap());
    prop_assert_eq!(proofs1, proofs2);
  }

  /// A snapshot restores the same root.
  #[test]
  fn prop_snapshot_round_trip(items in arb_items(40), options in arb_options()) {
    let mut tree = Tree::new(options).unwrap();
    tree.add_leaves(true, &items).unwrap();
    let restored = Tree::from_json(&tree.to_json().unwrap()).unwrap();
    prop_assert_eq!(tree.root_hash().unwrap(), restored.root_hash().unwrap());
    prop_assert_eq!(tree.options(), restored.options());
  }
}

/// The path of every leaf has one sibling step per trail entry, for all sizes up to 64.
#[test]
fn paths_resolve_to_trail_entries() {
  for size in 1..=64usize {
    let items = (0..size).map(|i| i.to_le_bytes()).collect::<Vec<_>>();
    let mut tree = Tree::new(TreeOptions::default()).unwrap();
    let proofs = tree.add_leaves(true, &items).unwrap();
    let depth = tree.depth().unwrap();
    for (index, proof) in proofs.iter().enumerate() {
      assert_eq!(&Path::build(index, size, depth).unwrap(), proof.path());
      let steps = proof.path().steps(size).unwrap();
      let siblings = steps.iter().filter(|step| **step != Step::Promoted).count();
      assert_eq!(siblings, proof.trail().len(), "size={size}, index={index}");
    }
  }
}
