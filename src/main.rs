use std::fs::{read_to_string, write};
use std::io::{Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use merkle_tree::{Proof, SHA_256, Tree, TreeOptions};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "merkle-tree")]
#[command(about = "Build Merkle trees, issue inclusion proofs and verify them")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build a tree from one item per line and print the root hash followed by `<leaf> <proof>` lines
  Build {
    #[command(flatten)]
    options: OptionArgs,

    /// Items are hex leaf hashes instead of raw data
    #[arg(long)]
    hashed: bool,

    /// Write the tree snapshot (JSON) to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Input file, one item per line; stdin if omitted
    #[arg(index = 1)]
    input: Option<PathBuf>,
  },

  /// Print the proof of a leaf from a tree snapshot
  Proof {
    /// Tree snapshot (JSON)
    #[arg(long)]
    tree: PathBuf,

    /// Leaf hash in hex
    #[arg(long)]
    leaf: String,
  },

  /// Check a proof against a tree snapshot and a root hash
  Verify {
    /// Tree snapshot (JSON)
    #[arg(long)]
    tree: PathBuf,

    /// Leaf hash in hex
    #[arg(long)]
    leaf: String,

    /// Expected root hash in hex
    #[arg(long)]
    root: String,

    /// Proof string
    #[arg(long)]
    proof: String,

    /// Compare with the proof rebuilt from the tree instead of folding the trail
    #[arg(long)]
    rebuild: bool,
  },
}

#[derive(Args)]
struct OptionArgs {
  /// Apply the digest twice
  #[arg(long)]
  double_hash: bool,

  /// Digest engine
  #[arg(long, default_value = SHA_256)]
  engine: String,

  /// Sort the leaves before building
  #[arg(long)]
  sort: bool,
}

impl From<OptionArgs> for TreeOptions {
  fn from(args: OptionArgs) -> Self {
    TreeOptions::new(args.double_hash, &args.engine, args.sort)
  }
}

#[derive(Debug, Error)]
enum CliError {
  #[error(transparent)]
  Tree(#[from] merkle_tree::Error),
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("hex error: {0}")]
  Hex(#[from] hex::FromHexError),
}

type CliResult<T> = std::result::Result<T, CliError>;

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match run(cli.command) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      error!("{e}");
      ExitCode::from(2)
    }
  }
}

fn run(command: Command) -> CliResult<bool> {
  let mut out = stdout().lock();
  match command {
    Command::Build { options, hashed, output, input } => {
      let text = match input {
        Some(path) => read_to_string(path)?,
        None => {
          let mut text = String::new();
          stdin().read_to_string(&mut text)?;
          text
        }
      };
      build(options.into(), hashed, &text, output.as_deref(), &mut out)
    }
    Command::Proof { tree, leaf } => proof(&tree, &leaf, &mut out),
    Command::Verify { tree, leaf, root, proof, rebuild } => verify(&tree, &leaf, &root, &proof, rebuild, &mut out),
  }
}

fn build<W: Write>(options: TreeOptions, hashed: bool, text: &str, output: Option<&Path>, out: &mut W) -> CliResult<bool> {
  let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
  let items = if hashed {
    lines
      .filter_map(|line| match hex::decode(line) {
        Ok(hash) => Some(hash),
        Err(e) => {
          warn!("skipping {line:?}: {e}");
          None
        }
      })
      .collect::<Vec<_>>()
  } else {
    lines.map(|line| line.as_bytes().to_vec()).collect::<Vec<_>>()
  };

  let mut tree = Tree::new(options)?;
  let proofs = tree.add_leaves(!hashed, &items)?;
  let root = tree.root_hash()?;
  info!("built tree of {} leaves, depth {}", tree.size(), tree.depth()?);

  writeln!(out, "{root}")?;
  for (leaf, proof) in tree.leaves().iter().zip(proofs.iter()) {
    writeln!(out, "{} {proof}", hex::encode(leaf))?;
  }
  if let Some(path) = output {
    write(path, tree.to_json()?)?;
    info!("snapshot written to {}", path.display());
  }
  Ok(true)
}

fn proof<W: Write>(tree: &Path, leaf: &str, out: &mut W) -> CliResult<bool> {
  let tree = load(tree)?;
  match tree.get_proof(&hex::decode(leaf)?) {
    Some(proof) => {
      writeln!(out, "{proof}")?;
      Ok(true)
    }
    None => {
      warn!("leaf not found: {leaf}");
      Ok(false)
    }
  }
}

fn verify<W: Write>(tree: &Path, leaf: &str, root: &str, proof: &str, rebuild: bool, out: &mut W) -> CliResult<bool> {
  let tree = load(tree)?;
  let proof = proof.parse::<Proof>()?;
  let valid = tree.validate_proof(&proof, &hex::decode(leaf)?, root, rebuild);
  writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
  Ok(valid)
}

fn load(path: &Path) -> CliResult<Tree> {
  Ok(Tree::from_json(&read_to_string(path)?)?)
}
