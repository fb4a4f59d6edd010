use chrono::Local;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Instant;
use streaming_merkle::hashtree::HashTree;
use streaming_merkle::hashtree::event::NoEvents;
use streaming_merkle::hashtree::streaming::StreamingHashTree;
use streaming_merkle::{Blake3, HashFunction, Result, Sha256, splitmix64};
use tracing_subscriber::EnvFilter;

mod stat;

#[derive(Parser)]
#[command(name = "merkle-bench")]
#[command(about = "Measure append and proof latency of the streaming Merkle accumulator")]
struct Args {
  /// Output directory for benchmark reports
  #[arg(index = 1, default_value = ".")]
  dir: PathBuf,

  /// Largest number of leaves to measure
  #[arg(long, default_value_t = 1024 * 1024)]
  max_n: u64,

  /// Number of evenly spaced tree sizes between 0 and max-n
  #[arg(long, default_value_t = 8)]
  div: u64,

  /// Repetitions for each tree size
  #[arg(long, default_value_t = 10)]
  loops: usize,

  /// Proofs generated per repetition
  #[arg(long, default_value_t = 1000)]
  proofs: usize,

  /// Hash function used for leaves and internal nodes
  #[arg(long, value_enum, default_value_t = HashKind::Blake3)]
  hash: HashKind,

  /// Seed for choosing the leaves to prove
  #[arg(long, default_value_t = 0)]
  seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashKind {
  Blake3,
  Sha256,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
  let args = Args::parse();

  let id = Local::now().format("%Y%m%d%H%M%S").to_string();

  create_dir_all(&args.dir)?;
  println!("Working directory: {:?}", &args.dir);

  match args.hash {
    HashKind::Blake3 => run::<Blake3>(&args, &id),
    HashKind::Sha256 => run::<Sha256>(&args, &id),
  }
}

fn run<H: HashFunction>(args: &Args, id: &str) -> Result<()> {
  let step = (args.max_n / args.div.max(1)).max(1);
  let sizes = (step..=args.max_n).step_by(step as usize).collect::<Vec<_>>();
  tracing::info!(hash = H::NAME, points = sizes.len(), loops = args.loops, "starting series");
  run_append::<H>(args, id, &sizes)?;
  run_proof::<H>(args, id, &sizes)?;
  Ok(())
}

fn build<H: HashFunction>(n: u64) -> Result<StreamingHashTree<H, NoEvents>> {
  let mut tree = StreamingHashTree::new();
  for i in 0..n {
    tree.append(splitmix64(i).to_le_bytes().to_vec())?;
  }
  Ok(tree)
}

fn run_append<H: HashFunction>(args: &Args, id: &str, sizes: &[u64]) -> Result<()> {
  println!("[streaming::append::{}]", H::NAME);
  let mut report = stat::Report::new();
  for &n in sizes {
    let mut nodes = 0;
    for _ in 0..args.loops {
      let t0 = Instant::now();
      let tree = build::<H>(n)?;
      let t1 = Instant::now();

      nodes = tree.node_count();
      report.add(n, t1 - t0, n as usize);
    }
    if let Some(s) = report.single(n) {
      println!("  n={n}: {s}; {nodes} nodes");
    }
  }

  save(&report, &args.dir, &format!("{id}-{}-append.csv", H::NAME))
}

fn run_proof<H: HashFunction>(args: &Args, id: &str, sizes: &[u64]) -> Result<()> {
  println!("[streaming::proof::{}]", H::NAME);
  let mut rng = StdRng::seed_from_u64(args.seed);
  let mut report = stat::Report::new();
  for &n in sizes {
    let tree = build::<H>(n)?;
    let mut depth = 0;
    for _ in 0..args.loops {
      let leaves = (0..args.proofs).filter_map(|_| tree.leaf(rng.random_range(0..n))).collect::<Vec<_>>();

      let t0 = Instant::now();
      for leaf in &leaves {
        depth = depth.max(tree.generate_proof(*leaf)?.depth());
      }
      let t1 = Instant::now();

      report.add(n, t1 - t0, leaves.len());
    }
    if let Some(s) = report.single(n) {
      println!("  n={n}: {s}; depth <= {depth}; root {}", tree.root_hash()?);
    }
  }

  save(&report, &args.dir, &format!("{id}-{}-proof.csv", H::NAME))
}

fn save(report: &stat::Report, dir: &Path, name: &str) -> Result<()> {
  let path = dir.join(name);
  report.save_to_csv(&path)?;
  println!("==> {}", path.to_string_lossy());
  Ok(())
}
