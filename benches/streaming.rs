use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use streaming_merkle::hashtree::HashTree as _;
use streaming_merkle::hashtree::event::NoEvents;
use streaming_merkle::hashtree::streaming::StreamingHashTree;
use streaming_merkle::{Blake3, HashFunction, Sha256, splitmix64};

fn tree_of<H: HashFunction>(n: u64) -> StreamingHashTree<H, NoEvents> {
  let mut tree = StreamingHashTree::new();
  for i in 0..n {
    tree.append(splitmix64(i).to_le_bytes().to_vec()).unwrap();
  }
  tree
}

fn bench_append(c: &mut Criterion) {
  let mut group = c.benchmark_group("streaming-append");
  group.bench_function(Blake3::NAME, |b| {
    let mut tree = StreamingHashTree::<Blake3, NoEvents>::new();
    let mut i = 0u64;
    b.iter(|| {
      tree.append(splitmix64(i).to_le_bytes().to_vec()).unwrap();
      i += 1;
    })
  });
  group.bench_function(Sha256::NAME, |b| {
    let mut tree = StreamingHashTree::<Sha256, NoEvents>::new();
    let mut i = 0u64;
    b.iter(|| {
      tree.append(splitmix64(i).to_le_bytes().to_vec()).unwrap();
      i += 1;
    })
  });
  group.finish();
}

fn bench_proof(c: &mut Criterion) {
  let mut group = c.benchmark_group("streaming-proof");
  for height in [10u32, 16, 20] {
    let n = (1u64 << height) - 1;
    let tree = tree_of::<Blake3>(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
      let mut i = 0u64;
      b.iter(|| {
        let leaf = tree.leaf(splitmix64(i) % n).unwrap();
        i += 1;
        black_box(tree.generate_proof(leaf).unwrap())
      })
    });
  }
  group.finish();
}

criterion_group!(benches, bench_append, bench_proof);
criterion_main!(benches);
