use divan::{Bencher, black_box};
use gumnut::{
    GreedySubtreeMatcher, MatchingConfig, NodeData, SimpleTypes, Tree, compute_matching_with,
};

fn main() {
    divan::main();
}

type Types = SimpleTypes<&'static str, String>;

/// A block of `width` statements, each a call with `depth` nested arguments.
/// Every `dup_every`-th statement repeats the first one.
fn synthetic(width: usize, depth: usize, dup_every: usize, salt: usize) -> Tree<Types> {
    let mut tree: Tree<Types> = Tree::new(NodeData::new("block"));
    for i in 0..width {
        let seed = if dup_every > 0 && i % dup_every == 0 { 0 } else { i + salt };
        let mut parent = tree.add_child(tree.root, NodeData::new("call"));
        for d in 0..depth {
            parent = tree.add_child(parent, NodeData::labeled("arg", format!("a{seed}_{d}")));
        }
    }
    tree.compute_metrics();
    tree
}

fn bench_pair(bencher: Bencher, a: &Tree<Types>, b: &Tree<Types>) {
    let matcher = GreedySubtreeMatcher::new();
    let config = MatchingConfig::default();
    bencher.bench_local(|| {
        let result = compute_matching_with(&matcher, black_box(a), black_box(b), &config);
        black_box(result);
    });
}

#[divan::bench]
fn small_unique(bencher: Bencher) {
    let a = synthetic(50, 3, 0, 0);
    let b = synthetic(50, 3, 0, 7);
    bench_pair(bencher, &a, &b);
}

#[divan::bench]
fn large_unique(bencher: Bencher) {
    let a = synthetic(1000, 4, 0, 0);
    let b = synthetic(1000, 4, 0, 13);
    bench_pair(bencher, &a, &b);
}

#[divan::bench]
fn many_duplicates(bencher: Bencher) {
    let a = synthetic(300, 3, 3, 0);
    let b = synthetic(300, 3, 2, 0);
    bench_pair(bencher, &a, &b);
}
