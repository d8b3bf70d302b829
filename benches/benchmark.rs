use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_wordfreq::{count_words, BalancedTree, WordCounts};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = BalancedTree::new();
            for value in &values {
                tree.insert(*value, *value);
            }
            tree
        })
    });

    c.bench_function("tree_insert_sorted", |b| {
        b.iter(|| {
            let mut tree = BalancedTree::new();
            for value in 0..N as i32 {
                tree.insert(value, ());
            }
            tree
        })
    });

    let mut tree = BalancedTree::new();
    for value in &values {
        tree.insert(*value, *value);
    }

    c.bench_function("tree_find", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.find(value).ok());
            }
        })
    });

    c.bench_function("tree_in_order", |b| b.iter(|| black_box(tree.in_order().len())));

    let text: String = (0..N)
        .map(|_| {
            let len = rng.gen_range(1..8);
            let mut word: String = (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
            word.push(' ');
            word
        })
        .collect();

    c.bench_function("count_words", |b| {
        b.iter(|| {
            let mut counts = WordCounts::new();
            count_words(text.as_bytes(), &mut counts).unwrap();
            black_box(counts.len())
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
