//! Benchmarks for the price indexes and the order book.
//!
//! ## Workloads
//!
//! | Benchmark | What it measures |
//! |-----------|------------------|
//! | `insert_with_caching` | Orders spread over a fixed set of random prices; a hash cache absorbs repeats, the index only sees new levels |
//! | `sorted_insert` | Ascending keys, the worst case for the plain BST |
//! | `orderbook_random_insert` | `Orderbook::add` over 5k/10k/20k random levels |
//! | `orderbook_add_cancel` | Add then cancel against a pre-filled book |
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench -- insert_with_caching
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use std::collections::HashMap;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hft_orderbook::index::{Balance, IndexedMinHeap, OrderedIndex, RedBlack, Unbalanced};
use hft_orderbook::types::price;
use hft_orderbook::{Order, Orderbook, OrderbookConfig, Price};

// ============================================================================
// HELPER FUNCTIONS - Deterministic workload generation
// ============================================================================

/// Orders per measured batch
const BATCH: usize = 100_000;

/// Distinct level counts exercised by the level-bound workloads
const LEVEL_COUNTS: [usize; 3] = [5_000, 10_000, 20_000];

/// `count` random prices in `[0, 1)`, already converted to keys
fn random_levels(count: usize, seed: u64) -> Vec<Price> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| price::from_f64(rng.gen::<f64>()).unwrap_or(0))
        .collect()
}

/// Indices into the level list, one per order
fn random_picks(levels: usize, count: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(0..levels)).collect()
}

fn insert_with_cache<B: Balance>(levels: &[Price], picks: &[usize]) -> usize {
    let mut index: OrderedIndex<Price, usize, B> = OrderedIndex::with_capacity(levels.len());
    let mut cache: HashMap<Price, usize> = HashMap::with_capacity(levels.len());
    let mut volumes = vec![0u64; levels.len()];

    for (i, &pick) in picks.iter().enumerate() {
        let price = levels[pick];
        match cache.get(&price) {
            Some(&slot) => volumes[slot] += i as u64,
            None => {
                cache.insert(price, pick);
                index.put(price, pick);
                volumes[pick] += i as u64;
            }
        }
    }
    index.len()
}

fn insert_heap_with_cache(levels: &[Price], picks: &[usize]) -> usize {
    let mut heap = IndexedMinHeap::with_capacity(levels.len());
    let mut cache: HashMap<Price, usize> = HashMap::with_capacity(levels.len());

    for &pick in picks {
        let price = levels[pick];
        if !cache.contains_key(&price) {
            cache.insert(price, pick);
            let _ = heap.insert(pick, price);
        }
    }
    heap.len()
}

// ============================================================================
// BENCHMARK: Index insert with caching
// ============================================================================

fn bench_insert_with_caching(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_with_caching");
    group.throughput(Throughput::Elements(BATCH as u64));

    for &count in &LEVEL_COUNTS {
        let levels = random_levels(count, 42);
        let picks = random_picks(count, BATCH, 7);

        group.bench_with_input(BenchmarkId::new("red_black", count), &count, |b, _| {
            b.iter(|| insert_with_cache::<RedBlack>(black_box(&levels), black_box(&picks)))
        });
        group.bench_with_input(BenchmarkId::new("plain_bst", count), &count, |b, _| {
            b.iter(|| insert_with_cache::<Unbalanced>(black_box(&levels), black_box(&picks)))
        });
        group.bench_with_input(BenchmarkId::new("indexed_heap", count), &count, |b, _| {
            b.iter(|| insert_heap_with_cache(black_box(&levels), black_box(&picks)))
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Sorted insert (plain BST degenerates)
// ============================================================================

fn bench_sorted_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_insert");

    for &count in &[1_000u64, 4_000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("red_black", count), &count, |b, &count| {
            b.iter(|| {
                let mut index: OrderedIndex<u64, u64> = OrderedIndex::new();
                for k in 0..count {
                    index.put(k, k);
                }
                black_box(index.height())
            })
        });
        group.bench_with_input(BenchmarkId::new("plain_bst", count), &count, |b, &count| {
            b.iter(|| {
                let mut index: OrderedIndex<u64, u64, Unbalanced> = OrderedIndex::new();
                for k in 0..count {
                    index.put(k, k);
                }
                black_box(index.height())
            })
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Order book random insert
// ============================================================================

fn bench_orderbook_random_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderbook_random_insert");
    group.throughput(Throughput::Elements(BATCH as u64));

    for &count in &LEVEL_COUNTS {
        let mut rng = ChaCha8Rng::seed_from_u64(count as u64);
        let levels: Vec<f64> = (0..count).map(|_| rng.gen()).collect();
        let orders: Vec<(f64, Order)> = (0..BATCH)
            .map(|i| {
                let price = levels[rng.gen_range(0..count)];
                let volume = rng.gen::<f64>();
                let order = if price < 0.5 {
                    Order::bid(i as u64, volume)
                } else {
                    Order::ask(i as u64, volume)
                };
                (price, order)
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("levels", count), &orders, |b, orders| {
            b.iter_batched(
                || Orderbook::with_config(OrderbookConfig::new(count, BATCH)),
                |mut book: Orderbook| {
                    for &(price, order) in orders {
                        let _ = book.add(price, order);
                    }
                    book
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Order book add + cancel
// ============================================================================

fn bench_orderbook_add_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderbook_add_cancel");
    group.throughput(Throughput::Elements(1));

    let mut book = Orderbook::with_capacity(BATCH);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for i in 0..10_000u64 {
        let price = 100.0 + rng.gen_range(0..1_000) as f64 * 0.01;
        let _ = book.add(price, Order::bid(i, 1.0));
    }

    // existing level: O(1) path
    group.bench_function("existing_level", |b| {
        b.iter(|| {
            let key = book.add(black_box(100.5), Order::bid(0, 1.0)).unwrap_or_default();
            black_box(book.cancel(key).ok())
        })
    });

    // fresh level: opened and closed on every iteration
    group.bench_function("new_level", |b| {
        b.iter(|| {
            let key = book.add(black_box(250.0), Order::bid(0, 1.0)).unwrap_or_default();
            black_box(book.cancel(key).ok())
        })
    });

    group.finish();
}

// ============================================================================
// CRITERION CONFIGURATION
// ============================================================================

criterion_group!(
    benches,
    bench_insert_with_caching,
    bench_sorted_insert,
    bench_orderbook_random_insert,
    bench_orderbook_add_cancel,
);

criterion_main!(benches);
