use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use stock_avl_store::StockStore;

fn generated_symbols(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("SYM{}", i)).collect()
}

fn shuffled_symbols(count: usize) -> Vec<String> {
    let mut symbols = generated_symbols(count);
    symbols.shuffle(&mut StdRng::seed_from_u64(42));
    symbols
}

fn filled_store(symbols: &[String]) -> StockStore {
    let mut store = StockStore::new();
    for symbol in symbols {
        store.upsert_stock(symbol, 100.0, 1_000, 1_000_000);
    }
    store
}

/// Upserting new symbols, in generation order and shuffled
fn bench_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("upsert");

    for size in [1_000usize, 10_000] {
        let ordered = generated_symbols(size);
        let shuffled = shuffled_symbols(size);

        group.bench_with_input(BenchmarkId::new("generated_order", size), &ordered, |b, symbols| {
            b.iter(|| black_box(filled_store(symbols)));
        });

        group.bench_with_input(BenchmarkId::new("shuffled", size), &shuffled, |b, symbols| {
            b.iter(|| black_box(filled_store(symbols)));
        });
    }

    // Updates of existing symbols never touch the tree shape
    let symbols = generated_symbols(10_000);
    let mut store = filled_store(&symbols);
    group.bench_function("update_existing_10000", |b| {
        let mut idx = 0;
        b.iter(|| {
            let symbol = &symbols[idx % symbols.len()];
            black_box(store.upsert_stock(black_box(symbol), 101.0, 2_000, 2_000_000));
            idx += 1;
        });
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000usize, 100_000] {
        let symbols = generated_symbols(size);
        let store = filled_store(&symbols);

        group.bench_with_input(BenchmarkId::new("hit", size), &symbols, |b, symbols| {
            let mut idx = 0;
            b.iter(|| {
                let symbol = &symbols[idx % symbols.len()];
                black_box(store.find_stock(black_box(symbol)));
                idx += 1;
            });
        });

        group.bench_function(BenchmarkId::new("miss", size), |b| {
            b.iter(|| black_box(store.find_stock(black_box("ZZZZ"))));
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let symbols = generated_symbols(10_000);

    c.bench_function("remove_all_10000", |b| {
        b.iter_batched(
            || filled_store(&symbols),
            |mut store| {
                for symbol in &symbols {
                    black_box(store.remove_stock(symbol));
                }
                store
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_rename(c: &mut Criterion) {
    let symbols = generated_symbols(1_000);

    c.bench_function("rename_batch_1000", |b| {
        b.iter_batched(
            || filled_store(&symbols),
            |mut store| {
                for symbol in &symbols {
                    let target = format!("A{}", symbol);
                    black_box(store.rename_and_update(symbol, &target, 1.0, 1, 1).is_ok());
                }
                store
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_ordered_listing(c: &mut Criterion) {
    let store = filled_store(&shuffled_symbols(10_000));

    c.bench_function("traverse_10000", |b| {
        b.iter(|| black_box(store.iter().count()));
    });
}

criterion_group!(
    benches,
    bench_upsert,
    bench_search,
    bench_remove,
    bench_rename,
    bench_ordered_listing
);
criterion_main!(benches);
