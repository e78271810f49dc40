#[macro_use]
extern crate criterion;

use bisect_hash::Hash;
use bisect_history::{History, compute_root, generate_prefix_proof};
use criterion::{BenchmarkId, Criterion};

fn leaves(count: u64) -> Vec<Hash> {
    (0..count)
        .map(|i| bisect_hash::hash_bytes(&i.to_be_bytes()))
        .collect()
}

fn bench(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("virtual root");
        // A handful of real leaves padded out to large virtual sizes; the
        // filler table keeps this logarithmic in the virtual size.
        let lv = leaves(1 << 10);
        for virtual_size in [1u64 << 10, 1 << 14, 1 << 20, 1 << 26] {
            group.bench_with_input(
                BenchmarkId::new("virtual", virtual_size),
                &virtual_size,
                |b, &size| {
                    b.iter(|| compute_root(&lv, size).expect("compute root"));
                },
            );
        }
    }

    c.bench_function("commitment with last-leaf proof", |b| {
        let lv = leaves(1 << 10);
        b.iter(|| History::new(&lv, 1 << 20).expect("commitment"));
    });

    c.bench_function("prefix proof generation", |b| {
        let lv = leaves(1 << 10);
        b.iter(|| generate_prefix_proof(700, &lv, 1 << 20).expect("prefix proof"));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench
);
criterion_main!(benches);
