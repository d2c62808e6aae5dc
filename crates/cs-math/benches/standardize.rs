//! Criterion benchmarks for per-window standardization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cs_math::standardize_columns;
use ndarray::Array2;

fn bench_standardize(c: &mut Criterion) {
    // 100 x 9 matches the default window of the synthetic sensor set.
    let base = Array2::from_shape_fn((100, 9), |(i, j)| ((i * 31 + j * 7) % 17) as f32 * 0.25);

    let mut group = c.benchmark_group("standardize");
    group.bench_function("window_100x9", |b| {
        b.iter(|| {
            let mut w = base.clone();
            standardize_columns(black_box(&mut w));
            black_box(w[[0, 0]]);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_standardize);
criterion_main!(benches);
