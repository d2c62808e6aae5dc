//! Criterion benchmarks for the windowing hot path.
//!
//! Uses an in-memory synthetic trace so no disk I/O is measured.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cs_core::aggregate::stack_windows;
use cs_core::synth::generate_sequence;
use cs_core::window::WindowingEngine;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_cut_windows(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("windowing");

    for minutes in [1usize, 10] {
        let data = match generate_sequence(minutes as f64 * 60.0, 50.0, &mut rng) {
            Ok(data) => data,
            Err(e) => panic!("synthetic trace: {e}"),
        };
        let engine = WindowingEngine::new(100, 50, "unused");
        group.bench_with_input(BenchmarkId::new("cut", minutes), &data, |b, data| {
            b.iter(|| black_box(engine.cut(black_box(data.view()), 0)))
        });

        let windows: Vec<_> = engine.cut(data.view(), 0).into_iter().map(|w| w.data).collect();
        group.bench_with_input(BenchmarkId::new("stack", minutes), &windows, |b, windows| {
            b.iter(|| black_box(stack_windows(black_box(windows))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cut_windows);
criterion_main!(benches);
