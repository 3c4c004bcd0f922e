//! Criterion benchmarks for the sweep.
//!
//! Run with: `cargo bench -p sweeplab-runner`
//!
//! Measures the per-window pipeline on its own and the full default sweep at
//! several worker counts.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sweeplab_core::domain::PriceSeries;
use sweeplab_core::synthetic::RandomWalk;
use sweeplab_runner::config::SweepConfig;
use sweeplab_runner::events::NullSink;
use sweeplab_runner::runner::run_window;
use sweeplab_runner::sweep::run_sweep;

fn bench_series(n: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2005, 1, 3).unwrap();
    RandomWalk::new(7).series("BENCH", start, n).unwrap()
}

fn bench_window(c: &mut Criterion) {
    let series = bench_series(2_520);
    let plan = SweepConfig::default().plan().unwrap();
    let mut group = c.benchmark_group("run_window");

    for window in [2usize, 14, 30] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| run_window(black_box(&series), w, &plan).unwrap());
        });
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let series = bench_series(2_520);
    let mut group = c.benchmark_group("sweep_default_range");
    group.sample_size(20);

    for workers in [1usize, 2, 4] {
        let plan = SweepConfig {
            workers,
            ..SweepConfig::default()
        }
        .plan()
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &plan, |b, plan| {
            b.iter(|| run_sweep(black_box(&series), plan, &NullSink).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_window, bench_sweep);
criterion_main!(benches);
