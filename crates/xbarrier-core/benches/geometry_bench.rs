//! Criterion benchmarks for the barrier geometry calculator.
//!
//! Every layout change recomputes the barriers of every monitor, so this
//! measures one full pass over layouts of increasing size.
//!
//! Run with:
//! ```bash
//! cargo bench --package xbarrier-core --bench geometry_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xbarrier_core::{compute_barriers, Insets, MonitorRegion};

/// Monitors of 1920×1080 laid out left to right.
fn row_of_monitors(n: usize) -> Vec<MonitorRegion> {
    (0..n)
        .map(|i| MonitorRegion::new(1920 * i as i32, 0, 1920, 1080))
        .collect()
}

fn bench_compute_barriers(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_barriers");
    let insets = Insets::new(30, 0, 0, 48).expect("valid insets");

    for n in [1usize, 2, 4, 8] {
        let monitors = row_of_monitors(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &monitors, |b, monitors| {
            b.iter(|| {
                for monitor in monitors {
                    black_box(compute_barriers(black_box(monitor), &insets));
                }
            });
        });
    }

    group.finish();
}

fn bench_zero_insets(c: &mut Criterion) {
    let monitor = MonitorRegion::new(0, 0, 3840, 2160);
    c.bench_function("compute_barriers_zero_insets", |b| {
        b.iter(|| compute_barriers(black_box(&monitor), black_box(&Insets::ZERO)));
    });
}

criterion_group!(benches, bench_compute_barriers, bench_zero_insets);
criterion_main!(benches);
