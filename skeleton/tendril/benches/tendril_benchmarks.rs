//! Benchmarks for tendril sweeping.
//!
//! Run with: cargo bench -p tendril

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_types::{Point3, unit_sphere};
use tendril::{Tendril, TendrilConfig};

// =============================================================================
// Branch Generation
// =============================================================================

/// A helical branch with `samples` nodes tapering from 2.0 to 0.5.
#[allow(clippy::cast_precision_loss)]
fn helix(samples: usize, length: f64) -> (Vec<Point3<f64>>, Vec<f64>) {
    let last = (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let s = i as f64 / last;
            let angle = s * 4.0 * std::f64::consts::PI;
            let p = Point3::new(5.0 * angle.cos(), 5.0 * angle.sin(), s * length);
            (p, 2.0 - 1.5 * s)
        })
        .unzip()
}

// =============================================================================
// Sweep Benchmarks
// =============================================================================

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fit");

    for samples in [10, 100, 1000] {
        let (points, radii) = helix(samples, 200.0);
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(
            BenchmarkId::new("splines", samples),
            &(points, radii),
            |b, (points, radii)| {
                b.iter(|| Tendril::new(black_box(points), black_box(radii)));
            },
        );
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep");
    group.sample_size(20);

    let cap = unit_sphere(2);
    let config = TendrilConfig::default();

    for length in [50.0, 200.0, 800.0] {
        let (points, radii) = helix(50, length);
        let Ok(tendril) = Tendril::new(&points, &radii) else {
            continue;
        };
        let label = format!("{length}um");
        group.bench_with_input(BenchmarkId::new("mesh", label), &tendril, |b, tendril| {
            b.iter(|| tendril.mesh(black_box(&cap), black_box(&config)));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_fit, bench_sweep);
criterion_main!(benches);
