#![allow(missing_docs, reason = "Unnecessary for benchmarks")]
#![allow(unused_results, reason = "Unnecessary for benchmarks")]
#![allow(clippy::missing_assert_message, reason = "Unnecessary for benchmarks")]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use galdyn_core::prelude::*;
use nalgebra::Vector3;
use pprof::criterion::{Output, PProfProfiler};
use std::hint::black_box;

fn gradient_bench(potential: &dyn Potential, q: &Vector3<f64>) {
    assert!(potential.gradient(q, 0.0).norm().is_finite());
}

fn hessian_bench(potential: &dyn Potential, q: &Vector3<f64>) {
    assert!(potential.hessian(q, 0.0).trace().is_finite());
}

#[allow(clippy::missing_panics_doc, reason = "Benchmarking only")]
pub fn gradient_benchmark(c: &mut Criterion) {
    let mut gradient_group = c.benchmark_group("Gradient");
    let units = UnitSystem::galactic();
    let q = Vector3::new(8.0, 1.0, 0.5);

    let hernquist = HernquistPotential::new(1e12, 1.0, units);
    let disk = MiyamotoNagaiPotential::new(6.8e10, 3.0, 0.28, units);
    let mw = milky_way_potential();

    gradient_group.bench_function(BenchmarkId::new("gradient", "Hernquist"), |b| {
        b.iter(|| gradient_bench(black_box(&hernquist), black_box(&q)));
    });
    gradient_group.bench_function(BenchmarkId::new("gradient", "Miyamoto-Nagai"), |b| {
        b.iter(|| gradient_bench(black_box(&disk), black_box(&q)));
    });
    gradient_group.bench_function(BenchmarkId::new("gradient", "Milky Way"), |b| {
        b.iter(|| gradient_bench(black_box(&mw), black_box(&q)));
    });
    gradient_group.bench_function(BenchmarkId::new("hessian", "Milky Way"), |b| {
        b.iter(|| hessian_bench(black_box(&mw), black_box(&q)));
    });
}

#[allow(clippy::missing_panics_doc, reason = "Benchmarking only")]
pub fn batch_benchmark(c: &mut Criterion) {
    let mut batch_group = c.benchmark_group("Batch");
    let mw = milky_way_potential();

    for n in [100_usize, 10_000] {
        let q: Vec<_> = (0..n)
            .map(|idx| Vector3::new(1.0 + idx as f64 * 1e-3, 0.5, 0.1))
            .collect();
        batch_group.bench_with_input(BenchmarkId::new("energy", n), &q, |b, q| {
            b.iter(|| mw.potential_energy_batch(black_box(q), &[0.0]).unwrap());
        });
        batch_group.bench_with_input(BenchmarkId::new("acceleration", n), &q, |b, q| {
            b.iter(|| mw.acceleration_batch(black_box(q), &[0.0]).unwrap());
        });
    }
}

criterion_group!(name=potential;
                config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
                targets=gradient_benchmark, batch_benchmark);
criterion_main!(potential);
