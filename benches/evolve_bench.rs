//! Criterion benchmarks for the simulator and the full pipeline.
//!
//! Run with:
//! ```bash
//! cargo bench --bench evolve_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use esqet_core::{
    Analyzer, EsqetConfig, Evolution, Field, GaussianNoise, Silent, SimulationConfig, Simulator,
};

// ── helpers ─────────────────────────────────────────────────────────────────

fn ramp(side: usize) -> Field {
    Field::from_fn(side, |r, c| 0.3 + 0.4 * ((r + c) as f64 / (2 * side) as f64))
}

fn config(side: usize) -> SimulationConfig {
    SimulationConfig {
        grid_size: side,
        sink_cell: (side / 2, side / 3),
        noise_stddev: 0.01,
        ..SimulationConfig::diffusion_only()
    }
}

// ── benches ─────────────────────────────────────────────────────────────────

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    for side in [32usize, 64, 128] {
        let sim = Simulator::new(config(side)).unwrap();
        let initial = ramp(side);
        group.bench_with_input(BenchmarkId::new("silent", side), &side, |b, _| {
            b.iter(|| {
                let out: Evolution = sim.evolve(black_box(initial.clone()), Silent).unwrap();
                out
            })
        });
        group.bench_with_input(BenchmarkId::new("seeded_noise", side), &side, |b, _| {
            b.iter(|| {
                let noise = GaussianNoise::seeded(0.01, 42).unwrap();
                let out: Evolution = sim.evolve(black_box(initial.clone()), noise).unwrap();
                out
            })
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::new(EsqetConfig {
        simulation: config(32),
        ..Default::default()
    })
    .unwrap();
    c.bench_function("analyze_field_32", |b| {
        b.iter(|| analyzer.analyze_field(black_box(ramp(32)), Silent).unwrap())
    });
}

criterion_group!(benches, bench_evolve, bench_analyze);
criterion_main!(benches);
