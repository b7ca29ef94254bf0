//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::config::DispatchConfig;
use dispatch_core::drivers::{Driver, DriverDirectory, REFERENCE_CENTER};
use dispatch_core::scenario::ScenarioParams;
use dispatch_core::test_helpers::{reference_dropoff, reference_pickup};
use dispatch_core::RideSimulation;

fn grid_roster(count: u32) -> Vec<Driver> {
    (0..count)
        .map(|i| {
            let dlat = f64::from(i % 40) * 0.002 - 0.04;
            let dlon = f64::from(i / 40) * 0.002 - 0.04;
            let position = REFERENCE_CENTER.offset(dlat, dlon);
            Driver::new(i + 1, format!("Driver {i}"), "Spark", position)
        })
        .collect()
}

fn bench_driver_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_ranking");
    for count in [4u32, 100, 1000] {
        let directory = DriverDirectory::new(grid_roster(count)).expect("directory");
        group.bench_with_input(BenchmarkId::new("nearest", count), &directory, |b, dir| {
            b.iter(|| black_box(dir.nearest(black_box(reference_pickup()))));
        });
        group.bench_with_input(BenchmarkId::new("ranked", count), &directory, |b, dir| {
            b.iter(|| black_box(dir.ranked_by_distance(black_box(reference_pickup()))));
        });
    }
    group.finish();
}

fn bench_full_ride(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_ride");
    for (name, config) in [
        ("quiet", DispatchConfig::default().without_jitter_timer()),
        ("jitter_every_minute", DispatchConfig::default().with_jitter(0.0015, Some(1.0))),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let params = ScenarioParams::default().with_config(config).with_seed(42);
                let mut sim = RideSimulation::new(params).expect("simulation");
                sim.set_pickup(reference_pickup());
                sim.set_dropoff(reference_dropoff());
                sim.request_ride().expect("request");
                black_box(sim.run_until_idle(10_000));
                black_box(sim.drain_updates())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_driver_ranking, bench_full_ride);
criterion_main!(benches);
