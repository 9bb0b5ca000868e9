use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sawlink_core::sim::{SimulationConfig, Simulator};

fn bench_clean_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_clean");

    for relays in [0, 2, 4] {
        let config = SimulationConfig {
            relays,
            messages: 200,
            ..Default::default()
        };

        group.throughput(Throughput::Elements(config.messages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(relays), &config, |b, cfg| {
            b.iter(|| Simulator::new(cfg.clone()).unwrap().run().unwrap());
        });
    }

    group.finish();
}

fn bench_lossy_chain(c: &mut Criterion) {
    let config = SimulationConfig {
        relays: 1,
        messages: 200,
        loss: 0.1,
        corruption: 0.05,
        seed: 7,
        ..Default::default()
    };

    c.bench_function("simulate_lossy_relay", |b| {
        b.iter(|| Simulator::new(config.clone()).unwrap().run().unwrap());
    });
}

criterion_group!(benches, bench_clean_chain, bench_lossy_chain);
criterion_main!(benches);
