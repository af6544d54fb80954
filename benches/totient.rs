use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use totient_range::engine::{Engine, Strategy};
use totient_range::range::PartitionPolicy;
use totient_range::totient;

fn bench_totient(c: &mut Criterion) {
    let mut group = c.benchmark_group("totient");
    for n in [1_000i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| totient(black_box(n)))
        });
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_totients_1_3000");
    group.sample_size(10);
    for strategy in [
        Strategy::Sequential,
        Strategy::Threads,
        Strategy::Pool,
        Strategy::MessagePassing,
    ] {
        for policy in PartitionPolicy::ALL {
            let engine = Engine::new(strategy).with_partition(policy);
            let id = BenchmarkId::new(strategy.name(), policy.name());
            group.bench_with_input(id, &engine, |b, engine| {
                b.iter(|| engine.run(1, black_box(3000), 4).map(|s| s.total))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_totient, bench_strategies);
criterion_main!(benches);
