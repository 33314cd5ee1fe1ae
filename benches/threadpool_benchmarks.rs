use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::{hint::black_box, sync::Arc};
use task_dispatch::{bind, pool::Config as PoolConfig, TaskPool};

fn started(config: PoolConfig) -> TaskPool {
    let pool = TaskPool::with_config(config);
    pool.start().unwrap();
    pool
}

// Benchmark 1: dispatch + wait overhead
fn bench_dispatch_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_overhead");
    let pool = started(PoolConfig::cpu_bound());

    for size in [100usize, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("dispatch", size), &size, |b, &size| {
            b.iter(|| {
                let handles: Vec<_> = (0..size)
                    .map(|i| pool.dispatch(|i: usize| black_box(i), (i,)))
                    .collect();
                for handle in handles {
                    black_box(handle.wait().unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("dispatch_callback", size), &size, |b, &size| {
            b.iter(|| {
                let handles: Vec<_> = (0..size)
                    .map(|i| {
                        pool.dispatch_callback(
                            |i: usize| i + 1,
                            |v: usize| {
                                black_box(v);
                            },
                            (i,),
                        )
                    })
                    .collect();
                for handle in handles {
                    handle.wait().unwrap();
                }
            });
        });
    }

    group.finish();
}

struct Adder {
    base: u64,
}

impl Adder {
    fn add(&self, x: u64) -> u64 {
        self.base + x
    }
}

// Benchmark 2: free function vs bound instance
fn bench_invocation_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("invocation_shapes");
    let pool = started(PoolConfig::cpu_bound());
    let adder = Arc::new(Adder { base: 1 });

    group.bench_function("free", |b| {
        b.iter(|| pool.dispatch(|x: u64| x + 1, (black_box(41),)).wait().unwrap());
    });

    group.bench_function("bound", |b| {
        b.iter(|| {
            pool.dispatch(bind(adder.clone(), Adder::add), (black_box(41),))
                .wait()
                .unwrap()
        });
    });

    group.finish();
}

// Benchmark 3: scaling with worker count
fn bench_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");

    for workers in [1, 2, 4, 8] {
        let pool = started(PoolConfig::default().num_threads(workers));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let handles: Vec<_> = (0..1000u64)
                    .map(|n| pool.dispatch(|n: u64| (0..n % 64).sum::<u64>(), (n,)))
                    .collect();
                for handle in handles {
                    black_box(handle.wait().unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_dispatch_overhead,
    bench_invocation_shapes,
    bench_worker_scaling
);
criterion_main!(benches);
