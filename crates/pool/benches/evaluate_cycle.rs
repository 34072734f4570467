//! Per-cycle overhead of `Pool::evaluate` across a few worker counts.
//!
//! The job itself does negligible work (one atomic increment) so the
//! benchmark is dominated by the handoff protocol's own cost: one
//! mutex/condvar round trip per worker per cycle.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pthreader_pool::{ClosureJob, Pool};
use std::sync::atomic::{AtomicI64, Ordering};

fn make_pool(workers: usize) -> Pool<impl pthreader_pool::PoolJob<State = (), Input = AtomicI64, Output = ()>> {
    let job = ClosureJob::new(
        |_index, _total| (),
        |_index, _state, input: &AtomicI64, _output: &()| {
            input.fetch_add(1, Ordering::Relaxed);
            0
        },
        |_index, _state| (),
    );
    let mut pool = Pool::new(workers, job).expect("workers >= 1");
    pool.launch();
    pool
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_cycle");
    for &workers in &[1usize, 2, 4, 8] {
        let mut pool = make_pool(workers);
        let counter = AtomicI64::new(0);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                pool.evaluate(&counter, &());
            });
        });
        pool.close().expect("no worker panicked");
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
