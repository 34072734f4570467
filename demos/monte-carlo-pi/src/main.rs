//! Partitioned Monte Carlo estimate of pi.
//!
//! Each worker owns a private random generator set up once at launch, the
//! trial count for one evaluate cycle is split across workers with the
//! source's own remainder formula (`R = T % N; B = (T - R) / N`, first `R`
//! workers get one extra trial), and the controller doubles the trial
//! count each cycle until two successive pi estimates agree to within a
//! tolerance -- the same convergence loop the source uses for its
//! collision probability experiment.
//!
//! Usage: `monte-carlo-pi <workers> <initial-trials>`

use pthreader_pool::{ClosureJob, Pool};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-worker state: a private RNG, seeded from the worker's own index so
/// no two workers ever draw the same stream.
struct WorkerState {
    rng: SmallRng,
}

/// This cycle's total trial count, shared (read-only) across all workers.
struct Trials(usize);

/// One hit counter per worker, written only by that worker.
struct Hits(Vec<AtomicU64>);

fn block_size(total_trials: usize, total_workers: usize, index: usize) -> usize {
    let remainder = total_trials % total_workers;
    let base = (total_trials - remainder) / total_workers;
    base + if index < remainder { 1 } else { 0 }
}

fn run_trials(rng: &mut SmallRng, count: usize) -> u64 {
    let mut hits = 0u64;
    for _ in 0..count {
        let x: f64 = rng.gen_range(-1.0..1.0);
        let y: f64 = rng.gen_range(-1.0..1.0);
        if x * x + y * y <= 1.0 {
            hits += 1;
        }
    }
    hits
}

fn main() {
    let mut args = std::env::args().skip(1);
    let workers: usize = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    let initial_trials: usize = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);

    let job = ClosureJob::new(
        |index, _total| WorkerState {
            rng: SmallRng::seed_from_u64(0xC0FFEE ^ index as u64),
        },
        |index, state: &mut WorkerState, trials: &Trials, hits: &Hits| {
            let share = block_size(trials.0, hits.0.len(), index);
            let count = run_trials(&mut state.rng, share);
            hits.0[index].store(count, Ordering::Relaxed);
            0
        },
        |_index, _state| {},
    );

    let mut pool = Pool::new(workers, job).expect("workers >= 1");
    pool.be_verbose();
    pool.launch();
    pool.be_quiet();

    let mut total_trials = initial_trials.max(workers);
    let hits = Hits((0..workers).map(|_| AtomicU64::new(0)).collect());

    let mut estimate = 0.0_f64;
    let mut previous = f64::INFINITY;

    while (previous - estimate).abs() > 1.0e-4 {
        previous = estimate;

        pool.evaluate(&Trials(total_trials), &hits);

        let total_hits: u64 = hits.0.iter().map(|h| h.load(Ordering::Relaxed)).sum();
        estimate = 4.0 * (total_hits as f64) / (total_trials as f64);

        println!(
            "+ trials: {:>10}  pi estimate: {:.6}  (std: {:.6})",
            total_trials,
            estimate,
            std::f64::consts::PI
        );

        total_trials *= 2;
    }

    println!("converged pi estimate: {:.6}", estimate);

    pool.close().expect("no worker panicked");
}
