//! Partitioned sum-of-squared-residuals / gradient evaluation.
//!
//! `pt_ols.cpp` supplies the value-only evaluation and row partitioning;
//! `pt_ols_gsl.cpp` adds a value/gradient discriminant needed to drive a
//! gradient-based optimizer. That discriminant is
//! `switch( eval->type == 0 )`, which only ever matches `case 0` or
//! `case 1` and can never reach `case 2` ("f and df") -- a boolean can't
//! equal 2. This demo replaces it with a proper three-way enum so all
//! three evaluation kinds are actually reachable.
//!
//! Observation rows are split across workers with the source's own
//! remainder formula (`R = Nobsv % N; B = (Nobsv - R) / N`, first `R`
//! workers get one extra row). Driving the residual to a minimum with an
//! external optimizer (the source uses GSL's multimin) is out of scope
//! here; this demo reports one evaluation's aggregate value and gradient.
//!
//! Usage: `least-squares-residual <workers> <observations> <features> <with-constant 0|1>`

use pthreader_pool::{ClosureJob, Pool};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// Which quantities one evaluate cycle should compute.
///
/// A proper discriminant, unlike the source's `type == 0` boolean
/// comparison -- see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalKind {
    ValueOnly,
    GradientOnly,
    ValueAndGradient,
}

/// This cycle's evaluation point and the quantities requested there.
struct EvalInput {
    kind: EvalKind,
    x: Vec<f64>,
}

/// Per-worker partial value and gradient, written only by the owning
/// worker. `f64` has no native atomic type, so each slot is stored as the
/// bit pattern of an `AtomicU64` -- the same pattern a lock-free
/// accumulator would use, and cheaper here than a per-slot mutex.
struct EvalOutput {
    /// Partial sum-of-squared-residuals, one slot per worker.
    s: Vec<AtomicU64>,
    /// Partial gradient, `workers * nvars` slots, worker `n`'s block at
    /// `[n * nvars .. (n + 1) * nvars)`.
    g: Vec<AtomicU64>,
}

impl EvalOutput {
    fn new(workers: usize, nvars: usize) -> Self {
        Self {
            s: (0..workers).map(|_| AtomicU64::new(0)).collect(),
            g: (0..workers * nvars).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn store_value(&self, worker: usize, value: f64) {
        self.s[worker].store(value.to_bits(), Ordering::Relaxed);
    }

    fn store_gradient(&self, worker: usize, nvars: usize, partial: &[f64]) {
        let base = worker * nvars;
        for (offset, &g) in partial.iter().enumerate() {
            self.g[base + offset].store(g.to_bits(), Ordering::Relaxed);
        }
    }

    fn value(&self, worker: usize) -> f64 {
        f64::from_bits(self.s[worker].load(Ordering::Relaxed))
    }

    fn gradient(&self, worker: usize, nvars: usize) -> Vec<f64> {
        let base = worker * nvars;
        (0..nvars)
            .map(|j| f64::from_bits(self.g[base + j].load(Ordering::Relaxed)))
            .collect()
    }
}

/// Per-worker design matrix slice, generated once at launch.
struct WorkerData {
    nobsv: usize,
    nvars: usize,
    /// Row-major `nobsv x nvars`.
    d: Vec<f64>,
    y: Vec<f64>,
    /// Scratch residual buffer, reused across evaluate cycles.
    r: Vec<f64>,
}

fn block_size(total_rows: usize, total_workers: usize, index: usize) -> usize {
    let remainder = total_rows % total_workers;
    let base = (total_rows - remainder) / total_workers;
    base + if index < remainder { 1 } else { 0 }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let workers: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(4);
    let observations: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(4_000);
    let features: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(8);
    let with_constant: bool = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .map(|v| v != 0)
        .unwrap_or(true);

    assert!(workers >= 2, "least-squares-residual expects at least two workers");
    assert!(
        observations > workers,
        "least-squares-residual expects at least as many observations as workers"
    );
    assert!(features > 0, "least-squares-residual expects a positive number of features");

    let nvars = features + if with_constant { 1 } else { 0 };

    let mut seed_rng = SmallRng::seed_from_u64(0xBADC0FFEE);
    let true_coefficients: Vec<f64> = (0..nvars).map(|_| seed_rng.gen_range(-1.0..1.0)).collect();

    let job = ClosureJob::new(
        move |index, total| {
            let mut rng = SmallRng::seed_from_u64(0x5EED ^ index as u64);
            let nobsv = block_size(observations, total, index);

            let mut d = vec![0.0; nobsv * nvars];
            let mut y = vec![0.0; nobsv];
            for row in 0..nobsv {
                let mut yi = 0.0;
                for col in 0..nvars {
                    let value = if with_constant && col == features {
                        1.0
                    } else {
                        rng.gen_range(-1.0..1.0)
                    };
                    d[row * nvars + col] = value;
                    yi += value * true_coefficients[col];
                }
                y[row] = yi;
            }

            WorkerData {
                nobsv,
                nvars,
                d,
                y,
                r: vec![0.0; nobsv],
            }
        },
        |index, state: &mut WorkerData, input: &EvalInput, output: &EvalOutput| {
            for row in 0..state.nobsv {
                let mut ri = -state.y[row];
                for col in 0..state.nvars {
                    ri += state.d[row * state.nvars + col] * input.x[col];
                }
                state.r[row] = ri;
            }

            match input.kind {
                EvalKind::ValueOnly | EvalKind::ValueAndGradient => {
                    let mut s = 0.0;
                    for &ri in &state.r {
                        s += ri * ri;
                    }
                    output.store_value(index, s / 2.0);
                }
                EvalKind::GradientOnly => {}
            }

            match input.kind {
                EvalKind::GradientOnly | EvalKind::ValueAndGradient => {
                    let mut partial = vec![0.0; state.nvars];
                    for col in 0..state.nvars {
                        let mut g = 0.0;
                        for row in 0..state.nobsv {
                            g += state.d[row * state.nvars + col] * state.r[row];
                        }
                        partial[col] = g;
                    }
                    output.store_gradient(index, state.nvars, &partial);
                }
                EvalKind::ValueOnly => {}
            }

            0
        },
        |_index, _state| {},
    );

    let mut pool = Pool::new(workers, job).expect("workers >= 1");
    pool.be_verbose();
    pool.launch();
    pool.be_quiet();

    let mut eval_rng = SmallRng::seed_from_u64(0x7EA1);
    let output = EvalOutput::new(workers, nvars);

    for iteration in 0..10 {
        let x: Vec<f64> = (0..nvars).map(|_| eval_rng.gen_range(-1.0..1.0)).collect();
        let input = EvalInput {
            kind: EvalKind::ValueOnly,
            x,
        };

        pool.evaluate(&input, &output);

        let total: f64 = (0..workers).map(|n| output.value(n)).sum::<f64>() / (observations as f64);
        println!("iteration {:>2}: sum-of-squared-residuals/N = {:.6}", iteration, total);
    }

    let gradient_x: Vec<f64> = (0..nvars).map(|_| eval_rng.gen_range(-1.0..1.0)).collect();
    let gradient_input = EvalInput {
        kind: EvalKind::ValueAndGradient,
        x: gradient_x,
    };
    pool.evaluate(&gradient_input, &output);

    let mut gradient = vec![0.0; nvars];
    for worker in 0..workers {
        for (slot, g) in gradient.iter_mut().zip(output.gradient(worker, nvars)) {
            *slot += g;
        }
    }
    let norm: f64 = gradient.iter().map(|g| g * g).sum::<f64>().sqrt();
    println!("value+gradient cycle: |grad| = {:.6}", norm);

    pool.close().expect("no worker panicked");
}
