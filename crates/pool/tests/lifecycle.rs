//! Integration tests driving the pool exactly as an external client would:
//! through the public `pthreader_pool` crate, never reaching into
//! `pool-core`/`pool-runtime` internals.

use pthreader_pool::{ClosureJob, Pool, PoolError};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

fn identity_sum_job() -> impl pthreader_pool::PoolJob<State = (), Input = AtomicI64, Output = AtomicI64> {
    ClosureJob::new(
        |_index, _total| (),
        |_index, _state, input: &AtomicI64, output: &AtomicI64| {
            output.fetch_add(input.load(Ordering::SeqCst), Ordering::SeqCst);
            0
        },
        |_index, _state| (),
    )
}

#[test]
fn identity_sum_across_workers() {
    let mut pool = Pool::new(4, identity_sum_job()).unwrap();
    pool.launch();

    let input = AtomicI64::new(7);
    let output = AtomicI64::new(0);
    let summary = pool.evaluate(&input, &output);

    assert_eq!(output.load(Ordering::SeqCst), 7 * 4);
    assert!(summary.all_zero);
    assert!(!summary.any_positive && !summary.any_negative);

    pool.close().unwrap();
}

#[test]
fn repeated_evaluates_reuse_the_same_workers() {
    let mut pool = Pool::new(3, identity_sum_job()).unwrap();
    pool.launch();

    let input = AtomicI64::new(1);
    for expected_cycle in 1..=5 {
        let output = AtomicI64::new(0);
        pool.evaluate(&input, &output);
        assert_eq!(output.load(Ordering::SeqCst), 3, "cycle {}", expected_cycle);
    }

    pool.close().unwrap();
}

#[test]
fn status_aggregation_reflects_mixed_statuses() {
    // Each worker reports status = index as i64 cast to i32, signed so
    // worker 0 is zero, worker 1 positive, and we flip the sign for one
    // worker to exercise the any_negative bit too.
    let job = ClosureJob::new(
        |_index, _total| (),
        |index, _state, _input: &(), _output: &()| {
            if index == 0 {
                0
            } else if index % 2 == 0 {
                -1
            } else {
                1
            }
        },
        |_index, _state| (),
    );

    let mut pool = Pool::new(4, job).unwrap();
    pool.launch();
    let summary = pool.evaluate(&(), &());

    assert!(summary.any_zero);
    assert!(summary.any_positive);
    assert!(summary.any_negative);
    assert!(!summary.all_zero);
    assert!(!summary.all_positive);
    assert!(!summary.all_negative);

    pool.close().unwrap();
}

#[test]
fn partitioned_block_sizes_match_remainder_splitting_formula() {
    // Mirrors the source's R = T % N; B = (T - R) / N partitioning: the
    // first R workers get one extra unit of work.
    fn block_size(total: usize, workers: usize, index: usize) -> usize {
        let remainder = total % workers;
        let base = (total - remainder) / workers;
        base + if index < remainder { 1 } else { 0 }
    }

    let job = ClosureJob::new(
        move |index, total| block_size(17, total, index),
        |_index, state: &mut usize, _input: &(), output: &AtomicUsize| {
            output.fetch_add(*state, Ordering::SeqCst);
            0
        },
        |_index, _state| {},
    );

    let mut pool = Pool::new(5, job).unwrap();
    pool.launch();

    let output = AtomicUsize::new(0);
    pool.evaluate(&(), &output);

    // Blocks must partition the 17 units exactly, with no overlap or gap.
    assert_eq!(output.load(Ordering::SeqCst), 17);

    pool.close().unwrap();
}

#[test]
fn single_worker_pool_runs_with_no_spawned_threads() {
    let ran = Arc::new(AtomicI64::new(0));
    let ran_for_job = Arc::clone(&ran);

    let job = ClosureJob::new(
        move |_index, total| {
            assert_eq!(total, 1);
            Arc::clone(&ran_for_job)
        },
        |_index, state: &mut Arc<AtomicI64>, _input: &(), _output: &()| {
            state.fetch_add(1, Ordering::SeqCst);
            0
        },
        |_index, _state| {},
    );

    let mut pool = Pool::new(1, job).unwrap();
    assert_eq!(pool.total_workers(), 1);
    pool.launch();
    pool.evaluate(&(), &());
    pool.close().unwrap();

    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn verbose_toggling_does_not_change_evaluate_results() {
    let mut pool = Pool::new(2, identity_sum_job()).unwrap();
    assert!(!pool.is_verbose());

    pool.be_verbose();
    assert!(pool.is_verbose());
    pool.launch();

    let input = AtomicI64::new(3);
    let output = AtomicI64::new(0);
    pool.be_quiet();
    assert!(!pool.is_verbose());
    pool.evaluate(&input, &output);
    pool.be_verbose();
    assert!(pool.is_verbose());

    assert_eq!(output.load(Ordering::SeqCst), 6);
    pool.close().unwrap();
}

#[test]
fn be_quiet_reaches_workers_spawned_while_verbose() {
    // Exactly the sequence both demo binaries use: turn verbose on before
    // launch (so the launch banner prints), launch (spawning workers that
    // share the controller's print handle rather than a private snapshot
    // of it), then quiet down before the evaluate loop. Every already-
    // spawned worker must see the same be_quiet() the controller does,
    // not just worker 0.
    let mut pool = Pool::new(4, identity_sum_job()).unwrap();
    pool.be_verbose();
    pool.launch();
    pool.be_quiet();
    assert!(!pool.is_verbose());

    for _ in 0..3 {
        let input = AtomicI64::new(1);
        let output = AtomicI64::new(0);
        pool.evaluate(&input, &output);
        assert_eq!(output.load(Ordering::SeqCst), 4);
        // be_quiet() must stick across cycles: nothing in evaluate() may
        // resurrect verbose mode for the workers it already handed the
        // shared print handle to.
        assert!(!pool.is_verbose());
    }

    pool.close().unwrap();
}

#[test]
fn construction_with_zero_workers_is_rejected() {
    let job = identity_sum_job();
    let result = Pool::new(0, job);
    assert_eq!(result.err(), Some(PoolError::InvalidWorkerCount));
}

#[test]
fn panicking_worker_is_surfaced_at_close() {
    let job = ClosureJob::new(
        |_index, _total| (),
        |index, _state, _input: &(), _output: &()| {
            if index == 1 {
                panic!("worker 1 deliberately panics for this test");
            }
            0
        },
        |_index, _state| (),
    );

    let mut pool = Pool::new(3, job).unwrap();
    pool.launch();
    pool.evaluate(&(), &());

    match pool.close() {
        Err(PoolError::WorkerPanicked { index }) => assert_eq!(index, 1),
        other => panic!("expected WorkerPanicked {{ index: 1 }}, got {:?}", other),
    }
}

#[test]
fn environment_override_seeds_verbose_flag_at_construction() {
    std::env::set_var("PTHREADER_POOL_VERBOSE", "1");
    let mut pool = Pool::new(2, identity_sum_job()).unwrap();
    std::env::remove_var("PTHREADER_POOL_VERBOSE");

    // The env override must actually install a print lock at construction
    // time, not just flip a flag nothing reads -- this is the behavioral
    // proof that launch()'s banner (and every other lifecycle print) will
    // really fire, not a vacuous pass.
    assert!(pool.is_verbose());

    pool.launch();
    let input = AtomicI64::new(5);
    let output = AtomicI64::new(0);
    pool.evaluate(&input, &output);
    assert_eq!(output.load(Ordering::SeqCst), 10);

    pool.be_quiet();
    assert!(!pool.is_verbose());

    pool.close().unwrap();
}
