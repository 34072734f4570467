//! The capability-set a client supplies to run work on the pool.
//!
//! The C source threads three raw function pointers (`pthreader_setup_fcn`,
//! `pthreader_eval_fcn`, `pthreader_free_fcn`) plus a `void *` initial-data
//! payload and a `void *` per-worker state pointer through the whole API.
//! This reimplementation collapses that into a single trait, `PoolJob`,
//! parameterized over the worker-private state type and the input/output
//! types the client chooses. A job closes over whatever "initial data" it
//! needs as ordinary struct fields, which eliminates the `void*` dance the
//! source's design notes call out.
//!
//! `Input`/`Output` are passed to `evaluate` by shared reference because
//! every worker evaluates the *same* cycle's input/output concurrently;
//! the pool does not serialize or partition them on the client's behalf
//! (see the crate-level docs). Clients that need each worker to write its
//! own slot of a shared buffer should choose an `Output` type with
//! interior mutability (`Vec<AtomicI64>`, `Vec<Mutex<T>>`, one cell per
//! worker index, …) and partition writes by the `index` they are given —
//! exactly the convention the source's callbacks already follow.

/// A unit of work a [`crate::Pool`] (in `pool-runtime`) can distribute
/// across its workers.
///
/// `setup` runs once per worker, concurrently with every other worker's
/// setup, during `launch()`. `evaluate` runs once per worker per call to
/// `evaluate()`. `teardown` runs once per worker during `close()`, before
/// that worker's thread exits.
pub trait PoolJob: Send + Sync {
    /// Per-worker state produced by `setup` and consumed by `evaluate`/`teardown`.
    type State: Send;
    /// Shared input for one evaluate cycle.
    type Input: Sync;
    /// Shared output for one evaluate cycle.
    type Output: Sync;

    /// Runs once per worker on launch. `index` is this worker's identity,
    /// `total` is the pool's worker count (`N`).
    fn setup(&self, index: usize, total: usize) -> Self::State;

    /// Runs once per worker per evaluate cycle. Returns a small integer
    /// status that is recorded per-worker and folded into the pool's
    /// status aggregator; it is never treated as a fatal error by the pool.
    fn evaluate(
        &self,
        index: usize,
        state: &mut Self::State,
        input: &Self::Input,
        output: &Self::Output,
    ) -> i32;

    /// Runs once per worker during close, before that worker exits.
    /// Defaults to a no-op: dropping `state` is often cleanup enough in
    /// safe Rust, whereas the source requires an explicit free callback
    /// because its state is an untyped heap allocation.
    #[allow(unused_variables)]
    fn teardown(&self, index: usize, state: Self::State) {}
}

/// Adapts three plain closures into a [`PoolJob`], for callers who would
/// rather not name a struct and `impl PoolJob for it` by hand — the same
/// convenience a thread-spawning API gets by accepting a closure directly
/// instead of requiring a named type.
pub struct ClosureJob<State, Input, Output, Setup, Eval, Teardown> {
    setup: Setup,
    eval: Eval,
    teardown: Teardown,
    _marker: std::marker::PhantomData<fn() -> (State, Input, Output)>,
}

impl<State, Input, Output, Setup, Eval, Teardown>
    ClosureJob<State, Input, Output, Setup, Eval, Teardown>
where
    State: Send,
    Input: Sync,
    Output: Sync,
    Setup: Fn(usize, usize) -> State + Send + Sync,
    Eval: Fn(usize, &mut State, &Input, &Output) -> i32 + Send + Sync,
    Teardown: Fn(usize, State) + Send + Sync,
{
    pub fn new(setup: Setup, eval: Eval, teardown: Teardown) -> Self {
        Self {
            setup,
            eval,
            teardown,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<State, Input, Output, Setup, Eval, Teardown> PoolJob
    for ClosureJob<State, Input, Output, Setup, Eval, Teardown>
where
    State: Send,
    Input: Sync,
    Output: Sync,
    Setup: Fn(usize, usize) -> State + Send + Sync,
    Eval: Fn(usize, &mut State, &Input, &Output) -> i32 + Send + Sync,
    Teardown: Fn(usize, State) + Send + Sync,
{
    type State = State;
    type Input = Input;
    type Output = Output;

    fn setup(&self, index: usize, total: usize) -> State {
        (self.setup)(index, total)
    }

    fn evaluate(&self, index: usize, state: &mut State, input: &Input, output: &Output) -> i32 {
        (self.eval)(index, state, input, output)
    }

    fn teardown(&self, index: usize, state: State) {
        (self.teardown)(index, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_closure_job_identity() {
        let job = ClosureJob::new(
            |index, _total| index as i64,
            |index, state, input: &i64, output: &AtomicI64| {
                output.fetch_add(*state + *input, Ordering::SeqCst);
                0
            },
            |_index, _state| {},
        );

        let mut state = job.setup(2, 4);
        let output = AtomicI64::new(0);
        let status = job.evaluate(2, &mut state, &10, &output);
        assert_eq!(status, 0);
        assert_eq!(output.load(Ordering::SeqCst), 12);
        job.teardown(2, state);
    }
}
