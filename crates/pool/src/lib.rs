//! # pthreader-pool
//!
//! A persistent worker-pool of long-lived OS threads, each running the same
//! construct -> launch/setup -> repeated evaluate -> close/teardown
//! lifecycle described in the crate's design notes. One thread (worker 0)
//! is always the caller's own thread; the other `N - 1` are spawned once by
//! [`Pool::launch`] and reused across every evaluate cycle.
//!
//! ## Quick start
//!
//! ```
//! use pthreader_pool::{ClosureJob, Pool};
//! use std::sync::atomic::{AtomicI64, Ordering};
//!
//! let job = ClosureJob::new(
//!     |_index, _total| (),
//!     |_index, _state, input: &AtomicI64, _output: &()| {
//!         input.fetch_add(1, Ordering::SeqCst);
//!         0
//!     },
//!     |_index, _state| (),
//! );
//!
//! let mut pool = Pool::new(4, job).expect("N >= 1");
//! pool.launch();
//!
//! let counter = AtomicI64::new(0);
//! let summary = pool.evaluate(&counter, &());
//! assert!(summary.all_zero);
//! assert_eq!(counter.load(Ordering::SeqCst), 4);
//!
//! pool.close().expect("no worker panicked");
//! ```
//!
//! ## Modules re-exported here
//!
//! - [`PoolJob`] / [`ClosureJob`] - the capability a client implements once
//!   per job kind, supplied at construction time instead of three separate
//!   C-style setters.
//! - [`Pool`] - the controller a client holds and drives through its
//!   lifecycle.
//! - [`StatusSummary`] - the six-bit aggregate recomputed after every
//!   evaluate cycle.
//! - [`PoolError`] / [`PoolResult`] - fallible construction and close().
//! - `diag` - opt-in verbose lifecycle diagnostics, toggled via
//!   [`Pool::be_verbose`]/[`Pool::be_quiet`] or the
//!   `PTHREADER_POOL_VERBOSE` environment variable.

pub use pool_core::diag;
pub use pool_core::{env_get, env_get_bool};
pub use pool_core::{ClosureJob, PoolError, PoolJob, PoolResult, StatusSummary};
pub use pool_runtime::Pool;
