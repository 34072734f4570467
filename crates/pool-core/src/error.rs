//! Error types for the worker pool

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors the pool can return from its own lifecycle operations.
///
/// Callback failures are never routed through this type: a worker's
/// evaluate callback communicates success or failure through its integer
/// status (see `status`), not through `Result`. This enum only covers
/// mistakes in *using* the pool itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `Pool::new` was called with zero workers.
    InvalidWorkerCount,

    /// A worker thread panicked during setup, evaluate, or teardown.
    ///
    /// Surfaced from `close()`, which is the first point the controller
    /// joins every worker thread.
    WorkerPanicked {
        /// Index of the worker that panicked.
        index: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidWorkerCount => {
                write!(f, "pool requires at least one worker (N >= 1)")
            }
            PoolError::WorkerPanicked { index } => {
                write!(f, "worker {} panicked before it could be joined", index)
            }
        }
    }
}

impl std::error::Error for PoolError {}
