//! # pool-runtime
//!
//! The threaded half of the persistent worker-pool: the per-worker slot
//! (`slot`), the function every spawned worker thread runs (`worker`),
//! and the `Pool` controller a client actually holds (`controller`).
//!
//! See the crate-level docs on `pool` (the top-level crate) for the full
//! lifecycle walkthrough and usage example.

mod controller;
mod slot;
mod worker;

pub use controller::Pool;
