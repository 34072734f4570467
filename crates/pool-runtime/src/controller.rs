//! The pool controller: the object a client holds and drives.
//!
//! Owns the slot array, the worker join handles, the per-worker status
//! vector, and the shared job. Implements the controller side of the
//! handoff protocol described in the crate docs, with slot 0's work
//! always executed inline on the controller's own thread.

use crate::slot::Slot;
use crate::worker::run_worker;
use pool_core::diag::{self, PrintLock, PrintSlot};
use pool_core::{PoolError, PoolJob, PoolResult, StatusSummary};
use std::sync::Arc;
use std::thread::JoinHandle;

/// State that only exists while the pool is launched.
struct Launched<J: PoolJob> {
    /// Slots for workers `1..total`; empty for a single-worker pool.
    slots: Vec<Arc<Slot<J>>>,
    handles: Vec<JoinHandle<()>>,
    /// The controller's own (worker 0) state, produced by `job.setup(0, total)`.
    state0: J::State,
    /// Per-worker status from the most recent evaluate cycle, length `total`.
    status: Vec<i32>,
}

enum Lifecycle<J: PoolJob> {
    Constructed,
    Launched(Launched<J>),
    Closed,
}

/// A persistent pool of `total` workers distributing one [`PoolJob`].
///
/// Worker index 0 is always the thread that calls the pool's methods;
/// `total - 1` additional OS threads are spawned by [`Pool::launch`].
pub struct Pool<J: PoolJob> {
    job: Arc<J>,
    total: usize,
    /// A revocable, shared handle to the current print lock (or `None` in
    /// quiet mode). Shared with every spawned worker via `Arc::clone` (not
    /// a one-time snapshot of its contents) so that `be_quiet`/`be_verbose`
    /// take effect for already-running workers immediately, the same way
    /// the source re-reads `params->prnt`/`params->prntlock` on every loop
    /// iteration instead of caching them once at thread start.
    print: Arc<PrintSlot>,
    lifecycle: Lifecycle<J>,
}

impl<J: PoolJob> Pool<J> {
    /// Construct a pool for `total` workers (`total >= 1`) running `job`.
    ///
    /// Does not spawn any threads; call [`Pool::launch`] for that. Verbose
    /// mode starts on if [`pool_core::diag::env_default_verbose`] says so,
    /// so a deployment can turn on pool diagnostics without a code change —
    /// the print lock is created right here, not merely a flag that some
    /// later code path forgets to act on.
    pub fn new(total: usize, job: J) -> PoolResult<Self> {
        if total == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        let print = Arc::new(PrintSlot::new());
        if diag::env_default_verbose() {
            print.set(Some(Arc::new(PrintLock::new())));
        }
        Ok(Self {
            job: Arc::new(job),
            total,
            print,
            lifecycle: Lifecycle::Constructed,
        })
    }

    /// Total worker count, `N`.
    pub fn total_workers(&self) -> usize {
        self.total
    }

    /// `true` if verbose lifecycle diagnostics are currently on, whether
    /// from [`Pool::be_verbose`] or the `PTHREADER_POOL_VERBOSE` env seed.
    pub fn is_verbose(&self) -> bool {
        self.print.get().is_some()
    }

    /// Turn on verbose lifecycle diagnostics. Must not be called from
    /// inside a callback, and has no effect mid-evaluate (there is no
    /// mid-evaluate reentry path into the controller to call it from).
    /// Reaches already-spawned workers immediately (see the `print` field).
    pub fn be_verbose(&mut self) {
        if self.print.get().is_none() {
            self.print.set(Some(Arc::new(PrintLock::new())));
        }
    }

    /// Turn off verbose lifecycle diagnostics. Reaches already-spawned
    /// workers immediately: the next line any worker would have printed is
    /// instead skipped, because every worker consults the same shared
    /// handle this clears rather than a private snapshot taken at launch.
    pub fn be_quiet(&mut self) {
        self.print.set(None);
    }

    fn warn(&self, message: &str) {
        if let Some(print) = self.print.get() {
            print.warn(message);
        }
    }

    /// `true` once [`Pool::launch`] has succeeded and before [`Pool::close`].
    pub fn is_launched(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Launched(_))
    }

    /// Spawn `total - 1` worker threads and run setup on every worker
    /// (including the controller, inline). A no-op with a verbose warning
    /// if already launched.
    pub fn launch(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Launched(_)) {
            self.warn("launch() called on an already-launched pool; ignored");
            return;
        }

        if let Some(print) = self.print.get() {
            print.launching(0, self.total);
        }

        let mut slots = Vec::with_capacity(self.total.saturating_sub(1));
        let mut handles = Vec::with_capacity(self.total.saturating_sub(1));
        for index in 1..self.total {
            let slot = Arc::new(Slot::new(index, self.total));
            let job = Arc::clone(&self.job);
            // Clone the shared slot itself, not its current contents, so a
            // later be_verbose()/be_quiet() reaches this worker too.
            let print = Arc::clone(&self.print);
            let spawned_slot = Arc::clone(&slot);
            let handle = std::thread::Builder::new()
                .name(format!("pool-worker-{}", index))
                .spawn(move || run_worker(spawned_slot, job, print))
                .expect("failed to spawn pool worker thread");
            slots.push(slot);
            handles.push(handle);
        }

        // Run the controller's own setup inline before waiting on the
        // spawned workers: this matches the source's ordering exactly and
        // means worker 0's setup never blocks on anyone else's.
        let state0 = self.job.setup(0, self.total);
        if let Some(print) = self.print.get() {
            print.setup_complete(0);
        }

        // Wait for every spawned worker's setup to complete.
        for slot in &slots {
            let _ = slot.controller_collect();
        }

        self.lifecycle = Lifecycle::Launched(Launched {
            slots,
            handles,
            state0,
            status: vec![0; self.total],
        });
    }

    /// Run one evaluate cycle: hand `input`/`output` to every worker,
    /// evaluate inline for worker 0, then collect every status. A no-op
    /// (returning the previous cycle's summary unchanged) if not launched.
    pub fn evaluate(&mut self, input: &J::Input, output: &J::Output) -> StatusSummary {
        let Lifecycle::Launched(launched) = &mut self.lifecycle else {
            self.warn("evaluate() called before launch(); ignored");
            return StatusSummary::default();
        };

        for slot in &launched.slots {
            slot.controller_post_work(input as *const J::Input, output as *const J::Output);
        }

        launched.status[0] = self.job.evaluate(0, &mut launched.state0, input, output);
        if let Some(print) = self.print.get() {
            print.evaluate_complete(0);
        }

        for (offset, slot) in launched.slots.iter().enumerate() {
            launched.status[offset + 1] = slot.controller_collect();
            if let Some(print) = self.print.get() {
                print.evaluate_complete(slot.index);
            }
        }

        StatusSummary::from_statuses(&launched.status)
    }

    /// This worker's status from the most recent evaluate cycle, or `0`
    /// if not launched.
    pub fn status(&self, index: usize) -> i32 {
        match &self.lifecycle {
            Lifecycle::Launched(launched) => launched.status.get(index).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// The six aggregate status bits from the most recent evaluate cycle.
    pub fn status_summary(&self) -> StatusSummary {
        match &self.lifecycle {
            Lifecycle::Launched(launched) => StatusSummary::from_statuses(&launched.status),
            _ => StatusSummary::default(),
        }
    }

    /// Signal every worker to exit, run the controller's own teardown,
    /// join every worker thread, and transition to *Closed*.
    ///
    /// A no-op if not launched. Returns [`PoolError::WorkerPanicked`] if a
    /// worker thread panicked rather than returning normally; every
    /// worker is still joined (and the controller's teardown still runs)
    /// before this is reported.
    pub fn close(&mut self) -> PoolResult<()> {
        let Lifecycle::Launched(launched) = std::mem::replace(&mut self.lifecycle, Lifecycle::Closed) else {
            self.lifecycle = Lifecycle::Closed;
            self.warn("close() called before launch(); ignored");
            return Ok(());
        };

        if let Some(print) = self.print.get() {
            print.closing(self.total);
        }

        for slot in &launched.slots {
            slot.controller_request_exit();
        }

        self.job.teardown(0, launched.state0);

        let mut panicked_index = None;
        for (offset, handle) in launched.handles.into_iter().enumerate() {
            if handle.join().is_err() && panicked_index.is_none() {
                panicked_index = Some(offset + 1);
            }
        }

        match panicked_index {
            Some(index) => Err(PoolError::WorkerPanicked { index }),
            None => Ok(()),
        }
    }
}

impl<J: PoolJob> Drop for Pool<J> {
    fn drop(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Launched(_)) {
            let _ = self.close();
        }
    }
}
