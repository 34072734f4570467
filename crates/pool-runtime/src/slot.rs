//! The per-worker slot: the shared state a controller and exactly one
//! spawned worker thread hand off through.
//!
//! This is the Rust shape of the source's `pthreader_params` struct, minus
//! the fields that struct also used to carry the setup function pointers
//! and the per-worker state pointer — those are now the job's job (no pun
//! intended: see [`pool_core::PoolJob`]) and a local variable on the
//! worker's own stack, respectively. What's left is the synchronization
//! core: a work flag, a mutex, two condition variables, the current
//! input/output, the latest status, and an exit flag.

use pool_core::PoolJob;
use std::sync::{Condvar, Mutex, MutexGuard};

struct SlotState<J: PoolJob> {
    /// 0/1 work flag, as a bool: false = idle, true = pending/in-progress.
    work: bool,
    /// Set by the controller during close() to request this worker's exit.
    exit: bool,
    /// This cycle's input, set by the controller before `work` flips to true.
    ///
    /// Null until the first evaluate cycle. Erased to a raw pointer because
    /// the borrow it represents is only valid for the duration of one
    /// `Pool::evaluate` call on the controller's stack, not for the
    /// worker's `'static` lifetime — see the safety note in `worker.rs`.
    input: *const J::Input,
    /// This cycle's output, same lifetime caveat as `input`.
    output: *const J::Output,
    /// The worker's most recent evaluate status.
    status: i32,
}

// SAFETY: a SlotState's raw pointers are written by the controller only
// while holding this slot's mutex, immediately before handing the slot to
// exactly one worker thread via `cv_work`; they are read by that worker
// only while holding the same mutex, after observing `work == true`. The
// mutex plus condvar signal/wait pair establishes happens-before in both
// directions (spec §5), so no two threads ever observe the pointers
// concurrently, and `J::Input`/`J::Output: Sync` (the `PoolJob` bounds)
// guarantee the pointee itself tolerates being read from another thread.
unsafe impl<J: PoolJob> Send for SlotState<J> {}

/// A worker's slot: everything the controller and one spawned worker
/// thread share. Index 0 (the controller) has no `Slot` — it runs inline.
pub(crate) struct Slot<J: PoolJob> {
    pub(crate) index: usize,
    pub(crate) total: usize,
    state: Mutex<SlotState<J>>,
    cv_work: Condvar,
    cv_done: Condvar,
}

impl<J: PoolJob> Slot<J> {
    /// A freshly created slot starts with `work = true`: the spawned
    /// worker runs its setup callback unconditionally on entry (it does
    /// not wait on `cv_work` first), and `work = true` here simply blocks
    /// the controller's launch-time "wait for setup to finish" loop from
    /// racing a worker that hasn't signalled yet.
    pub(crate) fn new(index: usize, total: usize) -> Self {
        Self {
            index,
            total,
            state: Mutex::new(SlotState {
                work: true,
                exit: false,
                input: std::ptr::null(),
                output: std::ptr::null(),
                status: 0,
            }),
            cv_work: Condvar::new(),
            cv_done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<J>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Worker-side: block until setup has finished being observed as done
    /// is not needed here (see `new`); this is the worker's own signal
    /// that it finished setup and is now idle.
    pub(crate) fn worker_signal_setup_done(&self) {
        let mut guard = self.lock();
        guard.work = false;
        self.cv_done.notify_one();
    }

    /// Worker-side: wait for the controller to post work or request exit,
    /// then either return the (input, output) pointers for this cycle or
    /// `None` if this is an exit request.
    pub(crate) fn worker_wait_for_work(&self) -> Option<(*const J::Input, *const J::Output)> {
        let guard = self.lock();
        let mut guard = self.cv_work.wait_while(guard, |s| !s.work).unwrap_or_else(|p| p.into_inner());
        if guard.exit {
            return None;
        }
        Some((guard.input, guard.output))
    }

    /// Worker-side: record this cycle's status, flip back to idle, and
    /// wake the controller's `cv_done` wait.
    pub(crate) fn worker_finish(&self, status: i32) {
        let mut guard = self.lock();
        guard.status = status;
        guard.work = false;
        self.cv_done.notify_one();
    }

    /// Controller-side: wait until this slot is idle (defensive — it
    /// should already be idle by construction, but every handoff checks
    /// regardless).
    fn controller_wait_idle<'a>(&'a self, guard: MutexGuard<'a, SlotState<J>>) -> MutexGuard<'a, SlotState<J>> {
        self.cv_done.wait_while(guard, |s| s.work).unwrap_or_else(|p| p.into_inner())
    }

    /// Controller-side: hand this slot new (input, output) pointers and
    /// signal the worker to evaluate.
    pub(crate) fn controller_post_work(&self, input: *const J::Input, output: *const J::Output) {
        let guard = self.lock();
        let mut guard = self.controller_wait_idle(guard);
        guard.input = input;
        guard.output = output;
        guard.work = true;
        self.cv_work.notify_one();
    }

    /// Controller-side: wait for this slot's current work to finish and
    /// return its status.
    pub(crate) fn controller_collect(&self) -> i32 {
        let guard = self.lock();
        let guard = self.controller_wait_idle(guard);
        guard.status
    }

    /// Controller-side: request this worker's exit and wake it one final time.
    pub(crate) fn controller_request_exit(&self) {
        let guard = self.lock();
        let mut guard = self.controller_wait_idle(guard);
        guard.exit = true;
        guard.work = true;
        self.cv_work.notify_one();
    }
}
