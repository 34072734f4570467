//! Verbose diagnostics
//!
//! A kernel-style print facility scaled down to what the pool actually
//! needs: a single verbose/quiet toggle instead of log levels, and a
//! small, fixed set of lifecycle messages (launch banner, per-worker
//! setup/evaluate complete, close banner) rather than general-purpose
//! logging macros.
//!
//! When verbose mode is off, no mutex is acquired and nothing is printed —
//! printing is purely diagnostic and never changes pool behavior.

use crate::env::env_get_bool;
use std::cell::Cell;
use std::sync::{Arc, Mutex};

/// Environment variable that seeds a freshly constructed pool's verbose flag.
pub const VERBOSE_ENV_VAR: &str = "PTHREADER_POOL_VERBOSE";

/// Read the default verbose setting from the environment.
///
/// Accepts the same truthy spellings as [`crate::env::env_get_bool`].
/// A pool still starts quiet by default; this only applies if the
/// client seeds its flag from it during construction.
#[inline]
pub fn env_default_verbose() -> bool {
    env_get_bool(VERBOSE_ENV_VAR, false)
}

thread_local! {
    static CURRENT_WORKER: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Record which worker index is executing on the current OS thread.
///
/// Called once by a spawned worker before it enters its wait/work loop,
/// so diagnostic lines printed from that thread can identify themselves.
pub fn set_worker_context(index: usize) {
    CURRENT_WORKER.with(|c| c.set(Some(index)));
}

/// The worker index associated with the current OS thread, if any.
pub fn worker_context() -> Option<usize> {
    CURRENT_WORKER.with(|c| c.get())
}

/// A dedicated mutex guarding stdout writes, created only while a pool is
/// in verbose mode.
///
/// This exists as its own type (rather than relying on `Stdout`'s internal
/// per-call lock) because the pool's diagnostics are several related lines
/// emitted across a cycle and the source's design calls for one print lock
/// shared by every slot, not a lock-per-println.
#[derive(Debug, Default)]
pub struct PrintLock(Mutex<()>);

impl PrintLock {
    pub fn new() -> Self {
        Self(Mutex::new(()))
    }

    fn with_lock(&self, f: impl FnOnce()) {
        let _guard = self.0.lock().unwrap_or_else(|poison| poison.into_inner());
        f();
    }

    /// "launching thread i/N" style banner, printed once per spawned worker.
    pub fn launching(&self, index: usize, total: usize) {
        self.with_lock(|| println!("[pool] launching worker {}/{}", index + 1, total));
    }

    /// Printed by a worker immediately after its setup callback returns.
    pub fn setup_complete(&self, index: usize) {
        self.with_lock(|| println!("[pool] worker {} is done setting up", index));
    }

    /// Printed after a worker's evaluate callback returns for this cycle.
    pub fn evaluate_complete(&self, index: usize) {
        self.with_lock(|| println!("[pool] worker {} is done evaluating", index));
    }

    /// Printed once, from the controller, when `close()` begins.
    pub fn closing(&self, total: usize) {
        self.with_lock(|| println!("[pool] closing pool of {} workers", total));
    }

    /// Printed when a lifecycle call is a silent no-op (already launched,
    /// not launched yet, …).
    pub fn warn(&self, message: &str) {
        self.with_lock(|| println!("[pool] warning: {}", message));
    }
}

/// A revocable handle to the pool's current [`PrintLock`], shared between
/// the controller and every spawned worker.
///
/// `be_verbose`/`be_quiet` only ever touch the controller's own fields in
/// a naive design; a worker that captured `Option<Arc<PrintLock>>` at
/// launch time would keep printing with a stale snapshot forever, deaf to
/// a later `be_quiet()`. Handing out clones of a `PrintSlot` instead means
/// every holder consults the same cell on every print, so toggling it from
/// the controller reaches already-spawned workers immediately — the same
/// "read `prnt`/`prntlock` fresh every time" behavior as the source
/// (`pthreader.cpp`'s `threaded_worker` re-reads `params->prnt` each loop
/// iteration rather than caching it once at thread start).
#[derive(Debug, Default)]
pub struct PrintSlot(Mutex<Option<Arc<PrintLock>>>);

impl PrintSlot {
    /// A freshly created slot starts quiet (`None`).
    pub fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// Install (`Some`) or revoke (`None`) the shared print lock.
    pub fn set(&self, lock: Option<Arc<PrintLock>>) {
        *self.0.lock().unwrap_or_else(|poison| poison.into_inner()) = lock;
    }

    /// The current print lock, if verbose mode is on right now.
    pub fn get(&self) -> Option<Arc<PrintLock>> {
        self.0.lock().unwrap_or_else(|poison| poison.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_context_roundtrip() {
        assert_eq!(worker_context(), None);
        set_worker_context(7);
        assert_eq!(worker_context(), Some(7));
    }

    #[test]
    fn test_env_default_verbose() {
        std::env::remove_var(VERBOSE_ENV_VAR);
        assert!(!env_default_verbose());

        std::env::set_var(VERBOSE_ENV_VAR, "1");
        assert!(env_default_verbose());
        std::env::remove_var(VERBOSE_ENV_VAR);
    }

    #[test]
    fn test_print_lock_does_not_panic() {
        let lock = PrintLock::new();
        lock.launching(0, 4);
        lock.setup_complete(0);
        lock.evaluate_complete(0);
        lock.closing(4);
        lock.warn("example");
    }

    #[test]
    fn test_print_slot_starts_quiet_and_is_revocable() {
        let slot = PrintSlot::new();
        assert!(slot.get().is_none());

        slot.set(Some(Arc::new(PrintLock::new())));
        assert!(slot.get().is_some());

        slot.set(None);
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_print_slot_clone_observes_live_updates() {
        // A clone of the Arc<PrintSlot> must see toggles made through the
        // original, not a snapshot taken at clone time -- this is the
        // property that lets a worker's handle react to a controller's
        // later `be_quiet()`.
        let slot = Arc::new(PrintSlot::new());
        let worker_view = Arc::clone(&slot);
        assert!(worker_view.get().is_none());

        slot.set(Some(Arc::new(PrintLock::new())));
        assert!(worker_view.get().is_some());

        slot.set(None);
        assert!(worker_view.get().is_none());
    }
}
