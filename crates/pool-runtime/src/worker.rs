//! The function every spawned worker thread runs.
//!
//! Mirrors `threaded_worker` in the source almost line for line: print a
//! launch banner, run setup unconditionally, signal setup-done, then loop
//! forever waiting for work or an exit request.

use crate::slot::Slot;
use pool_core::diag::{self, PrintSlot};
use pool_core::PoolJob;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub(crate) fn run_worker<J: PoolJob>(
    slot: Arc<Slot<J>>,
    job: Arc<J>,
    print: Arc<PrintSlot>,
) {
    diag::set_worker_context(slot.index);
    // `print` is the controller's own shared handle (cloned, not its
    // current contents snapshotted), so `print.get()` always reflects
    // whatever the controller's most recent be_verbose()/be_quiet() left
    // it as -- a later be_quiet() silences this worker immediately rather
    // than only workers spawned after the call.
    if let Some(print) = print.get() {
        print.launching(slot.index, slot.total);
    }

    // A panicking setup must still signal setup-done, or launch() hangs
    // waiting on this slot's cv_done forever instead of observing a dead
    // thread once it joins at close(). Same catch-finish-resume shape as
    // the evaluate loop below.
    let mut state = match panic::catch_unwind(AssertUnwindSafe(|| job.setup(slot.index, slot.total))) {
        Ok(state) => state,
        Err(payload) => {
            slot.worker_signal_setup_done();
            panic::resume_unwind(payload);
        }
    };
    slot.worker_signal_setup_done();
    if let Some(print) = print.get() {
        print.setup_complete(slot.index);
    }

    loop {
        let Some((input, output)) = slot.worker_wait_for_work() else {
            job.teardown(slot.index, state);
            return;
        };

        // SAFETY: see `SlotState`'s safety note in slot.rs — the
        // controller guarantees these pointers stay valid for the
        // duration of this call by blocking on `cv_done` before it lets
        // the borrow they came from end.
        let input: &J::Input = unsafe { &*input };
        let output: &J::Output = unsafe { &*output };

        // A panicking evaluate must still wake the controller's
        // cv_done wait — otherwise close() blocks on this slot forever
        // instead of observing a dead thread. Catch it, finish the slot,
        // then let it keep unwinding so the thread actually dies and
        // close()'s join() reports it.
        match panic::catch_unwind(AssertUnwindSafe(|| job.evaluate(slot.index, &mut state, input, output))) {
            Ok(status) => {
                slot.worker_finish(status);
                if let Some(print) = print.get() {
                    print.evaluate_complete(slot.index);
                }
            }
            Err(payload) => {
                slot.worker_finish(i32::MIN);
                panic::resume_unwind(payload);
            }
        }
    }
}
