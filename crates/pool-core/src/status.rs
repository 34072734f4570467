//! Status aggregation over an evaluate cycle's per-worker results.
//!
//! The source carries both an accumulated set of six booleans (updated as
//! each worker's status becomes available) and a compile-time toggle to
//! recompute them on demand instead, behind `#ifdef
//! _PTHREADER_COMPILE_ACCUM_EVAL_STATUS_*`. This reimplementation drops
//! the accumulated form and always recomputes from the status vector —
//! `O(N)` per query, negligible next to the evaluate cycle itself, and it
//! removes an entire axis of (largely untested) compile-time variation.
//!
//! The source's `get_any_status_zero` accessor returns the
//! `any_status_pos` accumulator instead of `any_status_zero` — a
//! transcription bug. `any_zero` below does not carry that forward.

/// The six summary bits over one evaluate cycle's statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub all_zero: bool,
    pub all_positive: bool,
    pub all_negative: bool,
    pub any_zero: bool,
    pub any_positive: bool,
    pub any_negative: bool,
}

impl StatusSummary {
    /// Compute the summary for a (possibly empty) slice of per-worker statuses.
    ///
    /// An empty slice reports all six bits as vacuously satisfied for the
    /// `all_*` bits and unsatisfied for the `any_*` bits, matching the
    /// source's initialization (`all_* = 1`, `any_* = 0` before the loop).
    pub fn from_statuses(statuses: &[i32]) -> Self {
        let mut summary = StatusSummary {
            all_zero: true,
            all_positive: true,
            all_negative: true,
            any_zero: false,
            any_positive: false,
            any_negative: false,
        };
        for &status in statuses {
            summary.all_zero &= status == 0;
            summary.all_positive &= status > 0;
            summary.all_negative &= status < 0;
            summary.any_zero |= status == 0;
            summary.any_positive |= status > 0;
            summary.any_negative |= status < 0;
        }
        summary
    }
}
