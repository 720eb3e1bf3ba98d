//! Drift-compensated cycle timing
//!
//! Each cycle sleeps for whatever is left of the interval after its own work,
//! so a slow controller or store shortens the pause instead of stretching the
//! cadence. A cycle that overran is followed immediately by the next one.

use std::time::Duration;

/// What to do after a cycle finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepPlan {
    /// Sleep for the remainder of the interval
    Sleep(Duration),
    /// The cycle took longer than the interval; do not sleep at all
    Overrun { overrun: Duration },
}

impl SleepPlan {
    /// Time to actually sleep, never negative
    pub fn duration(&self) -> Duration {
        match self {
            SleepPlan::Sleep(remaining) => *remaining,
            SleepPlan::Overrun { .. } => Duration::ZERO,
        }
    }

    pub fn is_overrun(&self) -> bool {
        matches!(self, SleepPlan::Overrun { .. })
    }
}

/// Computes `interval - elapsed`, clamped at zero
pub fn plan_sleep(interval: Duration, elapsed: Duration) -> SleepPlan {
    match interval.checked_sub(elapsed) {
        Some(remaining) => SleepPlan::Sleep(remaining),
        None => SleepPlan::Overrun {
            overrun: elapsed - interval,
        },
    }
}
