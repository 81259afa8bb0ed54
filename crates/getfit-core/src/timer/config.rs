use serde::{Deserialize, Serialize};

use super::engine::Phase;
use crate::error::ValidationError;

/// Parameters of one interval workout, fixed for the lifetime of a timer.
///
/// All durations are whole seconds. Breaks may be zero ("no rest").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub total_reps: u32,
    pub total_sets: u32,
}

impl TimerConfiguration {
    pub fn new(
        work_duration: u32,
        short_break_duration: u32,
        long_break_duration: u32,
        total_reps: u32,
        total_sets: u32,
    ) -> Self {
        Self {
            work_duration,
            short_break_duration,
            long_break_duration,
            total_reps,
            total_sets,
        }
    }

    /// Reject configurations that would freeze or instantly finish the timer.
    ///
    /// # Errors
    /// Returns the first offending field; values are never clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.work_duration == 0 {
            return Err(ValidationError::invalid(
                "work_duration",
                "must be at least 1 second",
            ));
        }
        if self.total_reps == 0 {
            return Err(ValidationError::invalid("total_reps", "must be at least 1"));
        }
        if self.total_sets == 0 {
            return Err(ValidationError::invalid("total_sets", "must be at least 1"));
        }
        Ok(())
    }

    /// Length of the given phase in seconds. `Complete` has no length.
    pub fn phase_total(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_duration,
            Phase::ShortBreak => self.short_break_duration,
            Phase::LongBreak => self.long_break_duration,
            Phase::Complete => 0,
        }
    }

    /// Seconds in one set: every rep's work plus the short breaks between them.
    ///
    /// Saturates at `u64::MAX`.
    pub fn one_set_secs(&self) -> u64 {
        let reps = u64::from(self.total_reps);
        let work = reps.saturating_mul(u64::from(self.work_duration));
        let rest = reps
            .saturating_sub(1)
            .saturating_mul(u64::from(self.short_break_duration));
        work.saturating_add(rest)
    }

    /// Expected seconds from start to completion.
    ///
    /// Each zero-length break still costs one pass-through tick at runtime,
    /// which this figure does not include.
    /// Saturates at `u64::MAX`.
    pub fn total_expected_secs(&self) -> u64 {
        let sets = u64::from(self.total_sets);
        let body = sets.saturating_mul(self.one_set_secs());
        let rest = sets
            .saturating_sub(1)
            .saturating_mul(u64::from(self.long_break_duration));
        body.saturating_add(rest)
    }
}

impl Default for TimerConfiguration {
    /// 12:00 work, 01:00 short break, 05:00 long break, 3 reps, 2 sets.
    fn default() -> Self {
        Self::new(12 * 60, 60, 5 * 60, 3, 2)
    }
}

/// Format seconds as "MM:SS". Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
