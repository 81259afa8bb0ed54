use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerConfiguration};

/// Every observable change of an interval timer produces an Event.
/// The CLI prints them; a GUI host would poll or subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        config: TimerConfiguration,
        at: DateTime<Utc>,
    },
    /// A phase boundary was crossed and the workout continues.
    PhaseChanged {
        from: Phase,
        to: Phase,
        reps_done: u32,
        sets_done: u32,
        phase_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The last work interval of the last set finished.
    WorkoutCompleted {
        total_elapsed_secs: u64,
        reps: u32,
        sets: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        phase_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        phase_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The host stopped the timer before completion (or after, to discard it).
    TimerStopped {
        phase: Phase,
        total_elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        is_running: bool,
        phase_remaining_secs: u32,
        phase_total_secs: u32,
        total_elapsed_secs: u64,
        total_expected_secs: u64,
        reps_done: u32,
        total_reps: u32,
        sets_done: u32,
        total_sets: u32,
        /// 0.0 .. 1.0 within the current phase.
        phase_progress: f64,
        /// 0.0 .. 1.0 across the whole workout.
        workout_progress: f64,
        at: DateTime<Utc>,
    },
}
