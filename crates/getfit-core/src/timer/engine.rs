//! Interval timer engine.
//!
//! A deterministic state machine advanced one second at a time. It owns no
//! clock and no threads - the host calls `tick()` once per second (see
//! [`super::driver`] for a tokio-based host).
//!
//! ## Phase Transitions
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> LongBreak -> Work -> ... -> Complete
//! ```
//!
//! A phase is left in the tick that brings its remaining time to zero, so
//! transitions never consume an extra second. A zero-length break is entered
//! with nothing remaining and is left on the following tick; at most one
//! transition happens per tick.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::start(config)?;
//! // Once per second:
//! if let Some(event) = timer.tick() { /* phase boundary */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::TimerConfiguration;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
    /// Terminal. The timer never leaves this phase.
    Complete,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "WORK",
            Phase::ShortBreak => "SHORT BREAK",
            Phase::LongBreak => "LONG BREAK",
            Phase::Complete => "COMPLETE",
        }
    }
}

/// Mutable progress of one workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    /// Seconds left in the current phase.
    pub phase_remaining: u32,
    /// Seconds ticked while running, across all phases.
    pub total_elapsed: u64,
    /// Rep in progress, 1-based.
    pub reps_done: u32,
    /// Set in progress, 1-based.
    pub sets_done: u32,
    pub is_running: bool,
}

impl TimerState {
    fn initial(config: &TimerConfiguration) -> Self {
        Self {
            phase: Phase::Work,
            phase_remaining: config.work_duration,
            total_elapsed: 0,
            reps_done: 1,
            sets_done: 1,
            is_running: true,
        }
    }
}

/// A running (or paused) interval workout.
///
/// Serializable so hosts can snapshot it between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    config: TimerConfiguration,
    state: TimerState,
}

impl IntervalTimer {
    /// Validate `config` and return a running timer at the start of rep 1, set 1.
    ///
    /// # Errors
    /// Returns a `ValidationError` if the work duration, reps or sets are zero.
    pub fn start(config: TimerConfiguration) -> Result<Self, ValidationError> {
        config.validate()?;
        tracing::debug!(?config, "interval timer started");
        Ok(Self {
            state: TimerState::initial(&config),
            config,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfiguration {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == Phase::Complete
    }

    /// Full length of the current phase in seconds.
    pub fn phase_total(&self) -> u32 {
        self.config.phase_total(self.state.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        let total = self.phase_total();
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.state.phase_remaining) / f64::from(total))
    }

    /// 0.0 .. 1.0 progress across the whole workout.
    pub fn workout_progress(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        let expected = self.config.total_expected_secs();
        if expected == 0 {
            return 0.0;
        }
        (self.state.total_elapsed as f64 / expected as f64).min(1.0)
    }

    pub fn started_event(&self) -> Event {
        Event::TimerStarted {
            config: self.config,
            at: Utc::now(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            is_running: self.state.is_running,
            phase_remaining_secs: self.state.phase_remaining,
            phase_total_secs: self.phase_total(),
            total_elapsed_secs: self.state.total_elapsed,
            total_expected_secs: self.config.total_expected_secs(),
            reps_done: self.state.reps_done,
            total_reps: self.config.total_reps,
            sets_done: self.state.sets_done,
            total_sets: self.config.total_sets,
            phase_progress: self.phase_progress(),
            workout_progress: self.workout_progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance by exactly one second.
    ///
    /// Returns `Some` when a phase boundary was crossed in this tick.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running || self.is_complete() {
            return None;
        }
        self.state.total_elapsed += 1;
        if self.state.phase_remaining > 0 {
            self.state.phase_remaining -= 1;
            if self.state.phase_remaining > 0 {
                return None;
            }
        }
        Some(self.transition())
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        Some(Event::TimerPaused {
            phase: self.state.phase,
            phase_remaining_secs: self.state.phase_remaining,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.is_running || self.is_complete() {
            return None;
        }
        self.state.is_running = true;
        Some(Event::TimerResumed {
            phase: self.state.phase,
            phase_remaining_secs: self.state.phase_remaining,
            at: Utc::now(),
        })
    }

    /// Halt the timer for good and hand back its final state.
    pub fn stop(mut self) -> TimerState {
        self.state.is_running = false;
        tracing::debug!(
            phase = ?self.state.phase,
            total_elapsed = self.state.total_elapsed,
            "interval timer stopped"
        );
        self.state
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Leave the current phase. Called only when `phase_remaining` is zero.
    fn transition(&mut self) -> Event {
        let from = self.state.phase;
        let cfg = self.config;
        let state = &mut self.state;

        match from {
            Phase::Work if state.reps_done < cfg.total_reps => {
                state.phase = Phase::ShortBreak;
                state.phase_remaining = cfg.short_break_duration;
            }
            Phase::Work if state.sets_done < cfg.total_sets => {
                state.phase = Phase::LongBreak;
                state.phase_remaining = cfg.long_break_duration;
            }
            Phase::Work => {
                state.phase = Phase::Complete;
                state.phase_remaining = 0;
                state.is_running = false;
                tracing::debug!(total_elapsed = state.total_elapsed, "workout complete");
                return Event::WorkoutCompleted {
                    total_elapsed_secs: state.total_elapsed,
                    reps: cfg.total_reps,
                    sets: cfg.total_sets,
                    at: Utc::now(),
                };
            }
            Phase::ShortBreak => {
                state.reps_done += 1;
                state.phase = Phase::Work;
                state.phase_remaining = cfg.work_duration;
            }
            Phase::LongBreak => {
                state.sets_done += 1;
                state.reps_done = 1;
                state.phase = Phase::Work;
                state.phase_remaining = cfg.work_duration;
            }
            // `tick` never reaches here once complete.
            Phase::Complete => {}
        }

        tracing::debug!(
            ?from,
            to = ?state.phase,
            reps_done = state.reps_done,
            sets_done = state.sets_done,
            "phase changed"
        );
        Event::PhaseChanged {
            from,
            to: state.phase,
            reps_done: state.reps_done,
            sets_done: state.sets_done,
            phase_remaining_secs: state.phase_remaining,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(work: u32, short: u32, long: u32, reps: u32, sets: u32) -> IntervalTimer {
        IntervalTimer::start(TimerConfiguration::new(work, short, long, reps, sets)).unwrap()
    }

    fn tick_n(t: &mut IntervalTimer, n: usize) {
        for _ in 0..n {
            t.tick();
        }
    }

    #[test]
    fn start_initial_state() {
        let t = timer(30, 10, 60, 3, 2);
        let s = t.state();
        assert_eq!(s.phase, Phase::Work);
        assert_eq!(s.phase_remaining, 30);
        assert_eq!(s.total_elapsed, 0);
        assert_eq!((s.reps_done, s.sets_done), (1, 1));
        assert!(s.is_running);
    }

    #[test]
    fn start_rejects_invalid_config() {
        assert!(IntervalTimer::start(TimerConfiguration::new(0, 1, 1, 1, 1)).is_err());
    }

    #[test]
    fn tick_counts_down_without_event() {
        let mut t = timer(10, 5, 0, 2, 1);
        assert!(t.tick().is_none());
        assert_eq!(t.state().phase_remaining, 9);
        assert_eq!(t.state().total_elapsed, 1);
    }

    #[test]
    fn work_to_short_break_emits_phase_changed() {
        let mut t = timer(2, 5, 0, 2, 1);
        t.tick();
        match t.tick() {
            Some(Event::PhaseChanged { from, to, phase_remaining_secs, .. }) => {
                assert_eq!(from, Phase::Work);
                assert_eq!(to, Phase::ShortBreak);
                assert_eq!(phase_remaining_secs, 5);
            }
            other => panic!("Expected PhaseChanged, got {other:?}"),
        }
    }

    #[test]
    fn single_rep_single_set_goes_straight_to_complete() {
        let mut t = timer(3, 0, 0, 1, 1);
        tick_n(&mut t, 2);
        match t.tick() {
            Some(Event::WorkoutCompleted { total_elapsed_secs, .. }) => {
                assert_eq!(total_elapsed_secs, 3)
            }
            other => panic!("Expected WorkoutCompleted, got {other:?}"),
        }
        assert!(t.is_complete());
        assert!(!t.state().is_running);
    }

    #[test]
    fn zero_length_break_passes_through_on_next_tick() {
        let mut t = timer(2, 0, 0, 2, 1);
        tick_n(&mut t, 2);
        assert_eq!(t.state().phase, Phase::ShortBreak);
        assert_eq!(t.state().phase_remaining, 0);

        t.tick();
        assert_eq!(t.state().phase, Phase::Work);
        assert_eq!(t.state().reps_done, 2);
        assert_eq!(t.state().total_elapsed, 3);
    }

    #[test]
    fn long_break_resets_reps() {
        let mut t = timer(1, 1, 2, 2, 2);
        // work, short, work, long(2)
        tick_n(&mut t, 5);
        assert_eq!(t.state().phase, Phase::Work);
        assert_eq!((t.state().reps_done, t.state().sets_done), (1, 2));
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut t = timer(10, 5, 0, 2, 1);
        assert!(t.pause().is_some());
        assert!(t.pause().is_none());
        assert!(!t.state().is_running);
        assert!(t.resume().is_some());
        assert!(t.resume().is_none());
        assert!(t.state().is_running);
    }

    #[test]
    fn resume_after_complete_is_refused() {
        let mut t = timer(1, 0, 0, 1, 1);
        t.tick();
        assert!(t.is_complete());
        assert!(t.resume().is_none());
        assert!(!t.state().is_running);
    }

    #[test]
    fn stop_returns_halted_state() {
        let mut t = timer(10, 5, 0, 2, 1);
        tick_n(&mut t, 4);
        let state = t.stop();
        assert!(!state.is_running);
        assert_eq!(state.total_elapsed, 4);
        assert_eq!(state.phase_remaining, 6);
    }

    #[test]
    fn progress_tracks_phase_and_workout() {
        let mut t = timer(10, 5, 0, 2, 1);
        assert_eq!(t.phase_progress(), 0.0);
        tick_n(&mut t, 5);
        assert!((t.phase_progress() - 0.5).abs() < f64::EPSILON);
        assert!((t.workout_progress() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_length_phase_progress_is_zero() {
        let mut t = timer(1, 0, 0, 2, 1);
        t.tick();
        assert_eq!(t.state().phase, Phase::ShortBreak);
        assert_eq!(t.phase_progress(), 0.0);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let t = timer(30, 10, 60, 3, 2);
        match t.snapshot() {
            Event::StateSnapshot {
                phase,
                phase_remaining_secs,
                phase_total_secs,
                total_expected_secs,
                ..
            } => {
                assert_eq!(phase, Phase::Work);
                assert_eq!(phase_remaining_secs, 30);
                assert_eq!(phase_total_secs, 30);
                assert_eq!(total_expected_secs, 2 * (90 + 20) + 60);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_of_huge_configuration_saturates() {
        let mut t = timer(u32::MAX, u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        t.tick();
        assert!(t.workout_progress() < 1e-9);
        match t.snapshot() {
            Event::StateSnapshot {
                total_expected_secs,
                phase_remaining_secs,
                ..
            } => {
                assert_eq!(total_expected_secs, u64::MAX);
                assert_eq!(phase_remaining_secs, u32::MAX - 1);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let mut t = timer(30, 10, 60, 3, 2);
        tick_n(&mut t, 31);
        let json = serde_json::to_string(&t).unwrap();
        let restored: IntervalTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
        assert_eq!(restored.state().phase, Phase::ShortBreak);
    }
}
