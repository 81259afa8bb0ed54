//! Integration tests for the interval timer engine.
//!
//! Fixed scenarios check exact phase boundaries; property tests check the
//! invariants over arbitrary configurations.

use getfit_core::{Event, IntervalTimer, Phase, TimerConfiguration, TimerState};
use proptest::prelude::*;

fn start(work: u32, short: u32, long: u32, reps: u32, sets: u32) -> IntervalTimer {
    IntervalTimer::start(TimerConfiguration::new(work, short, long, reps, sets)).unwrap()
}

fn tick_n(timer: &mut IntervalTimer, n: u64) {
    for _ in 0..n {
        timer.tick();
    }
}

/// Ticks until Complete, returning the number of ticks taken.
fn run_to_completion(timer: &mut IntervalTimer) -> u64 {
    let mut ticks = 0;
    while !timer.is_complete() {
        timer.tick();
        ticks += 1;
        assert!(ticks < 10_000_000, "timer never completed");
    }
    ticks
}

#[test]
fn scenario_two_reps_one_set() {
    let mut t = start(10, 5, 0, 2, 1);

    tick_n(&mut t, 10);
    assert_eq!(t.state().phase, Phase::ShortBreak);
    assert_eq!(t.state().phase_remaining, 5);

    tick_n(&mut t, 5);
    assert_eq!(t.state().phase, Phase::Work);
    assert_eq!(t.state().phase_remaining, 10);
    assert_eq!(t.state().reps_done, 2);

    tick_n(&mut t, 10);
    assert_eq!(t.state().phase, Phase::Complete);
    assert!(!t.state().is_running);
    assert_eq!(t.state().total_elapsed, 25);
}

#[test]
fn scenario_single_rep_single_set() {
    let mut t = start(3, 0, 0, 1, 1);
    tick_n(&mut t, 3);
    assert_eq!(t.state().phase, Phase::Complete);
    assert_eq!(t.state().total_elapsed, 3);
}

#[test]
fn scenario_pause_mid_work() {
    let mut t = start(10, 5, 0, 2, 1);
    tick_n(&mut t, 2);
    assert_eq!(t.state().phase_remaining, 8);

    t.pause();
    tick_n(&mut t, 5);
    assert_eq!(t.state().phase_remaining, 8);

    t.resume();
    t.tick();
    assert_eq!(t.state().phase_remaining, 7);
}

#[test]
fn scenario_two_reps_two_sets_phase_order() {
    let mut t = start(5, 2, 3, 2, 2);
    let mut visited = vec![(t.state().phase, t.state().sets_done, t.state().reps_done)];

    while !t.is_complete() {
        if let Some(event) = t.tick() {
            let s = t.state();
            visited.push((s.phase, s.sets_done, s.reps_done));
            if let Event::PhaseChanged { reps_done, sets_done, .. } = event {
                assert_eq!((reps_done, sets_done), (s.reps_done, s.sets_done));
            }
        }
    }

    let phases: Vec<Phase> = visited.iter().map(|v| v.0).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Work,
            Phase::ShortBreak,
            Phase::Work,
            Phase::LongBreak,
            Phase::Work,
            Phase::ShortBreak,
            Phase::Work,
            Phase::Complete,
        ]
    );

    let work_counters: Vec<(u32, u32)> = visited
        .iter()
        .filter(|v| v.0 == Phase::Work)
        .map(|v| (v.1, v.2))
        .collect();
    assert_eq!(work_counters, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    assert_eq!(t.state().total_elapsed, 27);
}

#[test]
fn zero_length_breaks_cost_one_tick_each() {
    // Two short breaks and one long break, all zero length.
    let mut t = start(4, 0, 0, 2, 2);
    let ticks = run_to_completion(&mut t);
    assert_eq!(ticks, 4 * 4 + 3);
    assert_eq!(t.state().total_elapsed, ticks);
}

#[test]
fn completed_timer_ignores_everything() {
    let mut t = start(1, 0, 0, 1, 1);
    t.tick();
    let done = *t.state();
    assert!(t.tick().is_none());
    assert!(t.resume().is_none());
    assert!(t.pause().is_none());
    assert_eq!(*t.state(), done);
}

fn config_strategy() -> impl Strategy<Value = TimerConfiguration> {
    (1u32..20, 1u32..10, 1u32..15, 1u32..5, 1u32..5)
        .prop_map(|(w, b, l, r, s)| TimerConfiguration::new(w, b, l, r, s))
}

fn any_config_strategy() -> impl Strategy<Value = TimerConfiguration> {
    (1u32..20, 0u32..10, 0u32..15, 1u32..5, 1u32..5)
        .prop_map(|(w, b, l, r, s)| TimerConfiguration::new(w, b, l, r, s))
}

fn assert_bounds(state: &TimerState, cfg: &TimerConfiguration) {
    assert!(state.reps_done >= 1 && state.reps_done <= cfg.total_reps);
    assert!(state.sets_done >= 1 && state.sets_done <= cfg.total_sets);
    assert!(state.phase_remaining <= cfg.phase_total(state.phase));
}

proptest! {
    #[test]
    fn total_duration_identity(cfg in config_strategy()) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        let ticks = run_to_completion(&mut t);
        let (w, b, l) = (
            u64::from(cfg.work_duration),
            u64::from(cfg.short_break_duration),
            u64::from(cfg.long_break_duration),
        );
        let (r, s) = (u64::from(cfg.total_reps), u64::from(cfg.total_sets));
        prop_assert_eq!(ticks, s * (r * w + (r - 1) * b) + (s - 1) * l);
        prop_assert_eq!(ticks, cfg.total_expected_secs());
    }

    #[test]
    fn elapsed_grows_by_one_per_running_tick(cfg in any_config_strategy(), n in 0u64..200) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        for _ in 0..n {
            if t.is_complete() {
                break;
            }
            let before = t.state().total_elapsed;
            t.tick();
            prop_assert_eq!(t.state().total_elapsed, before + 1);
        }
    }

    #[test]
    fn pause_freezes_state(cfg in any_config_strategy(), warmup in 0u64..50, paused in 1u64..50) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        tick_n(&mut t, warmup);
        t.pause();
        let frozen = *t.state();
        for _ in 0..paused {
            prop_assert!(t.tick().is_none());
        }
        prop_assert_eq!(*t.state(), frozen);
    }

    #[test]
    fn complete_absorbs_ticks(cfg in any_config_strategy(), extra in 1u64..50) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        run_to_completion(&mut t);
        let done = *t.state();
        prop_assert!(!done.is_running);
        tick_n(&mut t, extra);
        prop_assert_eq!(*t.state(), done);
    }

    #[test]
    fn counters_stay_in_bounds(cfg in any_config_strategy()) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        assert_bounds(t.state(), &cfg);
        while !t.is_complete() {
            t.tick();
            assert_bounds(t.state(), &cfg);
        }
    }

    #[test]
    fn at_most_one_transition_per_tick(cfg in any_config_strategy()) {
        let mut t = IntervalTimer::start(cfg).unwrap();
        while !t.is_complete() {
            let before = t.state().phase;
            let event = t.tick();
            let after = t.state().phase;
            if before != after {
                prop_assert!(event.is_some());
            } else {
                prop_assert!(event.is_none());
            }
        }
    }
}
