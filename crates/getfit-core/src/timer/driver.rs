//! Periodic host for an [`IntervalTimer`].
//!
//! The engine is synchronous; this driver owns the clock. It ticks on a
//! single tokio task, so ticks are strictly sequential, and listens for
//! pause/resume/stop commands between ticks.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::engine::{IntervalTimer, TimerState};
use crate::events::Event;

/// Commands a host can send to a running driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Pause,
    Resume,
    Stop,
}

/// How a driven workout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOutcome {
    pub state: TimerState,
    /// False when stopped early or when the command channel closed.
    pub completed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TickDriver {
    period: Duration,
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// One tick per second.
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Drive `timer` until it completes or is stopped.
    ///
    /// Engine events are forwarded to `events`. A dropped receiver does not
    /// stop the workout. A closed `commands` channel is treated as `Stop`.
    pub async fn run(
        &self,
        mut timer: IntervalTimer,
        mut commands: mpsc::Receiver<DriverCommand>,
        events: mpsc::UnboundedSender<Event>,
    ) -> DriverOutcome {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let emit = |event: Event| {
            if events.send(event).is_err() {
                tracing::debug!("event receiver dropped");
            }
        };

        emit(timer.started_event());
        tracing::info!(period_ms = self.period.as_millis() as u64, "tick driver started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(event) = timer.tick() {
                        emit(event);
                    }
                    if timer.is_complete() {
                        tracing::info!(
                            total_elapsed = timer.state().total_elapsed,
                            "tick driver finished"
                        );
                        return DriverOutcome { state: timer.stop(), completed: true };
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(DriverCommand::Pause) => {
                            if let Some(event) = timer.pause() {
                                emit(event);
                            }
                        }
                        Some(DriverCommand::Resume) => {
                            if let Some(event) = timer.resume() {
                                // A full period of running time before the next tick.
                                ticker.reset();
                                emit(event);
                            }
                        }
                        Some(DriverCommand::Stop) | None => {
                            let state = timer.stop();
                            emit(Event::TimerStopped {
                                phase: state.phase,
                                total_elapsed_secs: state.total_elapsed,
                                at: Utc::now(),
                            });
                            tracing::info!(
                                total_elapsed = state.total_elapsed,
                                "tick driver stopped"
                            );
                            return DriverOutcome { state, completed: false };
                        }
                    }
                }
            }
        }
    }
}
