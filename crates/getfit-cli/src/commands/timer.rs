use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use getfit_core::storage::Database;
use getfit_core::timer::{
    format_clock, DriverCommand, DriverOutcome, IntervalTimer, Phase, TickDriver,
    TimerConfiguration, TimerState,
};
use getfit_core::{Config, Event};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const TIMER_KEY: &str = "interval_timer";

/// Overrides for the configured timer settings.
#[derive(Args, Debug, Clone, Copy)]
pub struct TimerArgs {
    /// Work interval, seconds or MM:SS
    #[arg(long, value_parser = parse_duration)]
    work: Option<u32>,
    /// Rest between reps, seconds or MM:SS
    #[arg(long, value_parser = parse_duration)]
    short_break: Option<u32>,
    /// Rest between sets, seconds or MM:SS
    #[arg(long, value_parser = parse_duration)]
    long_break: Option<u32>,
    /// Reps per set
    #[arg(long)]
    reps: Option<u32>,
    /// Number of sets
    #[arg(long)]
    sets: Option<u32>,
}

impl TimerArgs {
    fn resolve(&self) -> Result<TimerConfiguration, Box<dyn std::error::Error>> {
        let base = Config::load()?.timer;
        let config = TimerConfiguration::new(
            self.work.unwrap_or(base.work_duration),
            self.short_break.unwrap_or(base.short_break_duration),
            self.long_break.unwrap_or(base.long_break_duration),
            self.reps.unwrap_or(base.total_reps),
            self.sets.unwrap_or(base.total_sets),
        );
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a workout in the foreground (type p/r/q + Enter to pause/resume/quit)
    Run {
        #[command(flatten)]
        args: TimerArgs,
        /// Tick period in milliseconds
        #[arg(long, default_value_t = 1000)]
        period_ms: u64,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Run a workout to completion instantly and print each phase boundary
    Simulate {
        #[command(flatten)]
        args: TimerArgs,
        /// Print events as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Start a persisted timer, advanced with `tick`
    Start {
        #[command(flatten)]
        args: TimerArgs,
    },
    /// Advance the persisted timer
    Tick {
        /// Number of one-second ticks
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Pause the persisted timer
    Pause,
    /// Resume the persisted timer
    Resume,
    /// Stop and record the persisted timer
    Stop,
    /// Print current timer state as JSON
    Status,
}

/// What the CLI keeps between invocations.
#[derive(Serialize, Deserialize)]
struct SavedTimer {
    timer: IntervalTimer,
    started_at: DateTime<Utc>,
}

fn load_timer(db: &Database) -> Result<Option<SavedTimer>, Box<dyn std::error::Error>> {
    let Some(json) = db.kv_get(TIMER_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<SavedTimer>(&json) {
        Ok(saved) if saved.timer.config().validate().is_ok() => Ok(Some(saved)),
        Ok(_) => {
            tracing::warn!("discarding saved timer with invalid configuration");
            db.kv_delete(TIMER_KEY)?;
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable saved timer");
            db.kv_delete(TIMER_KEY)?;
            Ok(None)
        }
    }
}

fn require_timer(db: &Database) -> Result<SavedTimer, Box<dyn std::error::Error>> {
    load_timer(db)?.ok_or_else(|| "no active timer; run `getfit timer start` first".into())
}

fn save_timer(db: &Database, saved: &SavedTimer) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(saved)?;
    db.kv_set(TIMER_KEY, &json)?;
    Ok(())
}

fn finish(
    db: &Database,
    config: &TimerConfiguration,
    state: &TimerState,
    started_at: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = db.record_workout(config, state, started_at, Utc::now())?;
    tracing::info!(workout = %id, completed = state.phase == Phase::Complete, "workout saved");
    db.kv_delete(TIMER_KEY)?;
    Ok(())
}

fn print_json(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { args, period_ms, json } => {
            let config = args.resolve()?;
            let period = Duration::from_millis(period_ms.max(1));
            run_foreground(config, period, json)
        }
        TimerAction::Simulate { args, json } => simulate(args.resolve()?, json),
        TimerAction::Start { args } => {
            let db = Database::open()?;
            if let Some(existing) = load_timer(&db)? {
                if !existing.timer.is_complete() {
                    return Err("a timer is already active; stop it first".into());
                }
            }
            let timer = IntervalTimer::start(args.resolve()?)?;
            print_json(&timer.started_event())?;
            save_timer(
                &db,
                &SavedTimer {
                    timer,
                    started_at: Utc::now(),
                },
            )
        }
        TimerAction::Tick { count } => {
            let db = Database::open()?;
            let mut saved = require_timer(&db)?;
            for _ in 0..count {
                if let Some(event) = saved.timer.tick() {
                    print_json(&event)?;
                }
                if saved.timer.is_complete() {
                    break;
                }
            }
            print_json(&saved.timer.snapshot())?;
            if saved.timer.is_complete() {
                let state = saved.timer.clone().stop();
                finish(&db, saved.timer.config(), &state, saved.started_at)
            } else {
                save_timer(&db, &saved)
            }
        }
        TimerAction::Pause => {
            let db = Database::open()?;
            let mut saved = require_timer(&db)?;
            let event = saved.timer.pause().unwrap_or_else(|| saved.timer.snapshot());
            print_json(&event)?;
            save_timer(&db, &saved)
        }
        TimerAction::Resume => {
            let db = Database::open()?;
            let mut saved = require_timer(&db)?;
            let event = saved.timer.resume().unwrap_or_else(|| saved.timer.snapshot());
            print_json(&event)?;
            save_timer(&db, &saved)
        }
        TimerAction::Stop => {
            let db = Database::open()?;
            let saved = require_timer(&db)?;
            let config = *saved.timer.config();
            let state = saved.timer.stop();
            print_json(&Event::TimerStopped {
                phase: state.phase,
                total_elapsed_secs: state.total_elapsed,
                at: Utc::now(),
            })?;
            finish(&db, &config, &state, saved.started_at)
        }
        TimerAction::Status => {
            let db = Database::open()?;
            let saved = require_timer(&db)?;
            print_json(&saved.timer.snapshot())
        }
    }
}

/// Drive a workout in real time until it completes, the user quits, or Ctrl-C.
fn run_foreground(
    config: TimerConfiguration,
    period: Duration,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let timer = IntervalTimer::start(config)?;
    let started_at = Utc::now();

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome: Result<DriverOutcome, Box<dyn std::error::Error>> = runtime.block_on(async {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();

        let driver = TickDriver::new(period);
        let handle = tokio::spawn(async move { driver.run(timer, cmd_rx, ev_tx).await });

        let signal_tx = cmd_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = signal_tx.send(DriverCommand::Stop).await;
            }
        });
        tokio::spawn(forward_stdin_commands(cmd_tx));

        while let Some(event) = ev_rx.recv().await {
            if json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                println!("{}", describe(&event, &config));
            }
        }
        Ok::<_, Box<dyn std::error::Error>>(handle.await?)
    });
    // The stdin reader may still be blocked on a read.
    runtime.shutdown_background();

    let outcome = outcome?;
    finish(&db, &config, &outcome.state, started_at)
}

async fn forward_stdin_commands(commands: mpsc::Sender<DriverCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = match line.trim() {
            "p" | "pause" => DriverCommand::Pause,
            "r" | "resume" => DriverCommand::Resume,
            "q" | "quit" | "s" | "stop" => DriverCommand::Stop,
            "" => continue,
            other => {
                eprintln!("unknown command '{other}' (p = pause, r = resume, q = quit)");
                continue;
            }
        };
        if commands.send(command).await.is_err() {
            break;
        }
    }
    // EOF on stdin keeps the workout running; only an explicit command stops it.
    std::future::pending::<()>().await;
}

fn simulate(config: TimerConfiguration, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = IntervalTimer::start(config)?;
    let mut boundaries = Vec::new();
    while !timer.is_complete() {
        if let Some(event) = timer.tick() {
            boundaries.push((timer.state().total_elapsed, event));
        }
    }

    if json {
        let list: Vec<serde_json::Value> = boundaries
            .iter()
            .map(|(tick, event)| serde_json::json!({ "tick": tick, "event": event }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        println!("{}", describe(&timer.started_event(), &config));
        for (_, event) in &boundaries {
            println!("{}", describe(event, &config));
        }
    }
    Ok(())
}

/// One-line human description of an event.
fn describe(event: &Event, config: &TimerConfiguration) -> String {
    match event {
        Event::TimerStarted { config: c, .. } => format!(
            "started: {} reps x {} sets, work {}, short break {}, long break {} (total {})",
            c.total_reps,
            c.total_sets,
            format_clock(u64::from(c.work_duration)),
            format_clock(u64::from(c.short_break_duration)),
            format_clock(u64::from(c.long_break_duration)),
            format_clock(c.total_expected_secs()),
        ),
        Event::PhaseChanged {
            to,
            reps_done,
            sets_done,
            phase_remaining_secs,
            ..
        } => format!(
            "{:<11} {}  rep {}/{}  set {}/{}",
            to.label(),
            format_clock(u64::from(*phase_remaining_secs)),
            reps_done,
            config.total_reps,
            sets_done,
            config.total_sets,
        ),
        Event::WorkoutCompleted {
            total_elapsed_secs, ..
        } => format!(
            "workout complete in {}",
            format_clock(*total_elapsed_secs)
        ),
        Event::TimerPaused {
            phase_remaining_secs,
            ..
        } => format!(
            "paused with {} left",
            format_clock(u64::from(*phase_remaining_secs))
        ),
        Event::TimerResumed { .. } => "resumed".to_string(),
        Event::TimerStopped {
            total_elapsed_secs, ..
        } => format!("stopped after {}", format_clock(*total_elapsed_secs)),
        Event::StateSnapshot {
            phase,
            phase_remaining_secs,
            ..
        } => format!(
            "{} {}",
            phase.label(),
            format_clock(u64::from(*phase_remaining_secs))
        ),
    }
}

/// Parse "90" or "1:30" into seconds.
fn parse_duration(s: &str) -> Result<u32, String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid duration '{s}', expected seconds or MM:SS"))
    };
    match s.split_once(':') {
        Some((min, sec)) => {
            let (min, sec) = (parse(min)?, parse(sec)?);
            if sec >= 60 {
                return Err(format!("invalid duration '{s}', seconds must be below 60"));
            }
            min.checked_mul(60)
                .and_then(|m| m.checked_add(sec))
                .ok_or_else(|| format!("duration '{s}' is too long"))
        }
        None => parse(s),
    }
}
