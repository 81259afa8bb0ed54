mod config;
pub mod driver;
mod engine;

pub use config::{format_clock, TimerConfiguration};
pub use driver::{DriverCommand, DriverOutcome, TickDriver};
pub use engine::{IntervalTimer, Phase, TimerState};
