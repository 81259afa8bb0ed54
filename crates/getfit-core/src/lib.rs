//! # GetFit Core Library
//!
//! Core logic for the GetFit interval workout timer. Everything is available
//! through the standalone CLI; a mobile or desktop front end would be a thin
//! layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a one-second-tick state machine for work/rest/rep/set
//!   progression. It owns no clock; hosts call `tick()`.
//! - **Tick Driver**: a tokio task that owns the clock and serializes ticks
//!   with pause/resume/stop commands.
//! - **Storage**: SQLite workout history and TOML configuration
//! - **Catalog**: the bundled exercise list
//! - **Integrations**: contracts for the identity provider and profile store
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: Core timer state machine
//! - [`TickDriver`]: Periodic host for the engine
//! - [`Database`]: Workout history and statistics persistence
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod error;
pub mod events;
pub mod integrations;
pub mod storage;
pub mod timer;

pub use catalog::{Exercise, ExerciseCatalog};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use integrations::{AuthManager, IdentityProvider, ProfileStore};
pub use storage::{Config, Database};
pub use timer::{
    format_clock, DriverCommand, DriverOutcome, IntervalTimer, Phase, TickDriver,
    TimerConfiguration, TimerState,
};
