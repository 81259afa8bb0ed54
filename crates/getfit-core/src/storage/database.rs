//! SQLite-based workout storage and statistics.
//!
//! Provides persistent storage for:
//! - Finished workouts (completed or stopped early)
//! - Workout statistics (daily and all-time)
//! - Key-value store for application state (the CLI's timer snapshot)
//! - Local user profiles

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::timer::{TimerConfiguration, TimerState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub config: TimerConfiguration,
    pub total_elapsed_secs: u64,
    pub reps_done: u32,
    pub sets_done: u32,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_workouts: u64,
    pub completed_workouts: u64,
    pub total_elapsed_secs: u64,
    pub today_workouts: u64,
    pub today_elapsed_secs: u64,
}

/// A row of the local profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub weight_kg: Option<f32>,
    pub height_cm: Option<f32>,
}

/// SQLite database for workout storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/getfit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("getfit.db");
        Self::open_at(&path)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS workouts (
                    id                   TEXT PRIMARY KEY,
                    work_duration        INTEGER NOT NULL,
                    short_break_duration INTEGER NOT NULL,
                    long_break_duration  INTEGER NOT NULL,
                    total_reps           INTEGER NOT NULL,
                    total_sets           INTEGER NOT NULL,
                    total_elapsed_secs   INTEGER NOT NULL,
                    reps_done            INTEGER NOT NULL,
                    sets_done            INTEGER NOT NULL,
                    completed            INTEGER NOT NULL,
                    started_at           TEXT NOT NULL,
                    finished_at          TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS users (
                    id        TEXT PRIMARY KEY,
                    username  TEXT NOT NULL DEFAULT '',
                    email     TEXT NOT NULL DEFAULT '',
                    weight_kg REAL,
                    height_cm REAL
                );

                CREATE INDEX IF NOT EXISTS idx_workouts_finished_at ON workouts(finished_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Record a finished workout. Returns its generated id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_workout(
        &self,
        config: &TimerConfiguration,
        state: &TimerState,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let completed = state.phase == crate::timer::Phase::Complete;
        self.conn.execute(
            "INSERT INTO workouts (
                id, work_duration, short_break_duration, long_break_duration,
                total_reps, total_sets, total_elapsed_secs, reps_done, sets_done,
                completed, started_at, finished_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                id,
                config.work_duration,
                config.short_break_duration,
                config.long_break_duration,
                config.total_reps,
                config.total_sets,
                state.total_elapsed,
                state.reps_done,
                state.sets_done,
                completed,
                started_at.to_rfc3339(),
                finished_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(%id, completed, total_elapsed = state.total_elapsed, "workout recorded");
        Ok(id)
    }

    /// Most recently finished workouts first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp is corrupt.
    pub fn recent_workouts(&self, limit: usize) -> Result<Vec<WorkoutRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, work_duration, short_break_duration, long_break_duration,
                    total_reps, total_sets, total_elapsed_secs, reps_done, sets_done,
                    completed, started_at, finished_at
             FROM workouts
             ORDER BY finished_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                TimerConfiguration::new(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?),
                row.get::<_, u64>(6)?,
                row.get::<_, u32>(7)?,
                row.get::<_, u32>(8)?,
                row.get::<_, bool>(9)?,
                row.get::<_, String>(10)?,
                row.get::<_, String>(11)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, config, total_elapsed_secs, reps_done, sets_done, completed, started, finished) =
                row?;
            records.push(WorkoutRecord {
                id,
                config,
                total_elapsed_secs,
                reps_done,
                sets_done,
                completed,
                started_at: parse_timestamp(&started)?,
                finished_at: parse_timestamp(&finished)?,
            });
        }
        Ok(records)
    }

    /// All-time and today's totals.
    ///
    /// # Errors
    /// Returns an error if a query fails.
    pub fn stats(&self) -> Result<Stats> {
        let (total_workouts, completed_workouts, total_elapsed_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0), COALESCE(SUM(total_elapsed_secs), 0)
             FROM workouts",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?, row.get::<_, u64>(2)?)),
        )?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let (today_workouts, today_elapsed_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(total_elapsed_secs), 0)
             FROM workouts
             WHERE finished_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        Ok(Stats {
            total_workouts,
            completed_workouts,
            total_elapsed_secs,
            today_workouts,
            today_elapsed_secs,
        })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Look up a local profile.
    pub fn user_profile(&self, id: &str) -> Result<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, username, email, weight_kg, height_cm FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        weight_kg: row.get(3)?,
                        height_cm: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    pub(crate) fn upsert_user(&self, id: &str, username: &str, email: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, username, email) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username, email = excluded.email",
            params![id, username, email],
        )?;
        Ok(())
    }

    pub(crate) fn upsert_weight(&self, id: &str, kg: f32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, weight_kg) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET weight_kg = excluded.weight_kg",
            params![id, kg],
        )?;
        Ok(())
    }

    pub(crate) fn upsert_height(&self, id: &str, cm: f32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, height_cm) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET height_cm = excluded.height_cm",
            params![id, cm],
        )?;
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{IntervalTimer, Phase};

    fn finished_state(config: TimerConfiguration) -> TimerState {
        let mut timer = IntervalTimer::start(config).unwrap();
        while !timer.is_complete() {
            timer.tick();
        }
        timer.stop()
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let config = TimerConfiguration::new(3, 1, 0, 2, 1);
        let state = finished_state(config);
        assert_eq!(state.phase, Phase::Complete);

        let now = Utc::now();
        let id = db.record_workout(&config, &state, now, now).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_workouts, 1);
        assert_eq!(stats.completed_workouts, 1);
        assert_eq!(stats.total_elapsed_secs, 7);
        assert_eq!(stats.today_workouts, 1);

        let recent = db.recent_workouts(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].config, config);
        assert!(recent[0].completed);
    }

    #[test]
    fn stopped_workout_is_not_completed() {
        let db = Database::open_memory().unwrap();
        let config = TimerConfiguration::new(30, 0, 0, 1, 1);
        let mut timer = IntervalTimer::start(config).unwrap();
        timer.tick();
        let state = timer.stop();

        let now = Utc::now();
        db.record_workout(&config, &state, now, now).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total_workouts, 1);
        assert_eq!(stats.completed_workouts, 0);
        assert_eq!(stats.total_elapsed_secs, 1);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("getfit.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
