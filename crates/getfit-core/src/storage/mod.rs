mod config;
pub mod database;

pub use config::{CatalogConfig, Config, TimerConfig};
pub use database::{Database, Stats, UserProfile, WorkoutRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `config.toml` and `getfit.db`.
///
/// `GETFIT_DATA_DIR` wins when set. Otherwise `~/.config/getfit[-dev]/`,
/// picked by `GETFIT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("GETFIT_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GETFIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("getfit-dev")
            } else {
                base_dir.join("getfit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
