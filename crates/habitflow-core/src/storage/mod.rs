mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DashboardConfig, HabitDefaults, ProfileConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// - `HABITFLOW_DATA_DIR` when set
/// - `~/.config/habitflow-dev/` when `HABITFLOW_ENV=dev`
/// - `~/.config/habitflow/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("HABITFLOW_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitflow-dev")
            } else {
                base_dir.join("habitflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
