mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, Settings};
pub use database::{Database, SESSIONS_KEY};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the application data directory, creating it if needed.
///
/// `TODOPRO_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/todopro[-dev]/`, with the `-dev` suffix when `TODOPRO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TODOPRO_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TODOPRO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("todopro-dev")
            } else {
                base_dir.join("todopro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
