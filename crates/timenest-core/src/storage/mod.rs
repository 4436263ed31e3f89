mod config;
pub mod database;
mod focus_store;
mod settings_store;

pub use config::{Config, FocusConfig, NotificationsConfig, RemindersConfig, TaskStoreConfig};
pub use database::Database;
pub use focus_store::{FocusStore, FOCUS_STATE_KEY};
pub use settings_store::{
    ReminderSettings, SettingsStore, NOTIFICATIONS_ENABLED_KEY, VOICE_ENABLED_KEY,
};

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Returns `~/.config/timenest[-dev]/` based on TIMENEST_ENV.
///
/// Set TIMENEST_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, DatabaseError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMENEST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timenest-dev")
    } else {
        base_dir.join("timenest")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| DatabaseError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Database file name for the active profile (TIMENEST_PROFILE).
pub fn database_file_name() -> String {
    profile_file_name(std::env::var("TIMENEST_PROFILE").ok().as_deref())
}

fn profile_file_name(profile: Option<&str>) -> String {
    match profile.map(str::trim).filter(|p| !p.is_empty()) {
        Some(profile) => format!("timenest-{profile}.db"),
        None => "timenest.db".to_string(),
    }
}
