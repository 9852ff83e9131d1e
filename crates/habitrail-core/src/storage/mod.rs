mod config;
pub mod store;

pub use config::{AnalyticsSettings, Settings};
pub use store::{MemoryStore, RecordStore};

use std::path::PathBuf;

/// Returns `~/.config/habitrail[-dev]/` based on HABITRAIL_ENV.
///
/// Set HABITRAIL_ENV=dev to use the development data directory, or
/// HABITRAIL_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var("HABITRAIL_DATA_DIR") {
        Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITRAIL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitrail-dev")
            } else {
                base_dir.join("habitrail")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
