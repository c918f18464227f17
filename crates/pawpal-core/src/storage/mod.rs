mod config;

pub use config::Config;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/pawpal[-dev]/` based on PAWPAL_ENV.
///
/// Set PAWPAL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("PAWPAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pawpal-dev")
    } else {
        base_dir.join("pawpal")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
