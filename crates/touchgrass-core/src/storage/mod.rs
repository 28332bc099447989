mod config;

pub use config::{AdaptiveConfig, Config, ReminderConfig, WaterConfig, WorkHoursSettings};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `<config_dir>/touchgrass[-dev]/` based on TOUCHGRASS_ENV.
///
/// Set TOUCHGRASS_ENV=dev to use the development directory, or
/// TOUCHGRASS_CONFIG_DIR to point somewhere else entirely. The directory
/// is created on first save, not here.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("TOUCHGRASS_CONFIG_DIR") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let env = std::env::var("TOUCHGRASS_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("touchgrass-dev")
    } else {
        base_dir.join("touchgrass")
    })
}
