//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Reminder interval, snooze length and feature switches
//! - Adaptive interval bounds
//! - Work-hours window
//! - Daily water goal
//!
//! Configuration is stored at `<config_dir>/touchgrass/config.toml`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::config_dir;
use crate::error::ConfigError;
use crate::timer::{
    parse_minute_of_day, AdaptiveInterval, WorkHoursConfig, WorkHoursGate,
    WEEKDAYS,
};

const CONFIG_FILE: &str = "config.toml";

/// Reminder cadence and feature switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_true")]
    pub adaptive_enabled: bool,
    /// Meeting-aware early reminders.
    #[serde(default = "default_true")]
    pub smart_scheduling_enabled: bool,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
}

/// Range the adaptive controller may move the interval within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    #[serde(default = "default_min_interval_minutes")]
    pub min_interval_minutes: u32,
    #[serde(default = "default_max_interval_minutes")]
    pub max_interval_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkHoursSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// "HH:MM", local time.
    #[serde(default = "default_work_start")]
    pub start: String,
    #[serde(default = "default_work_end")]
    pub end: String,
    #[serde(default = "default_work_days")]
    pub days: Vec<Weekday>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_daily_goal_glasses")]
    pub daily_goal_glasses: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<config_dir>/touchgrass/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub work_hours: WorkHoursSettings,
    #[serde(default)]
    pub water: WaterConfig,
}

// Default functions
fn default_interval_minutes() -> u32 {
    30
}
fn default_snooze_minutes() -> u32 {
    10
}
fn default_min_interval_minutes() -> u32 {
    15
}
fn default_max_interval_minutes() -> u32 {
    90
}
fn default_work_start() -> String {
    "09:00".into()
}
fn default_work_end() -> String {
    "17:00".into()
}
fn default_work_days() -> Vec<Weekday> {
    WEEKDAYS.to_vec()
}
fn default_daily_goal_glasses() -> u32 {
    8
}
fn default_true() -> bool {
    true
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            adaptive_enabled: true,
            smart_scheduling_enabled: true,
            snooze_minutes: default_snooze_minutes(),
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_interval_minutes: default_min_interval_minutes(),
            max_interval_minutes: default_max_interval_minutes(),
        }
    }
}

impl Default for WorkHoursSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            start: default_work_start(),
            end: default_work_end(),
            days: default_work_days(),
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_goal_glasses: default_daily_goal_glasses(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| ConfigError::invalid(key, format!("cannot parse '{value}' as bool")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| {
                        ConfigError::invalid(key, format!("cannot parse '{value}' as a whole number"))
                    })?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value)
                        .map_err(|e| ConfigError::invalid(key, e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `config.toml` inside [`config_dir`].
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join(CONFIG_FILE))
    }

    /// Load from the default location. A missing file yields (and writes)
    /// the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load and validate the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result must still
    /// validate; on error `self` is left untouched. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every constraint the runtime components enforce at
    /// construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.work_hours_config()?;
        self.adaptive_interval()?;
        if self.reminder.snooze_minutes == 0 {
            return Err(ConfigError::invalid(
                "reminder.snooze_minutes",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    // ── Component views ──────────────────────────────────────────────

    pub fn interval_secs(&self) -> u32 {
        self.reminder.interval_minutes.saturating_mul(60)
    }

    pub fn work_hours_config(&self) -> Result<WorkHoursConfig, ConfigError> {
        let start = parse_minute_of_day(&self.work_hours.start).ok_or_else(|| {
            ConfigError::invalid(
                "work_hours.start",
                format!("expected HH:MM, got '{}'", self.work_hours.start),
            )
        })?;
        let end = parse_minute_of_day(&self.work_hours.end).ok_or_else(|| {
            ConfigError::invalid(
                "work_hours.end",
                format!("expected HH:MM, got '{}'", self.work_hours.end),
            )
        })?;
        WorkHoursConfig::new(start, end, self.work_hours.days.clone())
    }

    /// `None` when the gate is switched off.
    pub fn work_hours_gate(&self) -> Result<Option<WorkHoursGate>, ConfigError> {
        if !self.work_hours.enabled {
            return Ok(None);
        }
        WorkHoursGate::new(self.work_hours_config()?).map(Some)
    }

    /// Controller seeded with the configured interval and bounds.
    pub fn adaptive_interval(&self) -> Result<AdaptiveInterval, ConfigError> {
        AdaptiveInterval::new(
            self.interval_secs(),
            self.adaptive.min_interval_minutes.saturating_mul(60),
            self.adaptive.max_interval_minutes.saturating_mul(60),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.reminder.interval_minutes, 30);
        assert!(cfg.reminder.adaptive_enabled);
        assert!(cfg.reminder.smart_scheduling_enabled);
        assert_eq!(cfg.reminder.snooze_minutes, 10);
        assert_eq!(cfg.adaptive.min_interval_minutes, 15);
        assert_eq!(cfg.adaptive.max_interval_minutes, 90);
        assert_eq!(cfg.work_hours.start, "09:00");
        assert_eq!(cfg.work_hours.days.len(), 5);
        assert_eq!(cfg.water.daily_goal_glasses, 8);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str("[reminder]\ninterval_minutes = 45\n").unwrap();
        assert_eq!(cfg.reminder.interval_minutes, 45);
        assert_eq!(cfg.reminder.snooze_minutes, 10);
        assert_eq!(cfg.work_hours.end, "17:00");
    }

    #[test]
    fn save_and_load_through_tempdir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut cfg = Config::default();
        cfg.reminder.interval_minutes = 45;
        cfg.work_hours.days = vec![Weekday::Mon, Weekday::Sat];
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.reminder.interval_minutes, 45);
        assert_eq!(loaded.work_hours.days, vec![Weekday::Mon, Weekday::Sat]);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[work_hours]\ndays = []\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "work_hours.days"));
    }

    #[test]
    fn load_missing_file_is_load_failed() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reminder.interval_minutes").as_deref(), Some("30"));
        assert_eq!(cfg.get("work_hours.start").as_deref(), Some("09:00"));
        assert_eq!(cfg.get("water.enabled").as_deref(), Some("true"));
        assert!(cfg.get("reminder.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("reminder.interval_minutes", "45").unwrap();
        cfg.set("reminder.adaptive_enabled", "false").unwrap();
        cfg.set("work_hours.start", "08:30").unwrap();
        cfg.set("work_hours.days", r#"["Mon","Wed"]"#).unwrap();
        assert_eq!(cfg.reminder.interval_minutes, 45);
        assert!(!cfg.reminder.adaptive_enabled);
        assert_eq!(cfg.work_hours_config().unwrap().start_minute, 8 * 60 + 30);
        assert_eq!(cfg.work_hours.days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("reminder.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("reminder.adaptive_enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_rejects_values_that_fail_validation() {
        let mut cfg = Config::default();
        assert!(cfg.set("work_hours.days", "[]").is_err());
        assert!(cfg.set("work_hours.end", "08:00").is_err());
        assert!(cfg.set("adaptive.min_interval_minutes", "120").is_err());
        assert!(cfg.set("reminder.interval_minutes", "5").is_err());
        // Failed sets leave the config untouched.
        assert_eq!(cfg.work_hours.days.len(), 5);
        assert_eq!(cfg.reminder.interval_minutes, 30);
    }

    #[test]
    fn adaptive_bounds_follow_config() {
        let mut cfg = Config::default();
        cfg.adaptive.min_interval_minutes = 20;
        cfg.adaptive.max_interval_minutes = 60;
        let adaptive = cfg.adaptive_interval().unwrap();
        assert_eq!(adaptive.bounds(), (20 * 60, 60 * 60));
        assert_eq!(adaptive.interval_secs(), 30 * 60);
    }

    #[test]
    fn disabled_gate_is_none() {
        let mut cfg = Config::default();
        assert!(cfg.work_hours_gate().unwrap().is_some());
        cfg.work_hours.enabled = false;
        assert!(cfg.work_hours_gate().unwrap().is_none());
    }
}
