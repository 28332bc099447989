//! Work-hours gate.
//!
//! Decides whether a reminder may ring at a given local wall-clock moment,
//! and when the next permitted window opens. Pure functions of the
//! configured window; nothing here mutates.

use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Monday through Friday.
pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// The weekday + time-of-day range during which reminders may fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHoursConfig {
    /// Start of the window, minutes since local midnight (inclusive).
    pub start_minute: u16,
    /// End of the window, minutes since local midnight (exclusive).
    pub end_minute: u16,
    pub work_days: Vec<Weekday>,
}

impl WorkHoursConfig {
    /// Build a validated window.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `work_days` is empty, either
    /// bound is past 23:59, or `start_minute >= end_minute`.
    pub fn new(
        start_minute: u16,
        end_minute: u16,
        work_days: Vec<Weekday>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            start_minute,
            end_minute,
            work_days,
        };
        config.validate()?;
        Ok(config)
    }

    /// Monday to Friday between the given minutes of day.
    pub fn weekdays(start_minute: u16, end_minute: u16) -> Result<Self, ConfigError> {
        Self::new(start_minute, end_minute, WEEKDAYS.to_vec())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_days.is_empty() {
            return Err(ConfigError::invalid(
                "work_hours.days",
                "at least one work day is required",
            ));
        }
        if self.start_minute >= MINUTES_PER_DAY || self.end_minute >= MINUTES_PER_DAY {
            return Err(ConfigError::invalid(
                "work_hours",
                format!(
                    "minutes of day must be below {MINUTES_PER_DAY} (got {}..{})",
                    self.start_minute, self.end_minute
                ),
            ));
        }
        if self.start_minute >= self.end_minute {
            return Err(ConfigError::invalid(
                "work_hours",
                format!(
                    "start ({}) must be before end ({})",
                    format_minute_of_day(self.start_minute),
                    format_minute_of_day(self.end_minute)
                ),
            ));
        }
        Ok(())
    }

    pub fn is_work_day(&self, day: Weekday) -> bool {
        self.work_days.contains(&day)
    }
}

impl Default for WorkHoursConfig {
    fn default() -> Self {
        Self {
            start_minute: 9 * 60,
            end_minute: 17 * 60,
            work_days: WEEKDAYS.to_vec(),
        }
    }
}

/// Gate consulted by the scheduler and the meeting monitor before ringing.
#[derive(Debug, Clone)]
pub struct WorkHoursGate {
    config: WorkHoursConfig,
}

impl WorkHoursGate {
    /// # Errors
    ///
    /// Rejects the same configurations as [`WorkHoursConfig::validate`].
    pub fn new(config: WorkHoursConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkHoursConfig {
        &self.config
    }

    /// True iff `now` falls on a work day and inside `[start, end)`.
    pub fn is_within_work_hours(&self, now: DateTime<Local>) -> bool {
        let minute = minute_of_day(now.time());
        self.config.is_work_day(now.weekday())
            && minute >= self.config.start_minute
            && minute < self.config.end_minute
    }

    /// The first window opening strictly after `now`.
    ///
    /// Scans today and the following seven days, so a single configured
    /// work day still resolves to next week's occurrence. Returns `None`
    /// only if every candidate start falls into a DST gap.
    pub fn next_work_hour_start(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let today = now.date_naive();
        let start = NaiveTime::from_hms_opt(
            u32::from(self.config.start_minute / 60),
            u32::from(self.config.start_minute % 60),
            0,
        )?;

        (0..=7)
            .map(|offset| today + Duration::days(offset))
            .filter(|date| self.config.is_work_day(date.weekday()))
            .filter_map(|date| Local.from_local_datetime(&date.and_time(start)).earliest())
            .find(|candidate| *candidate > now)
    }
}

pub fn minute_of_day(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Parse `"HH:MM"` into minutes since midnight.
pub fn parse_minute_of_day(value: &str) -> Option<u16> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()?;
    Some(minute_of_day(time))
}

pub fn format_minute_of_day(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
