//! Adaptive interval controller.
//!
//! Tightens the reminder interval for users who keep completing breaks and
//! backs off for users who keep skipping them. The interval never leaves
//! `[min_interval_secs, max_interval_secs]`.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Maximum number of completion timestamps kept.
pub const COMPLETION_HISTORY_LEN: usize = 10;
/// Step applied on every adjustment.
pub const ADJUSTMENT_STEP_SECS: u32 = 5 * 60;
/// Skips in a row that trigger a back-off.
pub const SKIPS_BEFORE_BACKOFF: u32 = 3;
/// Completions inside this trailing window count as "engaged".
const ENGAGEMENT_WINDOW_SECS: i64 = 3600;
const ENGAGED_COMPLETIONS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveInterval {
    interval_secs: u32,
    min_interval_secs: u32,
    max_interval_secs: u32,
    recent_completions: VecDeque<DateTime<Local>>,
    consecutive_skips: u32,
}

impl AdaptiveInterval {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `min > max`, when either
    /// bound is zero, or when `interval_secs` lies outside the bounds.
    pub fn new(
        interval_secs: u32,
        min_interval_secs: u32,
        max_interval_secs: u32,
    ) -> Result<Self, ConfigError> {
        validate_bounds(interval_secs, min_interval_secs, max_interval_secs)?;
        Ok(Self {
            interval_secs,
            min_interval_secs,
            max_interval_secs,
            recent_completions: VecDeque::with_capacity(COMPLETION_HISTORY_LEN),
            consecutive_skips: 0,
        })
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min_interval_secs, self.max_interval_secs)
    }

    pub fn consecutive_skips(&self) -> u32 {
        self.consecutive_skips
    }

    pub fn recent_completions(&self) -> impl Iterator<Item = &DateTime<Local>> {
        self.recent_completions.iter()
    }

    /// Replace the interval after an explicit reconfiguration.
    pub fn set_interval(&mut self, interval_secs: u32) -> Result<(), ConfigError> {
        validate_bounds(interval_secs, self.min_interval_secs, self.max_interval_secs)?;
        self.interval_secs = interval_secs;
        Ok(())
    }

    /// Record a completed break. Returns the interval after adjustment.
    pub fn on_completed(&mut self, now: DateTime<Local>) -> u32 {
        if self.recent_completions.len() == COMPLETION_HISTORY_LEN {
            self.recent_completions.pop_front();
        }
        self.recent_completions.push_back(now);
        self.consecutive_skips = 0;

        let window_start = now - Duration::seconds(ENGAGEMENT_WINDOW_SECS);
        let engaged = self
            .recent_completions
            .iter()
            .filter(|ts| **ts > window_start && **ts <= now)
            .count();

        if engaged >= ENGAGED_COMPLETIONS {
            let next = self
                .interval_secs
                .saturating_sub(ADJUSTMENT_STEP_SECS)
                .max(self.min_interval_secs);
            if next != self.interval_secs {
                debug!(from = self.interval_secs, to = next, engaged, "tightening interval");
            }
            self.interval_secs = next;
        }
        self.interval_secs
    }

    /// Record a skipped break. Returns the interval after adjustment.
    pub fn on_skipped(&mut self) -> u32 {
        self.consecutive_skips += 1;
        if self.consecutive_skips >= SKIPS_BEFORE_BACKOFF {
            let next = self
                .interval_secs
                .saturating_add(ADJUSTMENT_STEP_SECS)
                .min(self.max_interval_secs);
            if next != self.interval_secs {
                debug!(from = self.interval_secs, to = next, "backing off interval");
            }
            self.interval_secs = next;
            self.consecutive_skips = 0;
        }
        self.interval_secs
    }
}

fn validate_bounds(interval: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if min == 0 {
        return Err(ConfigError::invalid(
            "adaptive.min_interval_minutes",
            "must be greater than zero",
        ));
    }
    if min > max {
        return Err(ConfigError::invalid(
            "adaptive",
            format!("minimum interval ({min}s) exceeds maximum ({max}s)"),
        ));
    }
    if interval < min || interval > max {
        return Err(ConfigError::invalid(
            "reminder.interval_minutes",
            format!("{interval}s lies outside adaptive bounds {min}s..={max}s"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const MIN: u32 = 60;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 14, h, m, 0).single().unwrap()
    }

    #[test]
    fn engaged_user_gets_tighter_interval() {
        let mut ctl = AdaptiveInterval::new(45 * MIN, 15 * MIN, 90 * MIN).unwrap();
        // One completion alone does not count as engagement.
        assert_eq!(ctl.on_completed(at(10, 0)), 45 * MIN);
        assert_eq!(ctl.on_completed(at(10, 20)), 40 * MIN);
    }

    #[test]
    fn three_completions_in_the_hour_then_one_more_tightens_to_forty() {
        let mut ctl = AdaptiveInterval::new(45 * MIN, 40 * MIN, 90 * MIN).unwrap();
        ctl.on_completed(at(10, 0));
        ctl.on_completed(at(10, 15));
        ctl.on_completed(at(10, 30));
        assert_eq!(ctl.interval_secs(), 40 * MIN);
        // Already at the floor.
        assert_eq!(ctl.on_completed(at(10, 45)), 40 * MIN);
    }

    #[test]
    fn completions_outside_the_hour_do_not_count() {
        let mut ctl = AdaptiveInterval::new(45 * MIN, 15 * MIN, 90 * MIN).unwrap();
        ctl.on_completed(at(9, 0));
        assert_eq!(ctl.on_completed(at(10, 30)), 45 * MIN);
    }

    #[test]
    fn three_skips_back_off_and_reset_counter() {
        let mut ctl = AdaptiveInterval::new(30 * MIN, 15 * MIN, 90 * MIN).unwrap();
        assert_eq!(ctl.on_skipped(), 30 * MIN);
        assert_eq!(ctl.on_skipped(), 30 * MIN);
        assert_eq!(ctl.on_skipped(), 35 * MIN);
        assert_eq!(ctl.consecutive_skips(), 0);
    }

    #[test]
    fn back_off_is_capped() {
        let mut ctl = AdaptiveInterval::new(88 * MIN, 15 * MIN, 90 * MIN).unwrap();
        for _ in 0..3 {
            ctl.on_skipped();
        }
        assert_eq!(ctl.interval_secs(), 90 * MIN);
    }

    #[test]
    fn completion_resets_skip_streak() {
        let mut ctl = AdaptiveInterval::new(30 * MIN, 15 * MIN, 90 * MIN).unwrap();
        ctl.on_skipped();
        ctl.on_skipped();
        ctl.on_completed(at(10, 0));
        assert_eq!(ctl.on_skipped(), 30 * MIN);
    }

    #[test]
    fn history_is_bounded() {
        let mut ctl = AdaptiveInterval::new(30 * MIN, 15 * MIN, 90 * MIN).unwrap();
        for i in 0..15 {
            ctl.on_completed(at(8, 0) + Duration::minutes(i * 30));
        }
        assert_eq!(ctl.recent_completions().count(), COMPLETION_HISTORY_LEN);
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert!(AdaptiveInterval::new(30 * MIN, 45 * MIN, 30 * MIN).is_err());
        assert!(AdaptiveInterval::new(10 * MIN, 15 * MIN, 90 * MIN).is_err());
        assert!(AdaptiveInterval::new(0, 0, 90 * MIN).is_err());
    }

    proptest! {
        #[test]
        fn interval_stays_within_bounds(
            events in proptest::collection::vec(any::<bool>(), 0..200),
            start in 15u32..=90,
        ) {
            let mut ctl = AdaptiveInterval::new(start * MIN, 15 * MIN, 90 * MIN).unwrap();
            let mut now = at(8, 0);
            for completed in events {
                now += Duration::minutes(7);
                let interval = if completed { ctl.on_completed(now) } else { ctl.on_skipped() };
                prop_assert!(interval >= 15 * MIN && interval <= 90 * MIN);
            }
        }
    }
}
