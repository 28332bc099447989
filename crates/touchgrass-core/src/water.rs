//! Daily water intake tracking.

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Glasses logged per day against a goal, with a streak of days the goal
/// was met. The day rolls over at local midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterTracker {
    pub enabled: bool,
    pub daily_goal: u32,
    current_intake: u32,
    streak: u32,
    day: NaiveDate,
    goal_met_today: bool,
}

impl WaterTracker {
    pub fn new(now: DateTime<Local>, enabled: bool, daily_goal: u32) -> Self {
        Self {
            enabled,
            daily_goal,
            current_intake: 0,
            streak: 0,
            day: now.date_naive(),
            goal_met_today: false,
        }
    }

    pub fn current_intake(&self) -> u32 {
        self.current_intake
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Intake for the day containing `now`; zero once that day has moved on.
    pub fn intake_on(&self, now: DateTime<Local>) -> u32 {
        if now.date_naive() == self.day {
            self.current_intake
        } else {
            0
        }
    }

    pub fn goal_met(&self) -> bool {
        self.daily_goal > 0 && self.current_intake >= self.daily_goal
    }

    /// Add `glasses` to today's intake. Returns the new total.
    pub fn log_water(&mut self, now: DateTime<Local>, glasses: u32) -> u32 {
        self.roll_over(now);
        self.current_intake = self.current_intake.saturating_add(glasses);
        debug!(intake = self.current_intake, goal = self.daily_goal, "water logged");

        if !self.goal_met_today && self.goal_met() {
            self.goal_met_today = true;
            self.streak += 1;
            info!(streak = self.streak, "daily water goal reached");
        }
        self.current_intake
    }

    /// Start a new day if `now` is past the tracked one. A missed goal, or a
    /// skipped day, breaks the streak.
    pub fn roll_over(&mut self, now: DateTime<Local>) {
        let today = now.date_naive();
        if today <= self.day {
            return;
        }
        let consecutive = today - self.day == Duration::days(1);
        if !(consecutive && self.goal_met_today) {
            self.streak = 0;
        }
        self.day = today;
        self.current_intake = 0;
        self.goal_met_today = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn on(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, day, hour, 0, 0).single().unwrap()
    }

    #[test]
    fn intake_accumulates_and_resets_at_midnight() {
        let mut water = WaterTracker::new(on(14, 8), true, 8);
        assert_eq!(water.log_water(on(14, 9), 1), 1);
        assert_eq!(water.log_water(on(14, 11), 2), 3);
        assert_eq!(water.intake_on(on(15, 0)), 0);
        water.roll_over(on(15, 0));
        assert_eq!(water.current_intake(), 0);
    }

    #[test]
    fn streak_grows_once_per_day() {
        let mut water = WaterTracker::new(on(14, 8), true, 2);
        water.log_water(on(14, 9), 2);
        water.log_water(on(14, 10), 1);
        assert_eq!(water.streak(), 1);

        water.log_water(on(15, 9), 2);
        assert_eq!(water.streak(), 2);
    }

    #[test]
    fn missed_goal_breaks_streak() {
        let mut water = WaterTracker::new(on(14, 8), true, 2);
        water.log_water(on(14, 9), 2);
        water.log_water(on(15, 9), 1);
        water.roll_over(on(16, 7));
        assert_eq!(water.streak(), 0);
    }

    #[test]
    fn skipped_day_breaks_streak() {
        let mut water = WaterTracker::new(on(14, 8), true, 1);
        water.log_water(on(14, 9), 1);
        water.log_water(on(16, 9), 1);
        assert_eq!(water.streak(), 1);
    }

    #[test]
    fn zero_goal_never_counts() {
        let mut water = WaterTracker::new(on(14, 8), true, 0);
        water.log_water(on(14, 9), 3);
        assert!(!water.goal_met());
        assert_eq!(water.streak(), 0);
    }
}
