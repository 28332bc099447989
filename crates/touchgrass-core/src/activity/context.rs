//! Context snapshot consumed by the recommendation engine.

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherSnapshot;

/// Sitting longer than this counts as "sat too long".
pub const SAT_TOO_LONG_SECS: u64 = 90 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Outdoor,
    Physical,
    Mental,
    Posture,
}

impl ActivityCategory {
    /// Enumeration order, also used to break ties.
    pub const ALL: [ActivityCategory; 4] = [
        ActivityCategory::Outdoor,
        ActivityCategory::Physical,
        ActivityCategory::Mental,
        ActivityCategory::Posture,
    ];

    /// Body-movement categories.
    pub fn is_physical(self) -> bool {
        matches!(self, ActivityCategory::Physical | ActivityCategory::Posture)
    }

    fn index(self) -> usize {
        match self {
            ActivityCategory::Outdoor => 0,
            ActivityCategory::Physical => 1,
            ActivityCategory::Mental => 2,
            ActivityCategory::Posture => 3,
        }
    }
}

/// A break the user finished today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedActivity {
    pub category: ActivityCategory,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingDensity {
    Light,
    #[default]
    Normal,
    Heavy,
}

impl MeetingDensity {
    /// Light up to 2 meetings, heavy from 6.
    pub fn from_meeting_count(count: usize) -> Self {
        match count {
            0..=2 => MeetingDensity::Light,
            3..=5 => MeetingDensity::Normal,
            _ => MeetingDensity::Heavy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    EarlyMorning,
    MidMorning,
    Midday,
    EarlyAfternoon,
    LateAfternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=8 => TimeOfDay::EarlyMorning,
            9..=11 => TimeOfDay::MidMorning,
            12 => TimeOfDay::Midday,
            13..=14 => TimeOfDay::EarlyAfternoon,
            15..=17 => TimeOfDay::LateAfternoon,
            18..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// How much room the break has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Under 2 minutes.
    Micro,
    /// 2 to 5 minutes.
    Quick,
    /// 5 to 10 minutes.
    Standard,
    /// 10 minutes or more.
    Extended,
}

impl TimeWindow {
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=1 => TimeWindow::Micro,
            2..=4 => TimeWindow::Quick,
            5..=9 => TimeWindow::Standard,
            _ => TimeWindow::Extended,
        }
    }
}

/// Everything the engine may look at. Rebuilt for every recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityContext {
    pub now: DateTime<Local>,
    /// At least one minute.
    pub available_minutes: u32,
    pub weather: Option<WeatherSnapshot>,
    pub time_since_last_break_secs: u64,
    pub todays_completed: Vec<CompletedActivity>,
    pub meeting_density: MeetingDensity,
    pub next_meeting_at: Option<DateTime<Local>>,
    pub current_streak_days: u32,
    pub water_intake_glasses: u32,
    pub daily_water_goal_glasses: u32,
}

impl ActivityContext {
    /// Context with no history, no weather and no meetings.
    pub fn new(now: DateTime<Local>, available_minutes: u32) -> Self {
        Self {
            now,
            available_minutes: available_minutes.max(1),
            weather: None,
            time_since_last_break_secs: 0,
            todays_completed: Vec::new(),
            meeting_density: MeetingDensity::default(),
            next_meeting_at: None,
            current_streak_days: 0,
            water_intake_glasses: 0,
            daily_water_goal_glasses: 0,
        }
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.now.hour())
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::from_minutes(self.available_minutes.max(1))
    }

    pub fn has_sat_too_long(&self) -> bool {
        self.time_since_last_break_secs > SAT_TOO_LONG_SECS
    }

    /// Whole minutes until the next meeting, if one is known and upcoming.
    pub fn minutes_until_next_meeting(&self) -> Option<i64> {
        self.next_meeting_at
            .map(|start| (start - self.now).num_minutes())
            .filter(|minutes| *minutes >= 0)
    }

    pub fn completed_outdoor_today(&self) -> bool {
        self.todays_completed
            .iter()
            .any(|a| a.category == ActivityCategory::Outdoor)
    }

    /// Completed-activity count per category, indexed like [`ActivityCategory::ALL`].
    pub fn category_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for activity in &self.todays_completed {
            counts[activity.category.index()] += 1;
        }
        counts
    }

    /// Categories ordered from least to most represented today.
    pub fn categories_by_scarcity(&self) -> Vec<ActivityCategory> {
        let counts = self.category_counts();
        let mut categories = ActivityCategory::ALL.to_vec();
        // Stable sort keeps enumeration order on ties.
        categories.sort_by_key(|c| counts[c.index()]);
        categories
    }

    pub fn weather_is_ideal(&self) -> bool {
        self.weather.as_ref().is_some_and(WeatherSnapshot::is_ideal_for_outdoor)
    }

    pub fn weather_is_acceptable(&self) -> bool {
        self.weather
            .as_ref()
            .is_some_and(WeatherSnapshot::is_acceptable_for_outdoor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 14, h, m, 0).single().unwrap()
    }

    fn done(category: ActivityCategory) -> CompletedActivity {
        CompletedActivity {
            category,
            duration_minutes: 5,
            completed_at: at(9, 0),
        }
    }

    #[test]
    fn time_window_buckets() {
        assert_eq!(TimeWindow::from_minutes(1), TimeWindow::Micro);
        assert_eq!(TimeWindow::from_minutes(2), TimeWindow::Quick);
        assert_eq!(TimeWindow::from_minutes(5), TimeWindow::Standard);
        assert_eq!(TimeWindow::from_minutes(10), TimeWindow::Extended);
    }

    #[test]
    fn available_minutes_has_floor_of_one() {
        assert_eq!(ActivityContext::new(at(10, 0), 0).available_minutes, 1);
    }

    #[test]
    fn sat_too_long_threshold_is_exclusive() {
        let mut ctx = ActivityContext::new(at(10, 0), 5);
        ctx.time_since_last_break_secs = SAT_TOO_LONG_SECS;
        assert!(!ctx.has_sat_too_long());
        ctx.time_since_last_break_secs += 1;
        assert!(ctx.has_sat_too_long());
    }

    #[test]
    fn past_meeting_is_not_upcoming() {
        let mut ctx = ActivityContext::new(at(10, 0), 5);
        ctx.next_meeting_at = Some(at(10, 5));
        assert_eq!(ctx.minutes_until_next_meeting(), Some(5));
        ctx.next_meeting_at = Some(at(10, 0) - Duration::minutes(3));
        assert_eq!(ctx.minutes_until_next_meeting(), None);
    }

    #[test]
    fn scarcity_breaks_ties_in_enumeration_order() {
        let mut ctx = ActivityContext::new(at(10, 0), 5);
        ctx.todays_completed = vec![done(ActivityCategory::Outdoor), done(ActivityCategory::Mental)];
        assert_eq!(
            ctx.categories_by_scarcity(),
            vec![
                ActivityCategory::Physical,
                ActivityCategory::Posture,
                ActivityCategory::Outdoor,
                ActivityCategory::Mental,
            ]
        );
    }

    #[test]
    fn meeting_density_from_count() {
        assert_eq!(MeetingDensity::from_meeting_count(0), MeetingDensity::Light);
        assert_eq!(MeetingDensity::from_meeting_count(4), MeetingDensity::Normal);
        assert_eq!(MeetingDensity::from_meeting_count(7), MeetingDensity::Heavy);
    }
}
