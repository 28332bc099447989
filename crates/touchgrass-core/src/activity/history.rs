//! Record of completed breaks.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::context::CompletedActivity;

/// Read side the recommendation context is built from.
pub trait ActivityHistory: Send + Sync {
    /// Activities completed on the same local day as `now`.
    fn todays_activities(&self, now: DateTime<Local>) -> Vec<CompletedActivity>;

    /// Consecutive days, ending today or yesterday, with at least one
    /// completed activity.
    fn current_streak_days(&self, _now: DateTime<Local>) -> u32 {
        0
    }
}

/// In-memory history, oldest entry first. Pruned days survive only as the
/// run of consecutive active days they belonged to, which is all the streak
/// needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: Vec<CompletedActivity>,
    /// First and last day of the most recent pruned run.
    #[serde(default)]
    settled_run: Option<(NaiveDate, NaiveDate)>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, activity: CompletedActivity) {
        let pos = self
            .entries
            .partition_point(|e| e.completed_at <= activity.completed_at);
        self.entries.insert(pos, activity);
    }

    /// Drop entries from before `cutoff`, folding their days into the
    /// settled run.
    pub fn prune_before(&mut self, cutoff: NaiveDate) {
        let pruned: BTreeSet<NaiveDate> = self
            .entries
            .iter()
            .map(|e| e.completed_at.date_naive())
            .filter(|day| *day < cutoff)
            .collect();
        for day in pruned {
            self.settled_run = match self.settled_run {
                Some((first, last)) if day == last + Duration::days(1) => Some((first, day)),
                Some((first, last)) if day <= last => Some((first.min(day), last)),
                _ => Some((day, day)),
            };
        }
        self.entries.retain(|e| e.completed_at.date_naive() >= cutoff);
    }

    pub fn last_completed_at(&self) -> Option<DateTime<Local>> {
        self.entries.last().map(|e| e.completed_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn in_settled_run(&self, day: NaiveDate) -> bool {
        self.settled_run
            .is_some_and(|(first, last)| first <= day && day <= last)
    }
}

impl ActivityHistory for ActivityLog {
    fn todays_activities(&self, now: DateTime<Local>) -> Vec<CompletedActivity> {
        let today = now.date_naive();
        self.entries
            .iter()
            .filter(|e| e.completed_at.date_naive() == today)
            .cloned()
            .collect()
    }

    fn current_streak_days(&self, now: DateTime<Local>) -> u32 {
        let days: BTreeSet<NaiveDate> = self
            .entries
            .iter()
            .map(|e| e.completed_at.date_naive())
            .collect();
        let active = |day: &NaiveDate| days.contains(day) || self.in_settled_run(*day);

        let today = now.date_naive();
        let mut day = if active(&today) {
            today
        } else {
            today - Duration::days(1)
        };

        let mut streak = 0;
        while active(&day) {
            if !days.contains(&day) {
                if let Some((first, _)) = self.settled_run {
                    let rest = (day - first).num_days() + 1;
                    return streak + u32::try_from(rest).unwrap_or(u32::MAX);
                }
            }
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }
}
