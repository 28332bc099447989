//! Calendar collaborator contract.
//!
//! The core never talks to a calendar provider directly. A [`CalendarSource`]
//! hands over a [`CalendarSnapshot`] of today's real meetings; an unavailable
//! calendar (access denied, no provider) is the empty snapshot.

mod meeting;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::timer::WorkHoursGate;

pub use meeting::CalendarEntry;

/// A meeting reduced to the span it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSpan {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl MeetingSpan {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Local>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Point-in-time view of the user's meetings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    pub is_in_meeting: bool,
    pub current_meeting_end: Option<DateTime<Local>>,
    pub next_meeting_start: Option<DateTime<Local>>,
    /// Sorted by start time.
    pub todays_meetings: Vec<MeetingSpan>,
}

impl CalendarSnapshot {
    /// Snapshot used when no calendar data is available.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Derive a snapshot from today's meeting spans.
    pub fn from_meetings(now: DateTime<Local>, mut meetings: Vec<MeetingSpan>) -> Self {
        meetings.sort_by_key(|m| m.start);

        let current_meeting_end = meetings
            .iter()
            .filter(|m| m.contains(now))
            .map(|m| m.end)
            .max();
        let next_meeting_start = meetings
            .iter()
            .map(|m| m.start)
            .filter(|start| *start > now)
            .min();

        Self {
            is_in_meeting: current_meeting_end.is_some(),
            current_meeting_end,
            next_meeting_start,
            todays_meetings: meetings,
        }
    }

    /// Filter raw calendar entries down to real meetings on `now`'s day,
    /// restricted to the work window when a gate is given.
    pub fn from_entries(
        now: DateTime<Local>,
        entries: &[CalendarEntry],
        gate: Option<&WorkHoursGate>,
    ) -> Self {
        let today = now.date_naive();
        let meetings = entries
            .iter()
            .filter(|e| e.start.date_naive() == today)
            .filter(|e| e.is_real_meeting())
            .filter(|e| gate.map_or(true, |g| e.overlaps_work_window(g.config())))
            .map(CalendarEntry::span)
            .collect();
        Self::from_meetings(now, meetings)
    }

    pub fn meeting_count(&self) -> usize {
        self.todays_meetings.len()
    }
}

/// Provider of calendar snapshots.
pub trait CalendarSource: Send + Sync {
    fn snapshot(&self, now: DateTime<Local>) -> CalendarSnapshot;
}

/// Source used when calendar access is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalendar;

impl CalendarSource for NoCalendar {
    fn snapshot(&self, _now: DateTime<Local>) -> CalendarSnapshot {
        CalendarSnapshot::unavailable()
    }
}

/// Fixed list of entries, filtered on every snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    entries: Vec<CalendarEntry>,
    gate: Option<WorkHoursGate>,
}

impl StaticCalendar {
    pub fn new(entries: Vec<CalendarEntry>) -> Self {
        Self {
            entries,
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: WorkHoursGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl CalendarSource for StaticCalendar {
    fn snapshot(&self, now: DateTime<Local>) -> CalendarSnapshot {
        CalendarSnapshot::from_entries(now, &self.entries, self.gate.as_ref())
    }
}
