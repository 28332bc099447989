//! Meeting-aware interrupt monitor.
//!
//! Runs on a coarse tick and decides whether the end of a meeting is a good
//! moment for an out-of-band reminder. The monitor only decides; the owner
//! applies an accepted trigger to the scheduler.
//!
//! ## Trigger rules
//!
//! 1. In a meeting on the previous tick, not now: fire when the gap to the
//!    next meeting is at least [`MonitorConfig::min_gap`], or when there is
//!    no next meeting.
//! 2. Otherwise, if a run of two or more abutting meetings ended within the
//!    lookback window, fire under the same gap rule.
//! 3. Any trigger is suppressed while a reminder is pending, while the
//!    scheduler is paused, outside work hours, or within
//!    [`MonitorConfig::trigger_spacing`] of the previous trigger.

use std::fmt;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{CalendarSnapshot, MeetingSpan};

/// Cadence of the monitor tick.
pub const MONITOR_TICK_SECS: u64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Minimum free time before the next meeting for a trigger.
    pub min_gap: Duration,
    /// Minimum time between two triggers of any kind.
    pub trigger_spacing: Duration,
    /// How far back a meeting end still counts as "just ended".
    pub lookback: Duration,
    /// Meetings separated by less than this count as back-to-back.
    pub back_to_back_gap: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            min_gap: Duration::minutes(10),
            trigger_spacing: Duration::minutes(15),
            lookback: Duration::minutes(15),
            back_to_back_gap: Duration::minutes(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTransitionState {
    pub was_in_meeting: bool,
    pub last_meeting_end_at: Option<DateTime<Local>>,
    pub last_trigger_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    MeetingEndedGapAvailable,
    MeetingsDoneForNow,
    BackToBackMeetingsEnded,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::MeetingEndedGapAvailable => write!(f, "meeting ended, gap available"),
            TriggerReason::MeetingsDoneForNow => write!(f, "meetings done for now"),
            TriggerReason::BackToBackMeetingsEnded => write!(f, "back-to-back meetings ended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressCause {
    ReminderPending,
    SchedulerPaused,
    OutsideWorkHours,
    TooSoonSinceLastTrigger,
}

/// Facts about the rest of the system the monitor must respect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorGuards {
    pub reminder_pending: bool,
    pub scheduler_paused: bool,
    pub within_work_hours: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorDecision {
    NoTrigger,
    Trigger(TriggerReason),
    Suppressed {
        reason: TriggerReason,
        cause: SuppressCause,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MeetingMonitor {
    config: MonitorConfig,
    state: MeetingTransitionState,
}

impl MeetingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            config,
            state: MeetingTransitionState::default(),
        }
    }

    pub fn state(&self) -> &MeetingTransitionState {
        &self.state
    }

    /// Note a reminder that reached the user, regular or smart.
    pub fn record_trigger(&mut self, at: DateTime<Local>) {
        self.state.last_trigger_at = Some(at);
    }

    /// Track meeting presence without evaluating triggers.
    pub fn observe(&mut self, snapshot: &CalendarSnapshot) {
        self.state.was_in_meeting = snapshot.is_in_meeting;
    }

    /// Evaluate one monitor tick.
    pub fn evaluate(
        &mut self,
        now: DateTime<Local>,
        snapshot: &CalendarSnapshot,
        guards: MonitorGuards,
    ) -> MonitorDecision {
        let candidate = if self.state.was_in_meeting && !snapshot.is_in_meeting {
            self.state.last_meeting_end_at = Some(now);
            self.gap_qualifies(now, snapshot).then(|| {
                if snapshot.next_meeting_start.is_some() {
                    TriggerReason::MeetingEndedGapAvailable
                } else {
                    TriggerReason::MeetingsDoneForNow
                }
            })
        } else if !snapshot.is_in_meeting {
            self.back_to_back_candidate(now, snapshot)
        } else {
            None
        };
        self.state.was_in_meeting = snapshot.is_in_meeting;

        let Some(reason) = candidate else {
            return MonitorDecision::NoTrigger;
        };

        if let Some(cause) = self.suppression(now, guards) {
            debug!(%reason, ?cause, "smart trigger suppressed");
            return MonitorDecision::Suppressed { reason, cause };
        }

        info!(%reason, "smart trigger accepted");
        self.state.last_trigger_at = Some(now);
        MonitorDecision::Trigger(reason)
    }

    fn gap_qualifies(&self, now: DateTime<Local>, snapshot: &CalendarSnapshot) -> bool {
        match snapshot.next_meeting_start {
            Some(start) => start - now >= self.config.min_gap,
            None => true,
        }
    }

    /// Look for a run of abutting meetings whose last member ended within
    /// the lookback window. The most recently ended meeting anchors the
    /// backward count.
    fn back_to_back_candidate(
        &mut self,
        now: DateTime<Local>,
        snapshot: &CalendarSnapshot,
    ) -> Option<TriggerReason> {
        let mut meetings: Vec<MeetingSpan> = snapshot.todays_meetings.clone();
        meetings.sort_by_key(|m| m.start);

        let window_start = now - self.config.lookback;
        let (index, ended) = meetings
            .iter()
            .enumerate()
            .filter(|(_, m)| m.end <= now && m.end > window_start)
            .max_by_key(|(_, m)| m.end)
            .map(|(i, m)| (i, *m))?;

        if self
            .state
            .last_meeting_end_at
            .is_some_and(|handled| handled >= ended.end)
        {
            return None;
        }
        self.state.last_meeting_end_at = Some(ended.end);

        let mut consecutive = 1;
        let mut current = ended;
        for previous in meetings[..index].iter().rev() {
            if current.start - previous.end < self.config.back_to_back_gap {
                consecutive += 1;
                current = *previous;
            } else {
                break;
            }
        }
        debug!(consecutive, ended_at = %ended.end, "meeting run ended");

        (consecutive >= 2 && self.gap_qualifies(now, snapshot))
            .then_some(TriggerReason::BackToBackMeetingsEnded)
    }

    fn suppression(&self, now: DateTime<Local>, guards: MonitorGuards) -> Option<SuppressCause> {
        if guards.reminder_pending {
            return Some(SuppressCause::ReminderPending);
        }
        if guards.scheduler_paused {
            return Some(SuppressCause::SchedulerPaused);
        }
        if !guards.within_work_hours {
            return Some(SuppressCause::OutsideWorkHours);
        }
        if self
            .state
            .last_trigger_at
            .is_some_and(|last| now - last < self.config.trigger_spacing)
        {
            return Some(SuppressCause::TooSoonSinceLastTrigger);
        }
        None
    }
}
