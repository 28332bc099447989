use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::Recommendation;
use crate::monitor::{SuppressCause, TriggerReason};
use crate::timer::SchedulerState;

/// How a pending reminder was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakOutcome {
    Completed,
    Skipped,
    Dismissed,
}

/// Every state change in the system produces an Event.
/// The presentation layer renders them; nothing in the core does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Regular interval fire. The reminder is pending until cleared.
    ReminderFired {
        reminder_id: Uuid,
        interval_secs: u32,
        next_fire_at: DateTime<Local>,
        at: DateTime<Local>,
    },
    /// Out-of-band fire from the meeting monitor.
    SmartTrigger {
        reminder_id: Uuid,
        reason: TriggerReason,
        next_fire_at: DateTime<Local>,
        at: DateTime<Local>,
    },
    /// Fire time fell outside work hours; nothing was surfaced.
    ReminderDeferred {
        next_fire_at: DateTime<Local>,
        at: DateTime<Local>,
    },
    /// Fire time was missed by a whole interval (e.g. the machine slept)
    /// and the grid was re-anchored instead of firing.
    Rescheduled {
        next_fire_at: DateTime<Local>,
        at: DateTime<Local>,
    },
    TriggerSuppressed {
        reason: TriggerReason,
        cause: SuppressCause,
        at: DateTime<Local>,
    },
    ReminderCleared {
        reminder_id: Option<Uuid>,
        outcome: BreakOutcome,
        at: DateTime<Local>,
    },
    IntervalAdjusted {
        from_secs: u32,
        to_secs: u32,
        at: DateTime<Local>,
    },
    SchedulerPaused {
        at: DateTime<Local>,
    },
    SchedulerResumed {
        next_fire_at: DateTime<Local>,
        at: DateTime<Local>,
    },
    Snoozed {
        until: DateTime<Local>,
        at: DateTime<Local>,
    },
    WaterLogged {
        intake_glasses: u32,
        goal_glasses: u32,
        streak_days: u32,
        at: DateTime<Local>,
    },
    Suggestion {
        reminder_id: Option<Uuid>,
        recommendation: Recommendation,
        at: DateTime<Local>,
    },
    StateSnapshot {
        state: SchedulerState,
        next_fire_at: DateTime<Local>,
        seconds_remaining: i64,
        interval_secs: u32,
        reminder_pending: bool,
        within_work_hours: bool,
        water_intake_glasses: u32,
        at: DateTime<Local>,
    },
}

impl Event {
    /// Timestamp carried by every variant.
    pub fn at(&self) -> DateTime<Local> {
        match self {
            Event::ReminderFired { at, .. }
            | Event::SmartTrigger { at, .. }
            | Event::ReminderDeferred { at, .. }
            | Event::Rescheduled { at, .. }
            | Event::TriggerSuppressed { at, .. }
            | Event::ReminderCleared { at, .. }
            | Event::IntervalAdjusted { at, .. }
            | Event::SchedulerPaused { at }
            | Event::SchedulerResumed { at, .. }
            | Event::Snoozed { at, .. }
            | Event::WaterLogged { at, .. }
            | Event::Suggestion { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }

    /// Id of the reminder this event surfaces, for fire events.
    pub fn surfaced_reminder(&self) -> Option<Uuid> {
        match self {
            Event::ReminderFired { reminder_id, .. } | Event::SmartTrigger { reminder_id, .. } => {
                Some(*reminder_id)
            }
            _ => None,
        }
    }
}
