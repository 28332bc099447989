//! Clock-aligned reminder scheduler.
//!
//! Like the rest of the timer module this is a wall-clock state machine with
//! no internal thread: the caller invokes `tick(now, ..)` about once a second.
//!
//! ## State Transitions
//!
//! ```text
//! Active --pause--> Paused --resume--> Active
//! Active|Paused --snooze--> Snoozed --fire--> Active
//! ```
//!
//! A fire recomputes `next_fire_at` before the event is handed back, so a
//! second tick at the same instant is a no-op however slow the caller is.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::schedule::schedule_aligned;
use super::work_hours::WorkHoursGate;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Active,
    Paused,
    /// Counting down to a user-chosen time; re-anchors to the grid after it fires.
    Snoozed,
}

/// Owns the single authoritative next-fire timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderScheduler {
    state: SchedulerState,
    next_fire_at: DateTime<Local>,
    interval_secs: u32,
}

impl ReminderScheduler {
    /// Starts `Active` with the next slot on the aligned grid.
    pub fn new(now: DateTime<Local>, interval_secs: u32) -> Self {
        let interval_secs = interval_secs.max(1);
        Self {
            state: SchedulerState::Active,
            next_fire_at: schedule_aligned(now, interval_secs),
            interval_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == SchedulerState::Paused
    }

    pub fn next_fire_at(&self) -> DateTime<Local> {
        self.next_fire_at
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Whole seconds until the next fire, never negative.
    pub fn seconds_remaining(&self, now: DateTime<Local>) -> i64 {
        (self.next_fire_at - now).num_seconds().max(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn pause(&mut self, now: DateTime<Local>) -> Option<Event> {
        if self.is_paused() {
            return None;
        }
        self.state = SchedulerState::Paused;
        info!("scheduler paused");
        Some(Event::SchedulerPaused { at: now })
    }

    /// Leave `Paused` and re-anchor on the grid from `now`.
    pub fn resume(&mut self, now: DateTime<Local>) -> Option<Event> {
        if !self.is_paused() {
            return None;
        }
        self.state = SchedulerState::Active;
        self.next_fire_at = schedule_aligned(now, self.interval_secs);
        info!(next_fire_at = %self.next_fire_at, "scheduler resumed");
        Some(Event::SchedulerResumed {
            next_fire_at: self.next_fire_at,
            at: now,
        })
    }

    /// Override the next fire with `now + minutes`. Also un-pauses.
    pub fn snooze(&mut self, now: DateTime<Local>, minutes: u32) -> Event {
        self.state = SchedulerState::Snoozed;
        self.next_fire_at = now + Duration::minutes(i64::from(minutes.max(1)));
        info!(until = %self.next_fire_at, "reminder snoozed");
        Event::Snoozed {
            until: self.next_fire_at,
            at: now,
        }
    }

    /// Restart the regular cycle from `now`, dropping any snooze override.
    /// A paused scheduler stays paused.
    pub fn reschedule_from(&mut self, now: DateTime<Local>) {
        if self.is_paused() {
            return;
        }
        self.state = SchedulerState::Active;
        self.next_fire_at = schedule_aligned(now, self.interval_secs);
        debug!(next_fire_at = %self.next_fire_at, "regular cycle re-anchored");
    }

    /// Takes effect at the next grid computation.
    pub fn set_interval(&mut self, interval_secs: u32) {
        self.interval_secs = interval_secs.max(1);
    }

    /// Call periodically. Returns an event when the fire time has been reached:
    /// `ReminderFired` within work hours, `ReminderDeferred` outside them, or
    /// `Rescheduled` when the fire time was missed by a whole interval.
    pub fn tick(&mut self, now: DateTime<Local>, gate: Option<&WorkHoursGate>) -> Option<Event> {
        if self.is_paused() || now < self.next_fire_at {
            return None;
        }

        let overdue = now - self.next_fire_at;
        if overdue >= Duration::seconds(i64::from(self.interval_secs)) {
            let missed = self.next_fire_at;
            self.state = SchedulerState::Active;
            self.next_fire_at = schedule_aligned(now, self.interval_secs);
            warn!(
                %missed,
                next_fire_at = %self.next_fire_at,
                "fire time missed by a full interval, re-anchoring"
            );
            return Some(Event::Rescheduled {
                next_fire_at: self.next_fire_at,
                at: now,
            });
        }

        if let Some(gate) = gate {
            if !gate.is_within_work_hours(now) {
                self.state = SchedulerState::Active;
                self.next_fire_at = gate
                    .next_work_hour_start(now)
                    .unwrap_or_else(|| schedule_aligned(now, self.interval_secs));
                debug!(next_fire_at = %self.next_fire_at, "outside work hours, deferring");
                return Some(Event::ReminderDeferred {
                    next_fire_at: self.next_fire_at,
                    at: now,
                });
            }
        }

        // Advance before handing anything back.
        self.state = SchedulerState::Active;
        self.next_fire_at = schedule_aligned(now, self.interval_secs);
        let reminder_id = Uuid::new_v4();
        info!(%reminder_id, next_fire_at = %self.next_fire_at, "reminder fired");
        Some(Event::ReminderFired {
            reminder_id,
            interval_secs: self.interval_secs,
            next_fire_at: self.next_fire_at,
            at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::WorkHoursConfig;
    use chrono::TimeZone;

    fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, day, h, m, s).single().unwrap()
    }

    fn office() -> WorkHoursGate {
        WorkHoursGate::new(WorkHoursConfig::default()).unwrap()
    }

    #[test]
    fn starts_on_the_grid() {
        let scheduler = ReminderScheduler::new(at(14, 10, 7, 30), 15 * 60);
        assert_eq!(scheduler.state(), SchedulerState::Active);
        assert_eq!(scheduler.next_fire_at(), at(14, 10, 15, 0));
        assert_eq!(scheduler.seconds_remaining(at(14, 10, 7, 30)), 450);
    }

    #[test]
    fn fires_once_and_advances() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 7, 0), 15 * 60);
        assert!(scheduler.tick(at(14, 10, 14, 59), Some(&office())).is_none());

        let event = scheduler.tick(at(14, 10, 15, 0), Some(&office()));
        match event {
            Some(Event::ReminderFired { next_fire_at, interval_secs, .. }) => {
                assert_eq!(next_fire_at, at(14, 10, 30, 0));
                assert_eq!(interval_secs, 900);
            }
            other => panic!("expected ReminderFired, got {other:?}"),
        }
    }

    #[test]
    fn second_tick_at_same_instant_is_a_no_op() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 7, 0), 15 * 60);
        let now = at(14, 10, 15, 0);
        assert!(scheduler.tick(now, None).is_some());
        assert!(scheduler.tick(now, None).is_none());
    }

    #[test]
    fn outside_hours_defers_to_next_start() {
        let mut scheduler = ReminderScheduler::new(at(14, 16, 50, 0), 30 * 60);
        let event = scheduler.tick(at(14, 17, 0, 0), Some(&office()));
        match event {
            Some(Event::ReminderDeferred { next_fire_at, .. }) => {
                assert_eq!(next_fire_at, at(15, 9, 0, 0));
            }
            other => panic!("expected ReminderDeferred, got {other:?}"),
        }
        assert_eq!(scheduler.next_fire_at(), at(15, 9, 0, 0));
    }

    #[test]
    fn paused_scheduler_never_fires() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 7, 0), 15 * 60);
        assert!(scheduler.pause(at(14, 10, 8, 0)).is_some());
        assert!(scheduler.pause(at(14, 10, 8, 0)).is_none());
        assert!(scheduler.tick(at(14, 10, 15, 0), None).is_none());
    }

    #[test]
    fn resume_re_anchors() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 7, 0), 15 * 60);
        scheduler.pause(at(14, 10, 8, 0));
        match scheduler.resume(at(14, 10, 40, 0)) {
            Some(Event::SchedulerResumed { next_fire_at, .. }) => {
                assert_eq!(next_fire_at, at(14, 10, 45, 0));
            }
            other => panic!("expected SchedulerResumed, got {other:?}"),
        }
        assert!(scheduler.resume(at(14, 10, 41, 0)).is_none());
    }

    #[test]
    fn snooze_unpauses_then_returns_to_grid() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 0, 0), 15 * 60);
        scheduler.pause(at(14, 10, 1, 0));
        scheduler.snooze(at(14, 10, 2, 0), 10);
        assert_eq!(scheduler.state(), SchedulerState::Snoozed);
        assert_eq!(scheduler.next_fire_at(), at(14, 10, 12, 0));

        assert!(scheduler.tick(at(14, 10, 12, 0), None).is_some());
        assert_eq!(scheduler.state(), SchedulerState::Active);
        assert_eq!(scheduler.next_fire_at(), at(14, 10, 15, 0));
    }

    #[test]
    fn overdue_by_an_interval_re_anchors_without_firing() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 0, 0), 15 * 60);
        // Woke up 40 minutes after the 10:15 slot.
        let event = scheduler.tick(at(14, 10, 55, 0), None);
        assert!(matches!(event, Some(Event::Rescheduled { .. })));
        assert_eq!(scheduler.next_fire_at(), at(14, 11, 0, 0));
    }

    #[test]
    fn reschedule_from_drops_snooze_but_respects_pause() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 0, 0), 30 * 60);
        scheduler.snooze(at(14, 10, 0, 0), 5);
        scheduler.reschedule_from(at(14, 10, 2, 0));
        assert_eq!(scheduler.state(), SchedulerState::Active);
        assert_eq!(scheduler.next_fire_at(), at(14, 10, 30, 0));

        scheduler.pause(at(14, 10, 3, 0));
        scheduler.reschedule_from(at(14, 10, 4, 0));
        assert!(scheduler.is_paused());
    }

    #[test]
    fn new_interval_applies_on_next_fire() {
        let mut scheduler = ReminderScheduler::new(at(14, 10, 0, 0), 45 * 60);
        scheduler.set_interval(40 * 60);
        assert_eq!(scheduler.next_fire_at(), at(14, 10, 45, 0));
        scheduler.tick(at(14, 10, 45, 0), None);
        assert_eq!(scheduler.next_fire_at(), at(14, 11, 20, 0));
    }
}
