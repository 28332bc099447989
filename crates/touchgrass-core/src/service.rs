//! Orchestrating owner of the scheduler, the adaptive controller, the
//! work-hours gate and the meeting monitor.
//!
//! Every method takes `now` explicitly and returns the events it produced;
//! the async runner supplies wall-clock time and forwards the events.

use chrono::{DateTime, Local};
use tracing::{debug, info};
use uuid::Uuid;

use crate::activity::{
    recommend, ActivityCategory, ActivityContext, ActivityHistory, ActivityLog,
    CompletedActivity, MeetingDensity, SuggestedActivity,
};
use crate::calendar::CalendarSnapshot;
use crate::error::{Result, ValidationError};
use crate::events::{BreakOutcome, Event};
use crate::monitor::{MeetingMonitor, MonitorDecision, MonitorGuards};
use crate::storage::Config;
use crate::timer::{AdaptiveInterval, ReminderScheduler, WorkHoursGate};
use crate::water::WaterTracker;
use crate::weather::WeatherSnapshot;

/// Break length assumed when no meeting bounds it.
pub const DEFAULT_BREAK_WINDOW_MINUTES: u32 = 15;

/// Recorded when a break is completed without a known suggestion.
const UNSPECIFIED_BREAK: (ActivityCategory, u32) = (ActivityCategory::Physical, 5);

pub struct ReminderService {
    config: Config,
    scheduler: ReminderScheduler,
    adaptive: AdaptiveInterval,
    gate: Option<WorkHoursGate>,
    monitor: MeetingMonitor,
    calendar: CalendarSnapshot,
    activity_log: ActivityLog,
    water: WaterTracker,
    pending: Option<Uuid>,
    last_suggestion: Option<SuggestedActivity>,
    last_break_at: DateTime<Local>,
}

impl ReminderService {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` for an empty work-day set, an inverted
    /// work window, inverted adaptive bounds or an interval outside them.
    pub fn from_config(config: Config, now: DateTime<Local>) -> Result<Self> {
        config.validate()?;
        let adaptive = config.adaptive_interval()?;
        let gate = config.work_hours_gate()?;
        let scheduler = ReminderScheduler::new(now, adaptive.interval_secs());
        let water = WaterTracker::new(now, config.water.enabled, config.water.daily_goal_glasses);

        info!(
            interval_secs = adaptive.interval_secs(),
            next_fire_at = %scheduler.next_fire_at(),
            work_hours = gate.is_some(),
            "reminder service ready"
        );

        Ok(Self {
            config,
            scheduler,
            adaptive,
            gate,
            monitor: MeetingMonitor::new(),
            calendar: CalendarSnapshot::unavailable(),
            activity_log: ActivityLog::new(),
            water,
            pending: None,
            last_suggestion: None,
            last_break_at: now,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn adaptive(&self) -> &AdaptiveInterval {
        &self.adaptive
    }

    pub fn monitor(&self) -> &MeetingMonitor {
        &self.monitor
    }

    pub fn calendar(&self) -> &CalendarSnapshot {
        &self.calendar
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.activity_log
    }

    pub fn water(&self) -> &WaterTracker {
        &self.water
    }

    pub fn pending_reminder(&self) -> Option<Uuid> {
        self.pending
    }

    pub fn is_within_work_hours(&self, now: DateTime<Local>) -> bool {
        self.gate
            .as_ref()
            .map_or(true, |gate| gate.is_within_work_hours(now))
    }

    /// Minutes until the next meeting, capped at the default break window.
    /// One minute while a meeting is running.
    pub fn available_minutes(&self, now: DateTime<Local>) -> u32 {
        if self.calendar.is_in_meeting {
            return 1;
        }
        let minutes = self
            .calendar
            .next_meeting_start
            .map(|start| (start - now).num_minutes())
            .filter(|m| *m >= 0)
            .map_or(DEFAULT_BREAK_WINDOW_MINUTES, |m| {
                u32::try_from(m).unwrap_or(u32::MAX).min(DEFAULT_BREAK_WINDOW_MINUTES)
            });
        minutes.max(1)
    }

    /// Assemble the recommendation context from every collaborator.
    pub fn context(&self, now: DateTime<Local>, weather: Option<WeatherSnapshot>) -> ActivityContext {
        let mut ctx = ActivityContext::new(now, self.available_minutes(now));
        ctx.weather = weather;
        ctx.time_since_last_break_secs =
            u64::try_from((now - self.last_break_at).num_seconds()).unwrap_or(0);
        ctx.todays_completed = self.activity_log.todays_activities(now);
        ctx.meeting_density = MeetingDensity::from_meeting_count(self.calendar.meeting_count());
        ctx.next_meeting_at = self.calendar.next_meeting_start;
        ctx.current_streak_days = self.activity_log.current_streak_days(now);
        if self.water.enabled {
            ctx.water_intake_glasses = self.water.intake_on(now);
            ctx.daily_water_goal_glasses = self.water.daily_goal;
        }
        ctx
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> Event {
        Event::StateSnapshot {
            state: self.scheduler.state(),
            next_fire_at: self.scheduler.next_fire_at(),
            seconds_remaining: self.scheduler.seconds_remaining(now),
            interval_secs: self.scheduler.interval_secs(),
            reminder_pending: self.pending.is_some(),
            within_work_hours: self.is_within_work_hours(now),
            water_intake_glasses: self.water.intake_on(now),
            at: now,
        }
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// One-second scheduler tick.
    pub fn on_tick(&mut self, now: DateTime<Local>) -> Option<Event> {
        self.water.roll_over(now);
        let event = self.scheduler.tick(now, self.gate.as_ref())?;
        if let Some(id) = event.surfaced_reminder() {
            self.pending = Some(id);
            self.monitor.record_trigger(now);
        }
        Some(event)
    }

    pub fn update_calendar(&mut self, snapshot: CalendarSnapshot) {
        debug!(
            in_meeting = snapshot.is_in_meeting,
            meetings = snapshot.meeting_count(),
            "calendar refreshed"
        );
        self.calendar = snapshot;
    }

    /// Coarse monitor tick over the latest calendar snapshot.
    pub fn on_monitor_tick(&mut self, now: DateTime<Local>) -> Option<Event> {
        if !self.config.reminder.smart_scheduling_enabled {
            self.monitor.observe(&self.calendar);
            return None;
        }

        let guards = MonitorGuards {
            reminder_pending: self.pending.is_some(),
            scheduler_paused: self.scheduler.is_paused(),
            within_work_hours: self.is_within_work_hours(now),
        };
        match self.monitor.evaluate(now, &self.calendar, guards) {
            MonitorDecision::NoTrigger => None,
            MonitorDecision::Suppressed { reason, cause } => Some(Event::TriggerSuppressed {
                reason,
                cause,
                at: now,
            }),
            MonitorDecision::Trigger(reason) => {
                let reminder_id = Uuid::new_v4();
                self.pending = Some(reminder_id);
                self.scheduler.reschedule_from(now);
                Some(Event::SmartTrigger {
                    reminder_id,
                    reason,
                    next_fire_at: self.scheduler.next_fire_at(),
                    at: now,
                })
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record a finished break. Without an explicit activity the last
    /// suggestion is recorded.
    pub fn complete_break(
        &mut self,
        now: DateTime<Local>,
        activity: Option<CompletedActivity>,
    ) -> Vec<Event> {
        let activity = activity.unwrap_or_else(|| {
            let (category, duration_minutes) = self
                .last_suggestion
                .as_ref()
                .map_or(UNSPECIFIED_BREAK, |s| (s.category, s.duration_minutes));
            CompletedActivity {
                category,
                duration_minutes,
                completed_at: now,
            }
        });
        info!(category = ?activity.category, minutes = activity.duration_minutes, "break completed");
        self.activity_log.record(activity);
        self.activity_log.prune_before(now.date_naive());
        self.last_break_at = now;
        self.last_suggestion = None;

        let mut events = vec![Event::ReminderCleared {
            reminder_id: self.pending.take(),
            outcome: BreakOutcome::Completed,
            at: now,
        }];
        if self.config.reminder.adaptive_enabled {
            let from = self.adaptive.interval_secs();
            let to = self.adaptive.on_completed(now);
            events.extend(self.apply_interval(now, from, to));
        }
        events
    }

    pub fn skip_break(&mut self, now: DateTime<Local>) -> Vec<Event> {
        let mut events = vec![Event::ReminderCleared {
            reminder_id: self.pending.take(),
            outcome: BreakOutcome::Skipped,
            at: now,
        }];
        self.last_suggestion = None;
        if self.config.reminder.adaptive_enabled {
            let from = self.adaptive.interval_secs();
            let to = self.adaptive.on_skipped();
            events.extend(self.apply_interval(now, from, to));
        }
        events
    }

    /// Clear the pending reminder without feeding the adaptive controller.
    pub fn dismiss(&mut self, now: DateTime<Local>) -> Option<Event> {
        let reminder_id = self.pending.take()?;
        self.last_suggestion = None;
        Some(Event::ReminderCleared {
            reminder_id: Some(reminder_id),
            outcome: BreakOutcome::Dismissed,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Local>) -> Option<Event> {
        self.scheduler.pause(now)
    }

    pub fn resume(&mut self, now: DateTime<Local>) -> Option<Event> {
        self.scheduler.resume(now)
    }

    /// Snooze for `minutes`, or the configured default. Replaces any pending
    /// reminder.
    pub fn snooze(&mut self, now: DateTime<Local>, minutes: Option<u32>) -> Event {
        self.pending = None;
        let minutes = minutes.unwrap_or(self.config.reminder.snooze_minutes);
        self.scheduler.snooze(now, minutes)
    }

    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for zero glasses or when water
    /// tracking is disabled.
    pub fn log_water(
        &mut self,
        now: DateTime<Local>,
        glasses: u32,
    ) -> std::result::Result<Event, ValidationError> {
        if !self.water.enabled {
            return Err(ValidationError::InvalidValue {
                field: "water.enabled".into(),
                message: "water tracking is disabled".into(),
            });
        }
        if glasses == 0 {
            return Err(ValidationError::InvalidValue {
                field: "glasses".into(),
                message: "must be at least 1".into(),
            });
        }
        let intake = self.water.log_water(now, glasses);
        Ok(Event::WaterLogged {
            intake_glasses: intake,
            goal_glasses: self.water.daily_goal,
            streak_days: self.water.streak(),
            at: now,
        })
    }

    /// Pick an activity for the current context and remember it for
    /// [`complete_break`](Self::complete_break).
    pub fn recommend(&mut self, now: DateTime<Local>, weather: Option<WeatherSnapshot>) -> Event {
        let recommendation = recommend(&self.context(now, weather));
        self.last_suggestion = Some(recommendation.activity.clone());
        Event::Suggestion {
            reminder_id: self.pending,
            recommendation,
            at: now,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_interval(&mut self, now: DateTime<Local>, from: u32, to: u32) -> Option<Event> {
        if from == to {
            return None;
        }
        self.scheduler.set_interval(to);
        Some(Event::IntervalAdjusted {
            from_secs: from,
            to_secs: to,
            at: now,
        })
    }
}
