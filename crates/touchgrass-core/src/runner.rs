//! Background loop driving a [`ReminderService`].
//!
//! One tokio task owns the service and multiplexes the scheduler tick, the
//! calendar refresh, the monitor tick and incoming commands, so no two of
//! them ever run at the same time. Weather is the only awaited call and is
//! bounded by the cache's timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::calendar::{CalendarSource, NoCalendar};
use crate::events::Event;
use crate::monitor::MONITOR_TICK_SECS;
use crate::service::ReminderService;
use crate::weather::{NoWeather, WeatherCache, WeatherSource};

/// Scheduler countdown resolution.
pub const SCHEDULER_TICK: Duration = Duration::from_secs(1);
/// Calendar snapshot refresh.
pub const CALENDAR_REFRESH: Duration = Duration::from_secs(60);

/// User actions forwarded to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    /// Minutes, or the configured default.
    Snooze(Option<u32>),
    Complete,
    Skip,
    Dismiss,
    LogWater(u32),
    Snapshot,
    Shutdown,
}

/// External data sources the loop polls.
#[derive(Clone)]
pub struct Collaborators {
    pub calendar: Arc<dyn CalendarSource>,
    pub weather: Arc<dyn WeatherSource>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            calendar: Arc::new(NoCalendar),
            weather: Arc::new(NoWeather),
        }
    }
}

/// Loop cadences and clock.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub scheduler_tick: Duration,
    pub calendar_refresh: Duration,
    pub monitor_tick: Duration,
    pub clock: fn() -> DateTime<Local>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scheduler_tick: SCHEDULER_TICK,
            calendar_refresh: CALENDAR_REFRESH,
            monitor_tick: Duration::from_secs(MONITOR_TICK_SECS),
            clock: Local::now,
        }
    }
}

/// Start the loop with default cadences. The handle yields the service back
/// after `Command::Shutdown`, after the command sender is dropped, or once
/// nobody listens for events.
pub fn spawn(
    service: ReminderService,
    collaborators: Collaborators,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) -> JoinHandle<ReminderService> {
    spawn_with(RunnerConfig::default(), service, collaborators, commands, events)
}

pub fn spawn_with(
    config: RunnerConfig,
    mut service: ReminderService,
    collaborators: Collaborators,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) -> JoinHandle<ReminderService> {
    tokio::spawn(async move {
        info!("reminder loop started");
        let clock = config.clock;
        let mut weather = WeatherCache::new(Arc::clone(&collaborators.weather));

        let mut scheduler_tick = tokio::time::interval(config.scheduler_tick);
        scheduler_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut calendar_tick = tokio::time::interval(config.calendar_refresh);
        calendar_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut monitor_tick = tokio::time::interval(config.monitor_tick);
        monitor_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // Calendar before monitor before scheduler, so each sees fresh data.
            let produced: Vec<Event> = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => handle_command(&mut service, command, clock()),
                },
                _ = calendar_tick.tick() => {
                    let now = clock();
                    service.update_calendar(collaborators.calendar.snapshot(now));
                    Vec::new()
                }
                _ = monitor_tick.tick() => service.on_monitor_tick(clock()).into_iter().collect(),
                _ = scheduler_tick.tick() => service.on_tick(clock()).into_iter().collect(),
            };

            for event in produced {
                let surfaced = event.surfaced_reminder().is_some();
                if events.send(event).is_err() {
                    warn!("event receiver dropped, stopping reminder loop");
                    return service;
                }
                if surfaced {
                    let snapshot = weather.current().await;
                    let suggestion = service.recommend(clock(), snapshot);
                    if events.send(suggestion).is_err() {
                        warn!("event receiver dropped, stopping reminder loop");
                        return service;
                    }
                }
            }
        }

        info!("reminder loop stopped");
        service
    })
}

fn handle_command(service: &mut ReminderService, command: Command, now: DateTime<Local>) -> Vec<Event> {
    debug!(?command, "command received");
    match command {
        Command::Pause => service.pause(now).into_iter().collect(),
        Command::Resume => service.resume(now).into_iter().collect(),
        Command::Snooze(minutes) => vec![service.snooze(now, minutes)],
        Command::Complete => service.complete_break(now, None),
        Command::Skip => service.skip_break(now),
        Command::Dismiss => service.dismiss(now).into_iter().collect(),
        Command::LogWater(glasses) => match service.log_water(now, glasses) {
            Ok(event) => vec![event],
            Err(e) => {
                warn!(error = %e, "water log rejected");
                Vec::new()
            }
        },
        Command::Snapshot => vec![service.snapshot(now)],
        Command::Shutdown => Vec::new(),
    }
}
