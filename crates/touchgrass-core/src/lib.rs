//! # Touchgrass Core Library
//!
//! This library provides the core logic for the touchgrass break reminder.
//! Everything is available through the standalone CLI binary, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Scheduler**: A wall-clock state machine firing on a grid aligned to
//!   the top of the hour; the caller invokes `tick()` about once a second
//! - **Adaptive Interval**: Tightens the interval for engaged users and backs
//!   off after repeated skips, within configured bounds
//! - **Work-Hours Gate**: Keeps reminders inside the configured work window
//! - **Meeting Monitor**: Fires early when meetings end and a gap opens up
//! - **Activity Engine**: Ordered rules choosing one break activity for the
//!   current context, plus hydration advice
//!
//! ## Key Components
//!
//! - [`ReminderService`]: Owns the components above and applies commands
//! - [`runner::spawn`]: Async loop driving a service from tokio intervals
//! - [`Config`]: Application configuration management
//! - [`recommend`]: The activity recommendation entry point

pub mod activity;
pub mod calendar;
pub mod error;
pub mod events;
pub mod monitor;
pub mod runner;
pub mod service;
pub mod storage;
pub mod timer;
pub mod water;
pub mod weather;

pub use activity::{recommend, ActivityContext, Recommendation, SuggestedActivity};
pub use calendar::{CalendarEntry, CalendarSnapshot, CalendarSource};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{BreakOutcome, Event};
pub use monitor::{MeetingMonitor, TriggerReason};
pub use service::ReminderService;
pub use storage::Config;
pub use timer::{schedule_aligned, AdaptiveInterval, ReminderScheduler, WorkHoursConfig, WorkHoursGate};
pub use water::WaterTracker;
pub use weather::{WeatherSnapshot, WeatherSource};
