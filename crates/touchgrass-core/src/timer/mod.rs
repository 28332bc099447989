mod adaptive;
mod engine;
mod schedule;
mod work_hours;

pub use adaptive::{
    AdaptiveInterval, ADJUSTMENT_STEP_SECS, COMPLETION_HISTORY_LEN, SKIPS_BEFORE_BACKOFF,
};
pub use engine::{ReminderScheduler, SchedulerState};
pub use schedule::schedule_aligned;
pub use work_hours::{
    format_minute_of_day, minute_of_day, parse_minute_of_day, WorkHoursConfig, WorkHoursGate,
    WEEKDAYS,
};
