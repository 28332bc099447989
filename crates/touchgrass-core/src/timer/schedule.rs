use chrono::{DateTime, Duration, Local, Timelike};

/// Next slot on the grid anchored to the top of the current hour.
///
/// With a 15-minute interval reminders land on :00/:15/:30/:45. The grid is
/// re-derived from the interval passed in, so changing the interval shifts
/// every following slot. The result is strictly after `now` and at most
/// `interval_secs` later; sub-second precision is dropped so slots land on
/// whole seconds.
pub fn schedule_aligned(now: DateTime<Local>, interval_secs: u32) -> DateTime<Local> {
    let interval = i64::from(interval_secs.max(1));
    let secs_since_hour = i64::from(now.minute() * 60 + now.second());
    let delta = interval - secs_since_hour % interval;
    now.with_nanosecond(0).unwrap_or(now) + Duration::seconds(delta)
}
