pub mod config;
pub mod run;
pub mod schedule;
pub mod suggest;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Parse `--at` values: RFC 3339, or local `YYYY-MM-DD HH:MM[:SS]`.
/// `None` means now.
pub(crate) fn parse_local_time(value: Option<&str>) -> Result<DateTime<Local>, String> {
    let Some(value) = value else {
        return Ok(Local::now());
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Local));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or_else(|| format!("cannot parse time '{value}' (expected YYYY-MM-DD HH:MM)"))
}
