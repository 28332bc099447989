use clap::Subcommand;
use serde_json::json;
use touchgrass_core::{schedule_aligned, Config};

use super::parse_local_time;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show the next aligned reminder slot
    Next {
        /// Moment to evaluate (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Interval in minutes (default: configured interval)
        #[arg(long)]
        interval: Option<u32>,
    },
    /// Check the work-hours window
    Hours {
        /// Moment to evaluate (default: now)
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        ScheduleAction::Next { at, interval } => {
            let now = parse_local_time(at.as_deref())?;
            let interval_secs = match interval {
                Some(0) => return Err("interval must be at least 1 minute".into()),
                Some(minutes) => minutes.saturating_mul(60),
                None => config.interval_secs(),
            };
            let next = schedule_aligned(now, interval_secs);
            let gate = config.work_hours_gate()?;
            let deferred_to = gate
                .as_ref()
                .filter(|g| !g.is_within_work_hours(next))
                .and_then(|g| g.next_work_hour_start(next));
            let out = json!({
                "now": now,
                "interval_secs": interval_secs,
                "next_fire_at": next,
                "deferred_to": deferred_to,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ScheduleAction::Hours { at } => {
            let now = parse_local_time(at.as_deref())?;
            let out = match config.work_hours_gate()? {
                Some(gate) => json!({
                    "now": now,
                    "enabled": true,
                    "within_work_hours": gate.is_within_work_hours(now),
                    "next_work_hour_start": gate.next_work_hour_start(now),
                }),
                None => json!({
                    "now": now,
                    "enabled": false,
                    "within_work_hours": true,
                    "next_work_hour_start": null,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
