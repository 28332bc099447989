use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use touchgrass_core::calendar::StaticCalendar;
use touchgrass_core::runner::{self, Collaborators, Command};
use touchgrass_core::weather::FixedWeather;
use touchgrass_core::{CalendarEntry, Config, ReminderService, WeatherSnapshot};
use tracing::{info, warn};

use super::suggest::ConditionArg;

#[derive(Args)]
pub struct RunArgs {
    /// JSON file with today's calendar entries
    #[arg(long)]
    calendar: Option<PathBuf>,
    /// Report fixed weather: temperature in °F (with --condition)
    #[arg(long, requires = "condition")]
    temperature: Option<f64>,
    #[arg(long, value_enum, requires = "temperature")]
    condition: Option<ConditionArg>,
}

fn load_calendar(path: &PathBuf) -> Result<Vec<CalendarEntry>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<CalendarEntry> = serde_json::from_str(&content)?;
    for entry in &entries {
        entry.validate()?;
    }
    Ok(entries)
}

/// One command per stdin line: pause, resume, snooze [min], done, skip,
/// dismiss, water [glasses], status, quit.
fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let arg = words.next().and_then(|w| w.parse::<u32>().ok());
    Some(match verb {
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "snooze" => Command::Snooze(arg),
        "done" | "complete" => Command::Complete,
        "skip" => Command::Skip,
        "dismiss" => Command::Dismiss,
        "water" => Command::LogWater(arg.unwrap_or(1)),
        "status" => Command::Snapshot,
        "quit" | "exit" => Command::Shutdown,
        _ => return None,
    })
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let gate = config.work_hours_gate()?;

    let mut collaborators = Collaborators::default();
    if let Some(path) = &args.calendar {
        let mut calendar = StaticCalendar::new(load_calendar(path)?);
        if let Some(gate) = gate {
            calendar = calendar.with_gate(gate);
        }
        collaborators.calendar = Arc::new(calendar);
    }
    if let (Some(temperature_f), Some(condition)) = (args.temperature, args.condition) {
        collaborators.weather = Arc::new(FixedWeather(WeatherSnapshot {
            temperature_f,
            condition: condition.into(),
            is_daylight: true,
        }));
    }

    let service = ReminderService::from_config(config, chrono::Local::now())?;
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = runner::spawn(service, collaborators, cmd_rx, event_tx);

        let input_tx = cmd_tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_command(&line) {
                    Some(command) => {
                        if input_tx.send(command).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!(%line, "unrecognised command"),
                }
            }
        });

        let shutdown_tx = cmd_tx;
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                let _ = shutdown_tx.send(Command::Shutdown);
            }
        });

        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "cannot serialize event"),
            }
        }

        handle.await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    });
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}
