use chrono::{DateTime, Duration, Local};
use clap::{Args, ValueEnum};
use touchgrass_core::activity::MeetingDensity;
use touchgrass_core::weather::WeatherCondition;
use touchgrass_core::{recommend, ActivityContext, Config, WeatherSnapshot};

use super::parse_local_time;

#[derive(Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Windy,
    Drizzle,
    Rain,
    HeavyRain,
    Thunderstorm,
    Snow,
}

impl From<ConditionArg> for WeatherCondition {
    fn from(arg: ConditionArg) -> Self {
        match arg {
            ConditionArg::Clear => WeatherCondition::Clear,
            ConditionArg::PartlyCloudy => WeatherCondition::PartlyCloudy,
            ConditionArg::Cloudy => WeatherCondition::Cloudy,
            ConditionArg::Fog => WeatherCondition::Fog,
            ConditionArg::Windy => WeatherCondition::Windy,
            ConditionArg::Drizzle => WeatherCondition::Drizzle,
            ConditionArg::Rain => WeatherCondition::Rain,
            ConditionArg::HeavyRain => WeatherCondition::HeavyRain,
            ConditionArg::Thunderstorm => WeatherCondition::Thunderstorm,
            ConditionArg::Snow => WeatherCondition::Snow,
        }
    }
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Minutes available for the break
    #[arg(long, default_value = "5")]
    available: u32,
    /// Moment to evaluate (default: now)
    #[arg(long)]
    at: Option<String>,
    /// Outside temperature in °F; enables weather rules together with --condition
    #[arg(long, requires = "condition")]
    temperature: Option<f64>,
    #[arg(long, value_enum, requires = "temperature")]
    condition: Option<ConditionArg>,
    /// It is dark outside
    #[arg(long)]
    night: bool,
    /// Minutes since the last break
    #[arg(long, default_value = "0")]
    since_break: u64,
    /// Number of meetings today
    #[arg(long, default_value = "3")]
    meetings: usize,
    /// Minutes until the next meeting
    #[arg(long)]
    next_meeting: Option<i64>,
    /// Glasses of water so far today
    #[arg(long, default_value = "0")]
    water: u32,
}

pub fn run(args: SuggestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let now = parse_local_time(args.at.as_deref())?;

    let mut ctx = ActivityContext::new(now, args.available);
    ctx.weather = args
        .temperature
        .zip(args.condition)
        .map(|(temperature_f, condition)| WeatherSnapshot {
            temperature_f,
            condition: condition.into(),
            is_daylight: !args.night,
        });
    ctx.time_since_last_break_secs = args.since_break.saturating_mul(60);
    ctx.meeting_density = MeetingDensity::from_meeting_count(args.meetings);
    ctx.next_meeting_at = args
        .next_meeting
        .map(|m| meeting_start(now, m))
        .transpose()?;
    if config.water.enabled {
        ctx.water_intake_glasses = args.water;
        ctx.daily_water_goal_glasses = config.water.daily_goal_glasses;
    }

    let recommendation = recommend(&ctx);
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

fn meeting_start(now: DateTime<Local>, minutes: i64) -> Result<DateTime<Local>, String> {
    Duration::try_minutes(minutes)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| format!("--next-meeting {minutes} is out of range"))
}
