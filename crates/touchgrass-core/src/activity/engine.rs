//! Activity recommendation engine.
//!
//! Ordered rule evaluation over a fixed candidate pool: the first rule that
//! applies and finds a matching candidate wins. Rules that depend on absent
//! data (no weather, no calendar) simply do not apply. The final rule always
//! produces a suggestion, so [`recommend`] is total.
//!
//! | # | Rule                  | Urgency |
//! |---|-----------------------|---------|
//! | 1 | Pre-meeting movement  | 0.80    |
//! | 1 | Long sitting stretch  | 0.90    |
//! | 2 | Weather opportunity   | 0.85    |
//! | 3 | Physical need         | 0.75    |
//! | 4 | Heavy meeting day     | 0.80    |
//! | 4 | Late-afternoon outdoor| 0.75    |
//! | 5 | Time of day           | 0.65-0.70 |
//! | 6 | Variety balance       | 0.60    |
//! | 7 | Smart default         | 0.50    |

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{
    candidate_pool, Candidate, SuggestedActivity, BREATHING_RESET, GENERIC_BREAK,
};
use super::context::{ActivityCategory, ActivityContext, MeetingDensity, TimeOfDay};
use super::hydration::{hydration_advice, HydrationAdvice};

const PRE_MEETING_MINUTES: std::ops::RangeInclusive<i64> = 3..=7;
const PRE_MEETING_SITTING_SECS: u64 = 90 * 60;
const LONG_SITTING_SECS: u64 = 2 * 3600;
const SHORT_MOVEMENT_MAX_MINUTES: u32 = 3;
const LATE_AFTERNOON_HOURS: std::ops::Range<u32> = 16..18;

/// Which rule produced the suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    PreMeetingMovement,
    LongSittingStretch,
    WeatherOpportunity,
    PhysicalNeed,
    HeavyMeetingDay,
    LateAfternoonOutdoor,
    TimeOfDay,
    VarietyBalance,
    SmartDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity: SuggestedActivity,
    pub rule: SelectionRule,
    pub hydration: Option<HydrationAdvice>,
}

type Pick = (SuggestedActivity, SelectionRule);

/// Pick one activity for the given context.
pub fn recommend(context: &ActivityContext) -> Recommendation {
    recommend_from_pool(context, candidate_pool(context.time_window()))
}

pub(crate) fn recommend_from_pool(ctx: &ActivityContext, pool: &[Candidate]) -> Recommendation {
    let (activity, rule) = critical_window(ctx, pool)
        .or_else(|| weather_opportunity(ctx, pool))
        .or_else(|| physical_need(ctx, pool))
        .or_else(|| day_schedule(ctx, pool))
        .or_else(|| time_of_day(ctx, pool))
        .or_else(|| variety_balance(ctx, pool))
        .unwrap_or_else(|| smart_default(ctx, pool));

    debug!(?rule, title = %activity.title, urgency = activity.urgency, "activity selected");

    Recommendation {
        activity,
        rule,
        hydration: hydration_advice(ctx.water_intake_glasses, ctx.daily_water_goal_glasses),
    }
}

fn first_where(pool: &[Candidate], pred: impl Fn(&Candidate) -> bool) -> Option<&Candidate> {
    pool.iter().find(|c| pred(c))
}

fn outdoor(pool: &[Candidate]) -> Option<&Candidate> {
    first_where(pool, |c| c.category == ActivityCategory::Outdoor)
}

fn movement(pool: &[Candidate]) -> Option<&Candidate> {
    first_where(pool, |c| {
        c.category.is_physical() || c.category == ActivityCategory::Outdoor
    })
}

/// Longest candidate; the earliest one wins ties.
fn longest(pool: &[Candidate]) -> Option<&Candidate> {
    pool.iter().fold(None, |best: Option<&Candidate>, c| match best {
        Some(b) if b.duration_minutes >= c.duration_minutes => Some(b),
        _ => Some(c),
    })
}

fn describe_minutes(minutes: u64) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} minutes"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn critical_window(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    let sitting = describe_minutes(ctx.time_since_last_break_secs / 60);

    if let Some(minutes) = ctx.minutes_until_next_meeting() {
        if PRE_MEETING_MINUTES.contains(&minutes)
            && ctx.time_since_last_break_secs > PRE_MEETING_SITTING_SECS
        {
            let quick_move = pool
                .iter()
                .filter(|c| {
                    c.category.is_physical() && c.duration_minutes <= SHORT_MOVEMENT_MAX_MINUTES
                })
                .min_by_key(|c| c.duration_minutes);
            if let Some(c) = quick_move {
                let reason = format!(
                    "Your next meeting starts in {minutes} minutes and you've been sitting for {sitting}. Loosen up before it starts."
                );
                return Some((c.suggest(reason, 0.8), SelectionRule::PreMeetingMovement));
            }
        }
    }

    if ctx.time_since_last_break_secs > LONG_SITTING_SECS && ctx.available_minutes >= 10 {
        if let Some(c) = outdoor(pool) {
            let reason = format!(
                "Long sitting stretch: {sitting} without a real break. Fresh air will reset you."
            );
            return Some((c.suggest(reason, 0.9), SelectionRule::LongSittingStretch));
        }
    }
    None
}

fn weather_opportunity(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    let weather = ctx.weather.as_ref()?;
    if !weather.is_ideal_for_outdoor()
        || ctx.available_minutes < 5
        || ctx.completed_outdoor_today()
    {
        return None;
    }
    let c = outdoor(pool)?;
    let reason = format!(
        "It's {:.0}°F and {} outside. Great weather to step out.",
        weather.temperature_f,
        weather.condition.label()
    );
    Some((c.suggest(reason, 0.85), SelectionRule::WeatherOpportunity))
}

fn physical_need(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    if !ctx.has_sat_too_long() {
        return None;
    }
    let c = movement(pool)?;
    let reason = format!(
        "You've been sitting for {}. Your body needs to move.",
        describe_minutes(ctx.time_since_last_break_secs / 60)
    );
    Some((c.suggest(reason, 0.75), SelectionRule::PhysicalNeed))
}

fn day_schedule(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    if ctx.meeting_density == MeetingDensity::Heavy {
        let substantial = ctx
            .todays_completed
            .iter()
            .filter(|a| a.duration_minutes >= 5)
            .count();
        if substantial < 2 {
            if let Some(c) = longest(pool) {
                return Some((
                    c.suggest(
                        "Meeting-heavy day with few real breaks so far. Take the longest one you can.",
                        0.8,
                    ),
                    SelectionRule::HeavyMeetingDay,
                ));
            }
        }
    }

    if LATE_AFTERNOON_HOURS.contains(&ctx.now.hour())
        && !ctx.completed_outdoor_today()
        && ctx.weather_is_acceptable()
    {
        if let Some(c) = outdoor(pool) {
            return Some((
                c.suggest(
                    "You haven't been outside today and the daylight won't last. Catch some before the day ends.",
                    0.75,
                ),
                SelectionRule::LateAfternoonOutdoor,
            ));
        }
    }
    None
}

fn time_of_day(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    let (c, reason, urgency) = match ctx.time_of_day() {
        TimeOfDay::EarlyAfternoon => (
            movement(pool)?,
            "Beat the post-lunch slump with something energizing.",
            0.7,
        ),
        TimeOfDay::LateAfternoon if ctx.meeting_density == MeetingDensity::Heavy => (
            first_where(pool, |c| c.category == ActivityCategory::Mental)?,
            "Long day of meetings. Take a calm moment to decompress.",
            0.65,
        ),
        TimeOfDay::MidMorning if ctx.weather_is_ideal() => (
            outdoor(pool)?,
            "Mid-morning sunshine is the best kind. Step outside.",
            0.7,
        ),
        _ => return None,
    };
    Some((c.suggest(reason, urgency), SelectionRule::TimeOfDay))
}

fn variety_balance(ctx: &ActivityContext, pool: &[Candidate]) -> Option<Pick> {
    if ctx.todays_completed.is_empty() {
        return None;
    }
    ctx.categories_by_scarcity().into_iter().find_map(|category| {
        let c = first_where(pool, |c| c.category == category)?;
        let reason = format!(
            "Mixing it up: you haven't done much {} today.",
            category_label(category)
        );
        Some((c.suggest(reason, 0.6), SelectionRule::VarietyBalance))
    })
}

fn smart_default(ctx: &ActivityContext, pool: &[Candidate]) -> Pick {
    if ctx.available_minutes < 3 {
        let c = first_where(pool, |c| c.category == ActivityCategory::Mental)
            .unwrap_or(&BREATHING_RESET);
        return (
            c.suggest("Only a moment to spare. A quick reset still counts.", 0.5),
            SelectionRule::SmartDefault,
        );
    }

    if ctx.has_sat_too_long() {
        if let Some(c) = first_where(pool, |c| c.category.is_physical()) {
            return (
                c.suggest("You've been still for a while. Get the blood moving.", 0.5),
                SelectionRule::SmartDefault,
            );
        }
    }

    match pool.first() {
        Some(c) => (
            c.suggest("Time for a short break.", 0.5),
            SelectionRule::SmartDefault,
        ),
        None => {
            let mut activity = GENERIC_BREAK.suggest("Time for a short break.", 0.5);
            activity.duration_minutes = activity.duration_minutes.min(ctx.available_minutes.max(1));
            (activity, SelectionRule::SmartDefault)
        }
    }
}

fn category_label(category: ActivityCategory) -> &'static str {
    match category {
        ActivityCategory::Outdoor => "outdoor time",
        ActivityCategory::Physical => "movement",
        ActivityCategory::Mental => "mental recovery",
        ActivityCategory::Posture => "posture work",
    }
}
