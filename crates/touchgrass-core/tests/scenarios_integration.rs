//! End-to-end checks of the documented behaviour scenarios.

use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Weekday};
use touchgrass_core::activity::{ActivityCategory, ActivityKind, SelectionRule};
use touchgrass_core::calendar::MeetingSpan;
use touchgrass_core::monitor::{MonitorDecision, MonitorGuards};
use touchgrass_core::weather::WeatherCondition;
use touchgrass_core::{
    recommend, ActivityContext, AdaptiveInterval, CalendarSnapshot, MeetingMonitor,
    TriggerReason, WeatherSnapshot, WorkHoursConfig, WorkHoursGate,
};

fn at(day: u32, h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, day, h, m, 0).single().unwrap()
}

fn open_guards() -> MonitorGuards {
    MonitorGuards {
        reminder_pending: false,
        scheduler_paused: false,
        within_work_hours: true,
    }
}

#[test]
fn scenario_a_ideal_weather_mid_morning_goes_outside() {
    let mut ctx = ActivityContext::new(at(14, 10, 0), 10);
    ctx.weather = Some(WeatherSnapshot {
        temperature_f: 65.0,
        condition: WeatherCondition::Clear,
        is_daylight: true,
    });

    let rec = recommend(&ctx);
    assert_eq!(rec.activity.category, ActivityCategory::Outdoor);
    assert!(rec.activity.urgency >= 0.7);
}

#[test]
fn scenario_b_one_minute_is_a_micro_break() {
    let ctx = ActivityContext::new(at(14, 14, 0), 1);
    let rec = recommend(&ctx);
    assert!(rec.activity.duration_minutes <= 2);
    assert!(matches!(
        rec.activity.kind,
        ActivityKind::Breathing | ActivityKind::Exercise
    ));
}

#[test]
fn scenario_c_engaged_user_gets_shorter_interval() {
    let mut adaptive = AdaptiveInterval::new(45 * 60, 15 * 60, 90 * 60).unwrap();
    adaptive.on_completed(at(14, 9, 0));
    adaptive.on_completed(at(14, 9, 20));
    adaptive.on_completed(at(14, 9, 40));
    // Back at 45 with three completions inside the last hour.
    adaptive.set_interval(45 * 60).unwrap();

    assert_eq!(adaptive.on_completed(at(14, 9, 55)), 40 * 60);
}

#[test]
fn scenario_c_respects_minimum() {
    let mut adaptive = AdaptiveInterval::new(30 * 60, 30 * 60, 45 * 60).unwrap();
    adaptive.on_completed(at(14, 9, 0));
    assert_eq!(adaptive.on_completed(at(14, 9, 10)), 30 * 60);
}

#[test]
fn scenario_d_three_skips_back_off_up_to_maximum() {
    let mut adaptive = AdaptiveInterval::new(40 * 60, 15 * 60, 45 * 60).unwrap();
    adaptive.on_skipped();
    adaptive.on_skipped();
    assert_eq!(adaptive.on_skipped(), 45 * 60);

    for _ in 0..3 {
        adaptive.on_skipped();
    }
    assert_eq!(adaptive.interval_secs(), 45 * 60);
}

#[test]
fn scenario_e_saturday_defers_to_monday() {
    let gate = WorkHoursGate::new(WorkHoursConfig::default()).unwrap();
    let saturday = at(17, 11, 30);
    assert_eq!(saturday.weekday(), Weekday::Sat);

    assert!(!gate.is_within_work_hours(saturday));
    let next = gate.next_work_hour_start(saturday).unwrap();
    assert_eq!(next, at(19, 9, 0));
    assert_eq!(next.weekday(), Weekday::Mon);
}

fn meeting_end_decision(gap_minutes: i64) -> MonitorDecision {
    let mut monitor = MeetingMonitor::new();
    let meeting = MeetingSpan::new(at(14, 10, 0), at(14, 11, 0));
    let next_start = at(14, 11, 0) + Duration::minutes(gap_minutes);
    let next = MeetingSpan::new(next_start, next_start + Duration::minutes(30));

    let during = CalendarSnapshot::from_meetings(at(14, 10, 45), vec![meeting, next]);
    assert_eq!(
        monitor.evaluate(at(14, 10, 45), &during, open_guards()),
        MonitorDecision::NoTrigger
    );

    let after = CalendarSnapshot::from_meetings(at(14, 11, 0), vec![meeting, next]);
    monitor.evaluate(at(14, 11, 0), &after, open_guards())
}

#[test]
fn scenario_f_short_gap_does_not_trigger() {
    assert_eq!(meeting_end_decision(8), MonitorDecision::NoTrigger);
}

#[test]
fn scenario_f_usable_gap_triggers() {
    assert_eq!(
        meeting_end_decision(12),
        MonitorDecision::Trigger(TriggerReason::MeetingEndedGapAvailable)
    );
    assert_eq!(
        TriggerReason::MeetingEndedGapAvailable.to_string(),
        "meeting ended, gap available"
    );
}

#[test]
fn absent_weather_and_calendar_still_recommend() {
    for hour in 0..24 {
        for available in [1, 3, 6, 12] {
            let rec = recommend(&ActivityContext::new(at(14, hour, 0), available));
            assert!(!rec.activity.title.is_empty());
            assert_ne!(rec.rule, SelectionRule::WeatherOpportunity);
        }
    }
}
