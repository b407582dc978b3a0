//! Public surface of the crate, exercised end to end.

use hron::ast::{DayFilter, ScheduleExpr, TimeOfDay};
use hron::{validate, Schedule, ScheduleData, ScheduleError};
use jiff::Zoned;

fn zoned(s: &str) -> Zoned {
    s.parse().expect("valid zoned datetime")
}

fn friday_noon() -> Zoned {
    zoned("2026-02-06T12:00:00+00:00[UTC]")
}

#[test]
fn parse_and_display() {
    let schedule = Schedule::parse("every weekday at 9:00 except dec 25 in America/New_York").unwrap();
    assert_eq!(
        schedule.to_string(),
        "every weekday at 09:00 except dec 25 in America/New_York"
    );
    assert_eq!(schedule.timezone(), Some("America/New_York"));
    assert!(matches!(
        schedule.data().expr,
        ScheduleExpr::DayRepeat {
            days: DayFilter::Weekday,
            ..
        }
    ));
}

#[test]
fn parser_entry_point_returns_plain_data() {
    let data: ScheduleData = hron::parser::parse("every day at 09:00").unwrap();
    assert_eq!(data.expr.times(), [TimeOfDay::new(9, 0).unwrap()]);
    assert_eq!(data.timezone, None);
    let schedule = Schedule::new(data.clone()).unwrap();
    assert_eq!(ScheduleData::from(schedule), data);
}

#[test]
fn validate_matches_parse() {
    for input in ["every day at 09:00", "last fri of every month at 17:00", "on 2026-03-15 at 14:30"] {
        assert!(validate(input), "{input}");
    }
    for input in ["", "every", "every day", "every day at 25:00", "evry day at 09:00"] {
        assert!(!validate(input), "{input}");
    }
}

#[test]
fn next_previous_and_matches() {
    let schedule = Schedule::parse("every day at 09:00").unwrap();
    let now = friday_noon();
    let next = schedule.next_from(&now).unwrap();
    let prev = schedule.previous_from(&now).unwrap();
    assert_eq!(next, zoned("2026-02-07T09:00:00+00:00[UTC]"));
    assert_eq!(prev, zoned("2026-02-06T09:00:00+00:00[UTC]"));
    assert!(schedule.matches(&next));
    assert!(schedule.matches(&prev));
    assert!(!schedule.matches(&now));
}

#[test]
fn next_from_converts_the_reference_instant() {
    let schedule = Schedule::parse("every day at 09:00 in Asia/Tokyo").unwrap();
    // 2026-02-06T12:00Z is 21:00 in Tokyo.
    let next = schedule.next_from(&friday_noon()).unwrap();
    assert_eq!(next.to_string(), "2026-02-07T09:00:00+09:00[Asia/Tokyo]");
}

#[test]
fn cron_both_ways() {
    let schedule = Schedule::from_cron("0 9 * * 1-5").unwrap();
    assert_eq!(schedule.to_string(), "every weekday at 09:00");
    assert_eq!(schedule.to_cron().unwrap(), "0 9 * * 1-5");

    let err = Schedule::parse("every day at 09:00 except dec 25")
        .unwrap()
        .to_cron()
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Cron { .. }));
    assert_eq!(
        hron::cron::explain_cron("0 17 * * 5L").unwrap(),
        "last fri of every month at 17:00"
    );
}

#[test]
fn lex_errors_point_at_the_word() {
    let err = Schedule::parse("evry day at 09:00").unwrap_err();
    assert!(matches!(err, ScheduleError::Lex { .. }));
    assert_eq!(err.span().map(|s| (s.start, s.end)), Some((0, 4)));
    assert_eq!(
        err.display_rich(),
        "error: unknown keyword 'evry'\n  evry day at 09:00\n  ^^^^"
    );
}

#[test]
fn parse_errors_carry_suggestions() {
    let err = Schedule::parse("every day 09:00").unwrap_err();
    assert!(matches!(err, ScheduleError::Parse { .. }));
    assert_eq!(err.suggestion(), Some("at 09:00"));
    assert!(err.display_rich().ends_with("^^^^^ try: \"at 09:00\""));
}

#[test]
fn until_and_except_shape_the_sequence() {
    let schedule =
        Schedule::parse("every day at 09:00 except 2026-02-08 until 2026-02-10").unwrap();
    let days: Vec<i8> = schedule.occurrences(&friday_noon()).map(|z| z.day()).collect();
    assert_eq!(days, [7, 9, 10]);
}

#[test]
fn during_restricts_months() {
    let schedule = Schedule::parse("every month on the 1st at 09:00 during mar, jun").unwrap();
    let hits: Vec<i8> = schedule
        .occurrences(&friday_noon())
        .take(3)
        .map(|z| z.month())
        .collect();
    assert_eq!(hits, [3, 6, 3]);
}

#[test]
fn starting_anchors_intervals() {
    let schedule = Schedule::parse("every 3 days at 09:00 starting 2026-02-10").unwrap();
    let hits: Vec<i8> = schedule.next_n_from(&friday_noon(), 3).iter().map(|z| z.day()).collect();
    assert_eq!(hits, [10, 13, 16]);
    assert_eq!(schedule.previous_from(&friday_noon()), None);
}

#[test]
fn schedules_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schedule>();
    assert_send_sync::<ScheduleError>();
}

#[cfg(feature = "serde")]
#[test]
fn data_serializes_structurally() {
    let data = hron::parser::parse("every 2 weeks on mon at 09:00 in UTC").unwrap();
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["expr"]["kind"], "week_repeat");
    assert_eq!(json["expr"]["interval"], 2);
    assert_eq!(json["expr"]["times"][0], "09:00");
    assert_eq!(json["timezone"], "UTC");
    let back: ScheduleData = serde_json::from_value(json).unwrap();
    assert_eq!(back, data);
}
