//! Daylight-saving transitions. A wall time inside a spring-forward gap
//! moves forward by the gap length; a wall time repeated by a fall-back
//! transition fires once, at the earlier offset.

use hron::Schedule;
use jiff::Zoned;

fn zoned(s: &str) -> Zoned {
    s.parse().expect("valid zoned datetime")
}

fn hm(z: &Zoned) -> (i8, i8) {
    (z.hour(), z.minute())
}

#[test]
fn gap_pushes_forward_by_gap_length() {
    let schedule = Schedule::parse("every day at 02:30 in America/New_York").unwrap();
    let now = zoned("2026-03-07T12:00:00-05:00[America/New_York]");
    let hits = schedule.next_n_from(&now, 2);
    assert_eq!(hits[0].to_string(), "2026-03-08T03:30:00-04:00[America/New_York]");
    assert_eq!(hits[1].to_string(), "2026-03-09T02:30:00-04:00[America/New_York]");
}

#[test]
fn gap_in_london() {
    let schedule = Schedule::parse("every day at 01:15 in Europe/London").unwrap();
    let now = zoned("2026-03-28T12:00:00+00:00[Europe/London]");
    let next = schedule.next_from(&now).unwrap();
    assert_eq!(next.to_string(), "2026-03-29T02:15:00+01:00[Europe/London]");
}

#[test]
fn fold_fires_once_at_the_earlier_offset() {
    let schedule = Schedule::parse("every day at 01:30 in America/New_York").unwrap();
    let now = zoned("2026-10-31T12:00:00-04:00[America/New_York]");
    let hits = schedule.next_n_from(&now, 2);
    assert_eq!(hits[0].to_string(), "2026-11-01T01:30:00-04:00[America/New_York]");
    assert_eq!(hits[1].to_string(), "2026-11-02T01:30:00-05:00[America/New_York]");
}

#[test]
fn fold_in_the_southern_hemisphere() {
    // Sydney leaves daylight saving on 2026-04-05 at 03:00.
    let schedule = Schedule::parse("every day at 02:30 in Australia/Sydney").unwrap();
    let now = zoned("2026-04-04T12:00:00+11:00[Australia/Sydney]");
    let next = schedule.next_from(&now).unwrap();
    assert_eq!(next.offset().seconds(), 11 * 3600);
    assert_eq!(hm(&next), (2, 30));
}

#[test]
fn matches_only_the_first_pass_through_a_fold() {
    let schedule = Schedule::parse("every day at 01:30 in America/New_York").unwrap();
    assert!(schedule.matches(&zoned("2026-11-01T01:30:00-04:00[America/New_York]")));
    assert!(!schedule.matches(&zoned("2026-11-01T01:30:00-05:00[America/New_York]")));
}

#[test]
fn matches_the_shifted_gap_time() {
    let schedule = Schedule::parse("every day at 02:30 in America/New_York").unwrap();
    assert!(schedule.matches(&zoned("2026-03-08T03:30:00-04:00[America/New_York]")));
    assert!(schedule.matches(&zoned("2026-03-09T02:30:00-04:00[America/New_York]")));
}

#[test]
fn previous_across_a_gap() {
    let schedule = Schedule::parse("every day at 02:30 in America/New_York").unwrap();
    let now = zoned("2026-03-09T00:00:00-04:00[America/New_York]");
    let prev = schedule.previous_from(&now).unwrap();
    assert_eq!(prev.to_string(), "2026-03-08T03:30:00-04:00[America/New_York]");
}

#[test]
fn interval_window_through_a_gap() {
    let schedule =
        Schedule::parse("every 30 min from 01:00 to 04:00 in America/New_York").unwrap();
    let from = zoned("2026-03-08T00:00:00-05:00[America/New_York]");
    let to = zoned("2026-03-08T05:00:00-04:00[America/New_York]");
    let hits: Vec<(i8, i8)> = schedule.between(&from, &to).map(|z| hm(&z)).collect();
    // 02:00 and 02:30 land on 03:00 and 03:30, which already fire.
    assert_eq!(hits, [(1, 0), (1, 30), (3, 0), (3, 30), (4, 0)]);
}

#[test]
fn interval_window_through_a_fold() {
    let schedule =
        Schedule::parse("every 30 min from 00:30 to 02:30 in America/New_York").unwrap();
    let from = zoned("2026-11-01T00:00:00-04:00[America/New_York]");
    let to = zoned("2026-11-01T03:00:00-05:00[America/New_York]");
    let hits: Vec<String> = schedule
        .between(&from, &to)
        .map(|z| z.timestamp().to_string())
        .collect();
    assert_eq!(
        hits,
        [
            "2026-11-01T04:30:00Z",
            "2026-11-01T05:00:00Z",
            "2026-11-01T05:30:00Z",
            "2026-11-01T07:00:00Z",
            "2026-11-01T07:30:00Z",
        ]
    );
}

#[test]
fn weekly_keeps_wall_time_across_transition() {
    let schedule = Schedule::parse("every monday at 09:00 in America/New_York").unwrap();
    let from = zoned("2026-03-01T00:00:00-05:00[America/New_York]");
    let hits = schedule.next_n_from(&from, 2);
    assert_eq!(hits[0].to_string(), "2026-03-02T09:00:00-05:00[America/New_York]");
    assert_eq!(hits[1].to_string(), "2026-03-09T09:00:00-04:00[America/New_York]");
}

#[test]
fn hourly_interval_skips_the_missing_hour() {
    let schedule = Schedule::parse("every 1 hour from 00:00 to 05:00 in America/New_York").unwrap();
    let from = zoned("2026-03-07T23:00:00-05:00[America/New_York]");
    let to = zoned("2026-03-08T06:00:00-04:00[America/New_York]");
    let hours: Vec<i8> = schedule.between(&from, &to).map(|z| z.hour()).collect();
    assert_eq!(hours, [0, 1, 3, 4, 5]);
}
