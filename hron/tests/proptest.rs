use hron::{cron, Schedule};
use jiff::civil::date;
use jiff::tz::TimeZone;
use jiff::{Span, Zoned};
use proptest::prelude::*;

fn arb_time() -> impl Strategy<Value = String> {
    (0u8..24, prop_oneof![Just(0u8), Just(15), Just(30), Just(45)])
        .prop_map(|(h, m)| format!("{h:02}:{m:02}"))
}

fn arb_times() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => arb_time(),
        1 => (arb_time(), arb_time()).prop_map(|(a, b)| format!("{a}, {b}")),
    ]
}

fn arb_day_filter() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("day"),
        Just("weekday"),
        Just("weekend"),
        Just("monday"),
        Just("mon, wed, fri"),
        Just("tue, thu"),
        Just("saturday"),
    ]
}

fn arb_weekday() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"][..])
}

fn arb_month() -> impl Strategy<Value = &'static str> {
    prop::sample::select(
        &["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"][..],
    )
}

fn arb_ordinal() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&["first", "second", "third", "fourth", "fifth", "last"][..])
}

fn nth(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn every(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("every {unit}")
    } else {
        format!("every {n} {unit}s")
    }
}

/// Mostly small intervals, occasionally enormous ones.
fn arb_interval(small: std::ops::Range<u32>) -> impl Strategy<Value = u32> {
    prop_oneof![
        8 => small,
        1 => 1_000_000u32..=u32::MAX,
    ]
}

fn arb_expr() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_day_filter(), arb_times()).prop_map(|(d, t)| format!("every {d} at {t}")),
        (arb_interval(2..5), arb_time()).prop_map(|(n, t)| format!("every {n} days at {t}")),
        (
            prop::sample::select(&[15u32, 20, 30, 45, 90, 100_000, u32::MAX][..]),
            0u8..10,
            12u8..24,
        )
            .prop_map(|(n, a, b)| format!("every {n} min from {a:02}:00 to {b:02}:30")),
        (arb_interval(1..4), 0u8..6, arb_day_filter())
            .prop_map(|(n, a, d)| format!("every {n} hours from {a:02}:00 to 20:00 on {d}")),
        (arb_interval(1..4), arb_weekday(), arb_times())
            .prop_map(|(n, d, t)| format!("every {n} weeks on {d} at {t}")),
        (arb_interval(1..4), 1u8..32, arb_time())
            .prop_map(|(n, d, t)| format!("{} on the {} at {t}", every(n, "month"), nth(d))),
        (arb_interval(1..3), prop_oneof![Just("last day"), Just("last weekday")], arb_time())
            .prop_map(|(n, target, t)| format!("{} on the {target} at {t}", every(n, "month"))),
        (arb_ordinal(), arb_weekday(), arb_interval(1..3), arb_time())
            .prop_map(|(o, d, n, t)| format!("{o} {d} of {} at {t}", every(n, "month"))),
        (arb_interval(1..3), arb_month(), 1u8..29, arb_time())
            .prop_map(|(n, m, d, t)| format!("{} on {m} {d} at {t}", every(n, "year"))),
        (arb_ordinal(), arb_weekday(), arb_month(), arb_time())
            .prop_map(|(o, d, m, t)| format!("every year on the {o} {d} of {m} at {t}")),
        (arb_month(), 1u8..29, arb_times()).prop_map(|(m, d, t)| format!("on {m} {d} at {t}")),
    ]
}

fn arb_schedule() -> impl Strategy<Value = String> {
    (
        arb_expr(),
        prop_oneof![Just(""), Just(" except dec 25"), Just(" except 2026-07-04")],
        prop_oneof![Just(""), Just(" during mar, jun, nov")],
        prop_oneof![Just(" in UTC"), Just(" in America/New_York"), Just(" in Europe/London")],
    )
        .prop_map(|(expr, except, during, tz)| format!("{expr}{except}{during}{tz}"))
}

/// Minute-aligned instants across 2026, DST transition days included.
fn arb_instant() -> impl Strategy<Value = Zoned> {
    prop_oneof![
        0i64..365 * 24 * 60,
        // 2026-03-08 and 2026-11-01, New York transition days.
        (66i64 * 24 * 60)..(67 * 24 * 60),
        (304i64 * 24 * 60)..(305 * 24 * 60),
    ]
    .prop_map(|minutes| {
        let tz = TimeZone::get("America/New_York").unwrap();
        date(2026, 1, 1)
            .to_zoned(tz)
            .unwrap()
            .checked_add(Span::new().minutes(minutes))
            .unwrap()
    })
}

fn just_before(z: &Zoned) -> Zoned {
    z.checked_sub(Span::new().nanoseconds(1)).unwrap()
}

/// Expressions that `to_cron` accepts.
fn arb_cron_compatible() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_day_filter(), arb_time()).prop_map(|(d, t)| format!("every {d} at {t}")),
        prop::sample::select(&[1u32, 2, 3, 5, 10, 15, 20, 30][..])
            .prop_map(|n| format!("every {n} min from 00:00 to 23:59")),
        (1u32..13).prop_map(|n| format!("every {n} hours from 00:00 to 23:59")),
        (1u8..32, arb_time()).prop_map(|(d, t)| format!("every month on the {} at {t}", nth(d))),
        (1u8..29, 1u8..29, arb_time()).prop_map(|(a, b, t)| {
            format!("every month on the {}, {} at {t}", nth(a), nth(b))
        }),
        (1u8..32, arb_time())
            .prop_map(|(d, t)| format!("every month on the nearest weekday to {} at {t}", nth(d))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn canonical_form_round_trips(expr in arb_schedule()) {
        let schedule = Schedule::parse(&expr).unwrap();
        let rendered = schedule.to_string();
        let reparsed = Schedule::parse(&rendered)
            .unwrap_or_else(|e| panic!("re-parse failed for '{rendered}': {e}"));
        prop_assert_eq!(reparsed.data(), schedule.data());
        prop_assert_eq!(reparsed.to_string(), rendered);
    }

    #[test]
    fn cron_round_trips(expr in arb_cron_compatible()) {
        let schedule = Schedule::parse(&expr).unwrap();
        let cron = schedule.to_cron().unwrap();
        let back = cron::from_cron(&cron).unwrap();
        prop_assert_eq!(cron::to_cron(&back).unwrap(), cron);
    }

    #[test]
    fn next_is_after_and_previous_is_before(expr in arb_schedule(), now in arb_instant()) {
        let schedule = Schedule::parse(&expr).unwrap();
        if let Some(next) = schedule.next_from(&now) {
            prop_assert!(next > now, "next {} not after {} for '{}'", next, now, expr);
            prop_assert!(schedule.matches(&next), "next {} does not match '{}'", next, expr);
        }
        if let Some(prev) = schedule.previous_from(&now) {
            prop_assert!(prev < now, "previous {} not before {} for '{}'", prev, now, expr);
            prop_assert!(schedule.matches(&prev), "previous {} does not match '{}'", prev, expr);
        }
    }

    #[test]
    fn matches_agrees_with_next_from(expr in arb_schedule(), instant in arb_instant()) {
        let schedule = Schedule::parse(&expr).unwrap();
        let hit = schedule.next_from(&just_before(&instant)).as_ref() == Some(&instant);
        prop_assert_eq!(schedule.matches(&instant), hit, "'{}' at {}", expr, instant);
    }

    #[test]
    fn previous_and_next_agree(expr in arb_schedule(), now in arb_instant()) {
        let schedule = Schedule::parse(&expr).unwrap();
        if let Some(next) = schedule.next_from(&now) {
            if let Some(prev) = schedule.previous_from(&next) {
                prop_assert!(prev <= now, "'{}': {} lies between {} and {}", expr, prev, now, next);
            }
        }
        if let Some(prev) = schedule.previous_from(&now) {
            prop_assert_eq!(schedule.next_from(&just_before(&prev)), Some(prev));
        }
    }
}
