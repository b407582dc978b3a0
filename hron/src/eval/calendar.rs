//! Pure calendar arithmetic. Everything here returns `Option` and treats an
//! out-of-range result as "no such date".

use jiff::civil::{self, Date};
use jiff::tz::TimeZone;
use jiff::{Span, Zoned};

use crate::ast::{NearestDirection, OrdinalPosition, TimeOfDay, Weekday};

/// Default alignment anchor for day, month and year intervals.
pub(crate) const EPOCH: Date = civil::date(1970, 1, 1);

/// Default alignment anchor for week intervals.
pub(crate) const EPOCH_MONDAY: Date = civil::date(1970, 1, 5);

/// Year bounds of jiff's civil calendar.
pub(crate) const MIN_YEAR: i16 = -9999;
pub(crate) const MAX_YEAR: i16 = 9999;

pub(crate) fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Span::new().try_days(days).ok()?).ok()
}

/// Signed day count from `a` to `b`.
pub(crate) fn days_between(a: Date, b: Date) -> i64 {
    a.until(b).map_or(0, |span| i64::from(span.get_days()))
}

/// `year * 12 + month - 1`, so consecutive months differ by one.
pub(crate) fn month_index(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month()) - 1
}

/// First day of the month `delta` months away from `date`'s month.
pub(crate) fn shift_month(date: Date, delta: i64) -> Option<Date> {
    let index = month_index(date) + delta;
    let year = i16::try_from(index.div_euclid(12)).ok()?;
    let month = (index.rem_euclid(12) + 1) as i8;
    Date::new(year, month, 1).ok()
}

pub(crate) fn monday_of(date: Date) -> Option<Date> {
    add_days(date, -i64::from(date.weekday().to_monday_zero_offset()))
}

pub(crate) fn weekday_of(date: Date) -> Weekday {
    Weekday::from_jiff(date.weekday())
}

pub(crate) fn is_weekend(date: Date) -> bool {
    weekday_of(date).is_weekend()
}

/// `day` of `month_start`'s month, if the month has it.
pub(crate) fn day_in_month(month_start: Date, day: u8) -> Option<Date> {
    Date::new(month_start.year(), month_start.month(), i8::try_from(day).ok()?).ok()
}

/// Last Monday-to-Friday day of the month.
pub(crate) fn last_weekday(month_start: Date) -> Option<Date> {
    let mut date = month_start.last_of_month();
    while is_weekend(date) {
        date = date.yesterday().ok()?;
    }
    Some(date)
}

/// `first monday`, `last friday` and so on. A fifth occurrence that spills
/// into the next month is `None`.
pub(crate) fn ordinal_weekday(
    month_start: Date,
    ordinal: OrdinalPosition,
    weekday: Weekday,
) -> Option<Date> {
    let nth = ordinal.nth().map_or(-1, |n| n as i8);
    month_start
        .nth_weekday_of_month(nth, weekday.to_jiff())
        .ok()
}

/// Weekday closest to `day` in the month starting at `month_start`.
///
/// Without a direction the result never leaves the month (cron `W`): a
/// Saturday on the 1st moves to Monday the 3rd, a Sunday on the last day
/// moves back to Friday. `Next` and `Previous` always move that way and
/// may land in a neighbouring month. A day the month does not have is `None`.
pub(crate) fn nearest_weekday(
    month_start: Date,
    day: u8,
    direction: Option<NearestDirection>,
) -> Option<Date> {
    let date = day_in_month(month_start, day)?;
    let shift = match (weekday_of(date), direction) {
        (Weekday::Saturday, None) if date.day() == 1 => 2,
        (Weekday::Saturday, None | Some(NearestDirection::Previous)) => -1,
        (Weekday::Saturday, Some(NearestDirection::Next)) => 2,
        (Weekday::Sunday, None) if date == date.last_of_month() => -2,
        (Weekday::Sunday, None | Some(NearestDirection::Next)) => 1,
        (Weekday::Sunday, Some(NearestDirection::Previous)) => -2,
        _ => 0,
    };
    add_days(date, shift)
}

/// Wall-clock `time` on `date` in `tz`. A time inside a spring-forward gap
/// moves forward by the gap length; an ambiguous time takes the earlier
/// offset.
pub(crate) fn at_time(date: Date, time: TimeOfDay, tz: &TimeZone) -> Option<Zoned> {
    date.to_datetime(time.to_jiff()?).to_zoned(tz.clone()).ok()
}

/// First instant of `date` in `tz`.
pub(crate) fn start_of_day(date: Date, tz: &TimeZone) -> Option<Zoned> {
    date.to_zoned(tz.clone()).ok()
}

/// One second before `date` begins. Searching forward from here starts at
/// `date`.
pub(crate) fn just_before(date: Date, tz: &TimeZone) -> Option<Zoned> {
    start_of_day(date, tz)?
        .checked_sub(Span::new().seconds(1))
        .ok()
}

/// Does the UTC offset change at some point during `date`?
pub(crate) fn has_transition(date: Date, tz: &TimeZone) -> bool {
    let start = start_of_day(date, tz);
    let end = date.tomorrow().ok().and_then(|d| start_of_day(d, tz));
    match (start, end) {
        (Some(start), Some(end)) => start.offset() != end.offset(),
        _ => false,
    }
}

/// Earliest of `times` on `date` strictly after `now`.
pub(crate) fn earliest_after(
    date: Date,
    times: &[TimeOfDay],
    tz: &TimeZone,
    now: &Zoned,
) -> Option<Zoned> {
    times
        .iter()
        .filter_map(|&t| at_time(date, t, tz))
        .filter(|candidate| candidate > now)
        .min()
}

/// Latest of `times` on `date` strictly before `now`.
pub(crate) fn latest_before(
    date: Date,
    times: &[TimeOfDay],
    tz: &TimeZone,
    now: &Zoned,
) -> Option<Zoned> {
    times
        .iter()
        .filter_map(|&t| at_time(date, t, tz))
        .filter(|candidate| candidate < now)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn epoch_anchors() {
        assert_eq!(EPOCH_MONDAY.weekday(), jiff::civil::Weekday::Monday);
        assert_eq!(days_between(EPOCH, date(2026, 2, 6)), 20490);
        assert_eq!(days_between(date(2026, 2, 6), EPOCH), -20490);
    }

    #[test]
    fn month_shifting() {
        assert_eq!(shift_month(date(2026, 11, 20), 3), Some(date(2027, 2, 1)));
        assert_eq!(shift_month(date(2026, 1, 31), -1), Some(date(2025, 12, 1)));
        assert_eq!(month_index(date(1970, 1, 1)), 1970 * 12);
    }

    #[test]
    fn ordinal_weekdays() {
        let feb = date(2026, 2, 1);
        assert_eq!(
            ordinal_weekday(feb, OrdinalPosition::First, Weekday::Monday),
            Some(date(2026, 2, 2))
        );
        assert_eq!(
            ordinal_weekday(feb, OrdinalPosition::Last, Weekday::Saturday),
            Some(date(2026, 2, 28))
        );
        // February 2026 has four Mondays.
        assert_eq!(
            ordinal_weekday(feb, OrdinalPosition::Fifth, Weekday::Monday),
            None
        );
        assert_eq!(
            ordinal_weekday(date(2026, 3, 1), OrdinalPosition::Fifth, Weekday::Monday),
            Some(date(2026, 3, 30))
        );
    }

    #[test]
    fn last_weekday_skips_weekend() {
        // 2026-05-31 is a Sunday.
        assert_eq!(last_weekday(date(2026, 5, 1)), Some(date(2026, 5, 29)));
        assert_eq!(last_weekday(date(2026, 3, 1)), Some(date(2026, 3, 31)));
    }

    #[test]
    fn nearest_weekday_stays_in_month() {
        // 2026-08-01 is a Saturday.
        assert_eq!(
            nearest_weekday(date(2026, 8, 1), 1, None),
            Some(date(2026, 8, 3))
        );
        // 2026-02-14 is a Saturday.
        assert_eq!(
            nearest_weekday(date(2026, 2, 1), 14, None),
            Some(date(2026, 2, 13))
        );
        // 2026-02-15 is a Sunday.
        assert_eq!(
            nearest_weekday(date(2026, 2, 1), 15, None),
            Some(date(2026, 2, 16))
        );
        // 2026-05-31 is a Sunday and the last day of May.
        assert_eq!(
            nearest_weekday(date(2026, 5, 1), 31, None),
            Some(date(2026, 5, 29))
        );
        assert_eq!(
            nearest_weekday(date(2026, 2, 1), 10, None),
            Some(date(2026, 2, 10))
        );
        assert_eq!(nearest_weekday(date(2026, 2, 1), 30, None), None);
    }

    #[test]
    fn directional_nearest_crosses_months() {
        assert_eq!(
            nearest_weekday(date(2026, 8, 1), 1, Some(NearestDirection::Previous)),
            Some(date(2026, 7, 31))
        );
        assert_eq!(
            nearest_weekday(date(2026, 5, 1), 31, Some(NearestDirection::Next)),
            Some(date(2026, 6, 1))
        );
        assert_eq!(
            nearest_weekday(date(2026, 2, 1), 15, Some(NearestDirection::Previous)),
            Some(date(2026, 2, 13))
        );
        assert_eq!(
            nearest_weekday(date(2026, 2, 1), 14, Some(NearestDirection::Next)),
            Some(date(2026, 2, 16))
        );
    }

    #[test]
    fn gap_pushes_forward_and_fold_takes_earlier() {
        let ny = TimeZone::get("America/New_York").unwrap();
        let t = TimeOfDay::new(2, 30).unwrap();
        let gap = at_time(date(2026, 3, 8), t, &ny).unwrap();
        assert_eq!((gap.hour(), gap.minute()), (3, 30));

        let t = TimeOfDay::new(1, 30).unwrap();
        let fold = at_time(date(2026, 11, 1), t, &ny).unwrap();
        assert_eq!(fold.offset().seconds(), -4 * 3600);
    }

    #[test]
    fn transition_days() {
        let ny = TimeZone::get("America/New_York").unwrap();
        assert!(has_transition(date(2026, 3, 8), &ny));
        assert!(has_transition(date(2026, 11, 1), &ny));
        assert!(!has_transition(date(2026, 3, 9), &ny));
        assert!(!has_transition(date(2026, 3, 8), &TimeZone::UTC));
    }

    #[test]
    fn earliest_and_latest() {
        let times = [TimeOfDay::new(17, 0).unwrap(), TimeOfDay::new(9, 0).unwrap()];
        let now = date(2026, 2, 6)
            .at(12, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap();
        let next = earliest_after(date(2026, 2, 6), &times, &TimeZone::UTC, &now).unwrap();
        assert_eq!(next.hour(), 17);
        let prev = latest_before(date(2026, 2, 6), &times, &TimeZone::UTC, &now).unwrap();
        assert_eq!(prev.hour(), 9);
        assert!(earliest_after(date(2026, 2, 5), &times, &TimeZone::UTC, &now).is_none());
    }
}
