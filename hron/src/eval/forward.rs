//! Next candidate per expression shape, ignoring `except`, `until` and
//! `during` (except where noted).

use jiff::civil::Date;
use jiff::Zoned;

use super::calendar::{self, earliest_after, EPOCH, EPOCH_MONDAY, MAX_YEAR};
use super::{month_aligned, month_horizon, month_target_dates, slots, year_aligned, year_target_date, Context};
use crate::ast::*;

/// Day-by-day horizon for unaligned day repeats.
const DAY_SCAN: usize = 8;
/// Aligned dates tried for `every N days`.
const ALIGNED_STEPS: usize = 400;
/// Days searched for an open interval window.
const WINDOW_DAYS: usize = 400;
/// Aligned weeks tried for week repeats.
const WEEK_SCAN: usize = 54;
/// Years a named single date may lie ahead (covers leap days).
const SINGLE_DATE_YEARS: i16 = 8;

pub(super) fn next_candidate(expr: &ScheduleExpr, cx: &Context<'_>, now: &Zoned) -> Option<Zoned> {
    let now = &now.with_time_zone(cx.tz.clone());
    match expr {
        ScheduleExpr::DayRepeat {
            interval,
            days,
            times,
        } => day_repeat(cx, now, *interval, days, times),
        ScheduleExpr::IntervalRepeat {
            interval,
            unit,
            from,
            to,
            day_filter,
        } => interval_repeat(
            cx,
            now,
            unit.step_minutes(*interval),
            *from,
            *to,
            day_filter.as_ref(),
        ),
        ScheduleExpr::WeekRepeat {
            interval,
            days,
            times,
        } => week_repeat(cx, now, *interval, days, times),
        ScheduleExpr::MonthRepeat {
            interval,
            target,
            times,
        } => month_repeat(cx, now, *interval, target, times),
        ScheduleExpr::OrdinalRepeat {
            interval,
            ordinal,
            day,
            times,
        } => {
            let target = MonthTarget::OrdinalWeekday {
                ordinal: *ordinal,
                weekday: *day,
            };
            month_repeat(cx, now, *interval, &target, times)
        }
        ScheduleExpr::SingleDate { date, times } => single_date(cx, now, *date, times),
        ScheduleExpr::YearRepeat {
            interval,
            target,
            times,
        } => year_repeat(cx, now, *interval, target, times),
    }
}

fn day_repeat(
    cx: &Context<'_>,
    now: &Zoned,
    interval: u32,
    days: &DayFilter,
    times: &[TimeOfDay],
) -> Option<Zoned> {
    let today = now.date();
    let fires = |date: Date| {
        days.accepts(calendar::weekday_of(date))
            .then(|| earliest_after(date, times, cx.tz, now))
            .flatten()
    };

    if interval <= 1 {
        let mut date = today;
        for _ in 0..=DAY_SCAN {
            if let Some(hit) = fires(date) {
                return Some(hit);
            }
            date = date.tomorrow().ok()?;
        }
        return None;
    }

    let step = i64::from(interval);
    let start = cx.floor(interval).map_or(today, |floor| today.max(floor));
    let offset = calendar::days_between(cx.anchor_or(EPOCH), start);
    let mut date = calendar::add_days(start, (-offset).rem_euclid(step))?;
    for _ in 0..ALIGNED_STEPS {
        if let Some(hit) = fires(date) {
            return Some(hit);
        }
        date = calendar::add_days(date, step)?;
    }
    None
}

fn interval_repeat(
    cx: &Context<'_>,
    now: &Zoned,
    step: u64,
    from: TimeOfDay,
    to: TimeOfDay,
    filter: Option<&DayFilter>,
) -> Option<Zoned> {
    let today = now.date();
    let mut date = today;
    for _ in 0..WINDOW_DAYS {
        if filter.map_or(true, |f| f.accepts(calendar::weekday_of(date))) {
            if let Some(hit) = first_slot_after(cx, now, date, today, step, from, to) {
                return Some(hit);
            }
        }
        date = date.tomorrow().ok()?;
    }
    None
}

/// Earliest window slot on `date` after `now`. Slots resolve in wall order
/// except on days with an offset change, where every slot is checked.
fn first_slot_after(
    cx: &Context<'_>,
    now: &Zoned,
    date: Date,
    today: Date,
    step: u64,
    from: TimeOfDay,
    to: TimeOfDay,
) -> Option<Zoned> {
    let resolve = |slot| calendar::at_time(date, slot, cx.tz);
    if calendar::has_transition(date, cx.tz) {
        return slots(from, to, step)
            .filter_map(resolve)
            .filter(|hit| hit > now)
            .min();
    }
    let skip = if date == today {
        u32::from(now.hour() as u8) * 60 + u32::from(now.minute() as u8)
    } else {
        0
    };
    slots(from, to, step)
        .filter(|slot| slot.total_minutes() >= skip)
        .filter_map(resolve)
        .find(|hit| hit > now)
}

fn week_repeat(
    cx: &Context<'_>,
    now: &Zoned,
    interval: u32,
    days: &[Weekday],
    times: &[TimeOfDay],
) -> Option<Zoned> {
    let today = now.date();
    let floor = cx.floor(interval);
    let step = i64::from(interval.max(1));
    let anchor_monday = calendar::monday_of(cx.anchor_or(EPOCH_MONDAY))?;
    let this_monday = calendar::monday_of(today)?;
    let weeks = calendar::days_between(anchor_monday, this_monday) / 7;

    let mut monday = if weeks < 0 && floor.is_some() {
        anchor_monday
    } else {
        calendar::add_days(this_monday, (-weeks).rem_euclid(step) * 7)?
    };

    let mut days = days.to_vec();
    days.sort_unstable();
    days.dedup();

    for _ in 0..WEEK_SCAN {
        for day in &days {
            let date = calendar::add_days(monday, i64::from(day.number()) - 1)?;
            if date < today || floor.is_some_and(|floor| date < floor) {
                continue;
            }
            if let Some(hit) = earliest_after(date, times, cx.tz, now) {
                return Some(hit);
            }
        }
        monday = calendar::add_days(monday, step * 7)?;
    }
    None
}

/// Monthly targets, ordinal weekdays included.
fn month_repeat(
    cx: &Context<'_>,
    now: &Zoned,
    interval: u32,
    target: &MonthTarget,
    times: &[TimeOfDay],
) -> Option<Zoned> {
    let floor = cx.floor(interval);
    let directional = matches!(
        target,
        MonthTarget::NearestWeekday {
            direction: Some(_),
            ..
        }
    );
    // A directional target computed for last month can land in this one.
    let lookbehind = if directional { -1 } else { 0 };
    let mut month = calendar::shift_month(now.date(), lookbehind)?;

    for _ in 0..month_horizon(interval) {
        let in_season = !directional || cx.in_season(month);
        if in_season && month_aligned(cx, interval, month) {
            let hit = month_target_dates(target, month)
                .into_iter()
                .filter(|&date| floor.map_or(true, |floor| date >= floor))
                .filter_map(|date| earliest_after(date, times, cx.tz, now))
                .min();
            if hit.is_some() {
                return hit;
            }
        }
        month = calendar::shift_month(month, 1)?;
    }
    None
}

fn single_date(cx: &Context<'_>, now: &Zoned, spec: DateSpec, times: &[TimeOfDay]) -> Option<Zoned> {
    match spec {
        DateSpec::Iso(date) => earliest_after(date, times, cx.tz, now),
        DateSpec::Named { month, day } => (0..SINGLE_DATE_YEARS).find_map(|offset| {
            let date =
                Date::new(now.year().checked_add(offset)?, month.number() as i8, day as i8).ok()?;
            earliest_after(date, times, cx.tz, now)
        }),
    }
}

fn year_repeat(
    cx: &Context<'_>,
    now: &Zoned,
    interval: u32,
    target: &YearTarget,
    times: &[TimeOfDay],
) -> Option<Zoned> {
    let floor = cx.floor(interval);
    let first = now.year();
    let horizon = 8 * i64::from(interval.max(1));
    let last = (i64::from(first) + horizon - 1).min(i64::from(MAX_YEAR));
    (i64::from(first)..=last).find_map(|year| {
        let year = i16::try_from(year).ok()?;
        if !year_aligned(cx, interval, year) {
            return None;
        }
        let date = year_target_date(target, year)?;
        if floor.is_some_and(|floor| date < floor) {
            return None;
        }
        earliest_after(date, times, cx.tz, now)
    })
}
