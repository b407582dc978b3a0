//! Occurrence evaluation.
//!
//! [`forward`] and [`backward`] compute raw candidates for the expression
//! alone; this module layers the `except`, `until`, `during` and `starting`
//! clauses on top and owns the lazy iterators.
//!
//! Every search is bounded. Running out of attempts means "no further
//! occurrence" and is reported as `None`, never as an error.

mod backward;
pub(crate) mod calendar;
mod forward;

use std::iter::FusedIterator;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Span, Zoned};
use tracing::{debug, trace};

use crate::ast::*;
use calendar::{EPOCH, EPOCH_MONDAY};

/// Outer retry budget shared by `next_from` and `previous_from`.
const MAX_ATTEMPTS: usize = 1000;
/// Months between jiff's earliest and latest supported dates.
const MAX_MONTHS: usize = 240_000;

/// Clause data the per-variant searches need.
pub(crate) struct Context<'a> {
    pub(crate) tz: &'a TimeZone,
    anchor: Option<Date>,
    during: &'a [MonthName],
}

impl<'a> Context<'a> {
    fn new(data: &'a ScheduleData, tz: &'a TimeZone) -> Self {
        Self {
            tz,
            anchor: data.anchor,
            during: &data.during,
        }
    }

    fn anchor_or(&self, default: Date) -> Date {
        self.anchor.unwrap_or(default)
    }

    /// The explicit `starting` date when it constrains results, i.e. for
    /// intervals above one.
    fn floor(&self, interval: u32) -> Option<Date> {
        if interval > 1 {
            self.anchor
        } else {
            None
        }
    }

    fn in_season(&self, date: Date) -> bool {
        in_during(self.during, date)
    }
}

fn in_during(during: &[MonthName], date: Date) -> bool {
    during.is_empty()
        || MonthName::from_number(date.month() as u8).is_some_and(|m| during.contains(&m))
}

/// Directional nearest-weekday targets can land in a neighbouring month, so
/// they check `during` against the month they were computed for.
fn filters_during_itself(expr: &ScheduleExpr) -> bool {
    matches!(
        expr,
        ScheduleExpr::MonthRepeat {
            target: MonthTarget::NearestWeekday {
                direction: Some(_),
                ..
            },
            ..
        }
    )
}

/// Concrete `until` date as seen from `today`. A named date is this year's
/// if that is not already past, otherwise the next year that has it.
fn resolve_until(until: UntilSpec, today: Date) -> Option<Date> {
    match until {
        DateSpec::Iso(date) => Some(date),
        DateSpec::Named { month, day } => (0..8).find_map(|offset| {
            let date = Date::new(today.year() + offset, month.number() as i8, day as i8).ok()?;
            (date >= today).then_some(date)
        }),
    }
}

/// First day of the next month after `date`'s that `during` allows.
fn next_season_start(during: &[MonthName], date: Date) -> Option<Date> {
    (1..=12)
        .filter_map(|k| calendar::shift_month(date, k))
        .find(|&month| in_during(during, month))
}

/// Last day of the closest earlier month that `during` allows.
fn previous_season_end(during: &[MonthName], date: Date) -> Option<Date> {
    (1..=12)
        .filter_map(|k| calendar::shift_month(date, -k))
        .find(|&month| in_during(during, month))
        .map(|month| month.last_of_month())
}

/// Interval-repeat slot times inside the window.
fn slots(from: TimeOfDay, to: TimeOfDay, step: u64) -> impl DoubleEndedIterator<Item = TimeOfDay> {
    (from.total_minutes()..to.total_minutes() + 1)
        .step_by(usize::try_from(step.max(1)).unwrap_or(usize::MAX))
        .filter_map(TimeOfDay::from_minutes)
}

/// Days a monthly target selects in the month starting at `month_start`,
/// ascending. Directional nearest targets may return a neighbouring date.
fn month_target_dates(target: &MonthTarget, month_start: Date) -> Vec<Date> {
    match target {
        MonthTarget::Days { .. } => target
            .expand_days()
            .into_iter()
            .filter_map(|day| calendar::day_in_month(month_start, day))
            .collect(),
        MonthTarget::LastDay => vec![month_start.last_of_month()],
        MonthTarget::LastWeekday => calendar::last_weekday(month_start).into_iter().collect(),
        MonthTarget::NearestWeekday { day, direction } => {
            calendar::nearest_weekday(month_start, *day, *direction)
                .into_iter()
                .collect()
        }
        MonthTarget::OrdinalWeekday { ordinal, weekday } => {
            calendar::ordinal_weekday(month_start, *ordinal, *weekday)
                .into_iter()
                .collect()
        }
    }
}

fn year_target_date(target: &YearTarget, year: i16) -> Option<Date> {
    let month_start = Date::new(year, target.month().number() as i8, 1).ok()?;
    match *target {
        YearTarget::Date { day, .. } | YearTarget::DayOfMonth { day, .. } => {
            calendar::day_in_month(month_start, day)
        }
        YearTarget::OrdinalWeekday {
            ordinal, weekday, ..
        } => calendar::ordinal_weekday(month_start, ordinal, weekday),
        YearTarget::LastWeekday { .. } => calendar::last_weekday(month_start),
    }
}

/// Is `month_start`'s month on the interval grid?
/// Months scanned for a month repeat: two aligned years, capped at the
/// calendar's range.
fn month_horizon(interval: u32) -> usize {
    24usize.saturating_mul(interval.max(1) as usize).min(MAX_MONTHS)
}

fn month_aligned(cx: &Context<'_>, interval: u32, month_start: Date) -> bool {
    if interval <= 1 {
        return true;
    }
    let offset = calendar::month_index(month_start) - calendar::month_index(cx.anchor_or(EPOCH));
    offset.rem_euclid(i64::from(interval)) == 0 && (cx.anchor.is_none() || offset >= 0)
}

fn year_aligned(cx: &Context<'_>, interval: u32, year: i16) -> bool {
    if interval <= 1 {
        return true;
    }
    let offset = i64::from(year) - i64::from(cx.anchor_or(EPOCH).year());
    offset.rem_euclid(i64::from(interval)) == 0 && (cx.anchor.is_none() || offset >= 0)
}

/// Earliest occurrence strictly after `now`.
pub(crate) fn next_from(data: &ScheduleData, tz: &TimeZone, now: &Zoned) -> Option<Zoned> {
    let cx = Context::new(data, tz);
    let today = now.with_time_zone(tz.clone()).date();
    let until = data.until.and_then(|u| resolve_until(u, today));
    let own_season = filters_during_itself(&data.expr);

    let mut origin = now.clone();
    for _ in 0..MAX_ATTEMPTS {
        let candidate = forward::next_candidate(&data.expr, &cx, &origin)?;
        let date = candidate.date();

        if data.except.iter().any(|e| e.covers(date)) {
            trace!(%date, "skipping excepted date");
            origin = calendar::just_before(date.tomorrow().ok()?, tz)?;
            continue;
        }
        if until.is_some_and(|until| date > until) {
            trace!(%date, "candidate past until date");
            return None;
        }
        if !own_season && !cx.in_season(date) {
            let resume = next_season_start(cx.during, date)?;
            trace!(%date, %resume, "candidate outside during months");
            origin = calendar::just_before(resume, tz)?;
            continue;
        }
        return Some(candidate);
    }
    debug!(expr = %data.expr, "forward search exhausted");
    None
}

/// Latest occurrence strictly before `now`.
pub(crate) fn previous_from(data: &ScheduleData, tz: &TimeZone, now: &Zoned) -> Option<Zoned> {
    let cx = Context::new(data, tz);
    let today = now.with_time_zone(tz.clone()).date();
    let until = data.until.and_then(|u| resolve_until(u, today));
    let floor = cx.floor(data.expr.interval());
    let own_season = filters_during_itself(&data.expr);

    let mut origin = now.clone();
    for _ in 0..MAX_ATTEMPTS {
        let candidate = backward::previous_candidate(&data.expr, &cx, &origin)?;
        let date = candidate.date();

        if floor.is_some_and(|floor| date < floor) {
            trace!(%date, "candidate before starting date");
            return None;
        }
        if let Some(until) = until.filter(|&until| date > until) {
            trace!(%date, %until, "rebasing onto until date");
            origin = calendar::start_of_day(until.tomorrow().ok()?, tz)?;
            continue;
        }
        if !own_season && !cx.in_season(date) {
            let resume = previous_season_end(cx.during, date)?;
            trace!(%date, %resume, "candidate outside during months");
            origin = calendar::start_of_day(resume.tomorrow().ok()?, tz)?;
            continue;
        }
        if data.except.iter().any(|e| e.covers(date)) {
            trace!(%date, "skipping excepted date");
            origin = calendar::start_of_day(date, tz)?;
            continue;
        }
        return Some(candidate);
    }
    debug!(expr = %data.expr, "backward search exhausted");
    None
}

/// Does the schedule fire at exactly `instant`?
///
/// Checked structurally: the instant's local date must pass every clause and
/// the expression's date rule, and one scheduled wall time on that date,
/// resolved through the gap/fold policy, must be the same instant.
pub(crate) fn matches(data: &ScheduleData, tz: &TimeZone, instant: &Zoned) -> bool {
    let cx = Context::new(data, tz);
    let local = instant.with_time_zone(tz.clone());
    let date = local.date();

    if data.except.iter().any(|e| e.covers(date)) {
        return false;
    }
    if data
        .until
        .and_then(|u| resolve_until(u, date))
        .is_some_and(|until| date > until)
    {
        return false;
    }
    if cx.floor(data.expr.interval()).is_some_and(|floor| date < floor) {
        return false;
    }
    if !filters_during_itself(&data.expr) && !cx.in_season(date) {
        return false;
    }

    let fires_at = |times: &[TimeOfDay]| {
        times.iter().any(|&t| {
            calendar::at_time(date, t, tz).is_some_and(|z| z.timestamp() == local.timestamp())
        })
    };

    match &data.expr {
        ScheduleExpr::DayRepeat {
            interval,
            days,
            times,
        } => {
            days.accepts(calendar::weekday_of(date))
                && (*interval <= 1
                    || calendar::days_between(cx.anchor_or(EPOCH), date)
                        .rem_euclid(i64::from(*interval))
                        == 0)
                && fires_at(times)
        }
        ScheduleExpr::IntervalRepeat {
            interval,
            unit,
            from,
            to,
            day_filter,
        } => {
            if !day_filter
                .as_ref()
                .map_or(true, |f| f.accepts(calendar::weekday_of(date)))
            {
                return false;
            }
            let mut all = slots(*from, *to, unit.step_minutes(*interval));
            if calendar::has_transition(date, tz) {
                let all: Vec<_> = all.collect();
                fires_at(&all)
            } else {
                let wall = TimeOfDay::new(local.hour() as u8, local.minute() as u8);
                wall.is_some_and(|wall| all.any(|s| s == wall) && fires_at(&[wall]))
            }
        }
        ScheduleExpr::WeekRepeat {
            interval,
            days,
            times,
        } => {
            let aligned = || {
                let anchor = calendar::monday_of(cx.anchor_or(EPOCH_MONDAY));
                let monday = calendar::monday_of(date);
                match (anchor, monday) {
                    (Some(anchor), Some(monday)) => (calendar::days_between(anchor, monday) / 7)
                        .rem_euclid(i64::from(*interval))
                        == 0,
                    _ => false,
                }
            };
            days.contains(&calendar::weekday_of(date)) && aligned() && fires_at(times)
        }
        ScheduleExpr::MonthRepeat {
            interval,
            target,
            times,
        } => {
            let hit = if filters_during_itself(&data.expr) {
                // The date may belong to the previous or next month's target.
                (-1..=1)
                    .filter_map(|k| calendar::shift_month(date, k))
                    .filter(|&month| cx.in_season(month) && month_aligned(&cx, *interval, month))
                    .any(|month| month_target_dates(target, month).contains(&date))
            } else {
                let month = date.first_of_month();
                month_aligned(&cx, *interval, month)
                    && month_target_dates(target, month).contains(&date)
            };
            hit && fires_at(times)
        }
        ScheduleExpr::OrdinalRepeat {
            interval,
            ordinal,
            day,
            times,
        } => {
            let month = date.first_of_month();
            month_aligned(&cx, *interval, month)
                && calendar::ordinal_weekday(month, *ordinal, *day) == Some(date)
                && fires_at(times)
        }
        ScheduleExpr::SingleDate { date: spec, times } => spec.covers(date) && fires_at(times),
        ScheduleExpr::YearRepeat {
            interval,
            target,
            times,
        } => {
            year_aligned(&cx, *interval, date.year())
                && year_target_date(target, date.year()) == Some(date)
                && fires_at(times)
        }
    }
}

/// Lazy, unbounded sequence of occurrences after a starting instant.
///
/// Each step searches from one minute past the previous result. Cloning
/// captures the cursor, so a clone replays the same sequence.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    data: &'a ScheduleData,
    tz: &'a TimeZone,
    cursor: Option<Zoned>,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn new(data: &'a ScheduleData, tz: &'a TimeZone, from: Zoned) -> Self {
        Self {
            data,
            tz,
            cursor: Some(from),
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Zoned;

    fn next(&mut self) -> Option<Zoned> {
        let cursor = self.cursor.take()?;
        let hit = next_from(self.data, self.tz, &cursor)?;
        self.cursor = hit.checked_add(Span::new().minutes(1)).ok();
        Some(hit)
    }
}

impl FusedIterator for Occurrences<'_> {}

/// Occurrences in `(from, to]`.
#[derive(Debug, Clone)]
pub struct Between<'a> {
    inner: Occurrences<'a>,
    to: Zoned,
}

impl<'a> Between<'a> {
    pub(crate) fn new(data: &'a ScheduleData, tz: &'a TimeZone, from: Zoned, to: Zoned) -> Self {
        Self {
            inner: Occurrences::new(data, tz, from),
            to,
        }
    }
}

impl Iterator for Between<'_> {
    type Item = Zoned;

    fn next(&mut self) -> Option<Zoned> {
        let hit = self.inner.next()?;
        if hit > self.to {
            self.inner.cursor = None;
            return None;
        }
        Some(hit)
    }
}

impl FusedIterator for Between<'_> {}
