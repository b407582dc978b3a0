//! Canonical text form. Parsing the output of `to_string` yields an equal
//! [`ScheduleData`], and rendering that again yields the same text.

use std::fmt::{self, Display, Formatter};

use crate::ast::*;

/// Write `items` separated by `", "`.
fn list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// `1st`, `2nd`, `3rd`, `11th`, `22nd` ...
pub(crate) fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

struct Nth(u8);

impl Display for Nth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, ordinal_suffix(self.0.into()))
    }
}

/// ` month` for an interval of 1, otherwise ` N months`.
fn every_n(f: &mut Formatter<'_>, interval: u32, unit: &str) -> fmt::Result {
    if interval > 1 {
        write!(f, "every {interval} {unit}s")
    } else {
        write!(f, "every {unit}")
    }
}

fn at_times(f: &mut Formatter<'_>, times: &[TimeOfDay]) -> fmt::Result {
    f.write_str(" at ")?;
    list(f, times)
}

impl Display for ScheduleData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if !self.except.is_empty() {
            f.write_str(" except ")?;
            list(f, &self.except)?;
        }
        if let Some(until) = &self.until {
            write!(f, " until {until}")?;
        }
        if let Some(anchor) = &self.anchor {
            write!(f, " starting {anchor}")?;
        }
        if !self.during.is_empty() {
            f.write_str(" during ")?;
            list(f, &self.during)?;
        }
        if let Some(tz) = &self.timezone {
            write!(f, " in {tz}")?;
        }
        Ok(())
    }
}

impl Display for ScheduleExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntervalRepeat {
                interval,
                unit,
                from,
                to,
                day_filter,
            } => {
                let unit = match (unit, *interval) {
                    (IntervalUnit::Minutes, 1) => "minute",
                    (IntervalUnit::Minutes, _) => "min",
                    (IntervalUnit::Hours, 1) => "hour",
                    (IntervalUnit::Hours, _) => "hours",
                };
                write!(f, "every {interval} {unit} from {from} to {to}")?;
                if let Some(days) = day_filter {
                    write!(f, " on {days}")?;
                }
                Ok(())
            }
            Self::DayRepeat {
                interval,
                days,
                times,
            } => {
                if *interval > 1 {
                    write!(f, "every {interval} days")?;
                } else {
                    write!(f, "every {days}")?;
                }
                at_times(f, times)
            }
            Self::WeekRepeat {
                interval,
                days,
                times,
            } => {
                every_n(f, *interval, "week")?;
                f.write_str(" on ")?;
                list(f, days)?;
                at_times(f, times)
            }
            Self::MonthRepeat {
                interval,
                target,
                times,
            } => {
                every_n(f, *interval, "month")?;
                write!(f, " on the {target}")?;
                at_times(f, times)
            }
            Self::OrdinalRepeat {
                interval,
                ordinal,
                day,
                times,
            } => {
                write!(f, "{ordinal} {day} of ")?;
                every_n(f, *interval, "month")?;
                at_times(f, times)
            }
            Self::SingleDate { date, times } => {
                write!(f, "on {date}")?;
                at_times(f, times)
            }
            Self::YearRepeat {
                interval,
                target,
                times,
            } => {
                every_n(f, *interval, "year")?;
                write!(f, " on {target}")?;
                at_times(f, times)
            }
        }
    }
}

impl Display for DayFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every => f.write_str("day"),
            Self::Weekday => f.write_str("weekday"),
            Self::Weekend => f.write_str("weekend"),
            Self::Days(days) => list(f, days),
        }
    }
}

impl Display for DateSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { month, day } => write!(f, "{month} {day}"),
            Self::Iso(date) => write!(f, "{date}"),
        }
    }
}

impl Display for DayOfMonthSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Single(d) => write!(f, "{}", Nth(d)),
            Self::Range(start, end) => write!(f, "{} to {}", Nth(start), Nth(end)),
        }
    }
}

impl Display for MonthTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days { specs } => list(f, specs),
            Self::LastDay => f.write_str("last day"),
            Self::LastWeekday => f.write_str("last weekday"),
            Self::NearestWeekday { day, direction } => {
                match direction {
                    Some(NearestDirection::Next) => f.write_str("next ")?,
                    Some(NearestDirection::Previous) => f.write_str("previous ")?,
                    None => {}
                }
                write!(f, "nearest weekday to {}", Nth(*day))
            }
            Self::OrdinalWeekday { ordinal, weekday } => write!(f, "{ordinal} {weekday}"),
        }
    }
}

impl Display for YearTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date { month, day } => write!(f, "{month} {day}"),
            Self::OrdinalWeekday {
                ordinal,
                weekday,
                month,
            } => write!(f, "the {ordinal} {weekday} of {month}"),
            Self::DayOfMonth { day, month } => write!(f, "the {} of {month}", Nth(*day)),
            Self::LastWeekday { month } => write!(f, "the last weekday of {month}"),
        }
    }
}
