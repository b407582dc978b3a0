use std::fmt;

use jiff::civil::Date;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed expression plus its trailing clauses.
///
/// Built once by the parser or by [`crate::cron::from_cron`] and never
/// mutated by evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleData {
    pub expr: ScheduleExpr,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub timezone: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub except: Vec<ExceptionSpec>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub until: Option<UntilSpec>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub anchor: Option<Date>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub during: Vec<MonthName>,
}

impl ScheduleData {
    pub fn new(expr: ScheduleExpr) -> Self {
        Self {
            expr,
            timezone: None,
            except: Vec::new(),
            until: None,
            anchor: None,
            during: Vec::new(),
        }
    }

    /// True when any of `except`, `until` or `during` is present.
    pub fn has_filters(&self) -> bool {
        !self.except.is_empty() || self.until.is_some() || !self.during.is_empty()
    }
}

/// What repeats. Seven shapes, each with its own date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ScheduleExpr {
    /// `every 30 min from 09:00 to 17:00 [on weekday]`
    IntervalRepeat {
        interval: u32,
        unit: IntervalUnit,
        from: TimeOfDay,
        to: TimeOfDay,
        day_filter: Option<DayFilter>,
    },
    /// `every weekday at 09:00`, `every 3 days at 09:00`
    DayRepeat {
        interval: u32,
        days: DayFilter,
        times: Vec<TimeOfDay>,
    },
    /// `every 2 weeks on mon, fri at 09:00`
    WeekRepeat {
        interval: u32,
        days: Vec<Weekday>,
        times: Vec<TimeOfDay>,
    },
    /// `every month on the 1st, 15th at 09:00`
    MonthRepeat {
        interval: u32,
        target: MonthTarget,
        times: Vec<TimeOfDay>,
    },
    /// `last friday of every 2 months at 17:00`
    OrdinalRepeat {
        interval: u32,
        ordinal: OrdinalPosition,
        day: Weekday,
        times: Vec<TimeOfDay>,
    },
    /// `on 2026-03-15 at 09:00`
    SingleDate { date: DateSpec, times: Vec<TimeOfDay> },
    /// `every year on the first monday of sep at 10:00`
    YearRepeat {
        interval: u32,
        target: YearTarget,
        times: Vec<TimeOfDay>,
    },
}

impl ScheduleExpr {
    /// Repeat interval; single dates count as 1.
    pub fn interval(&self) -> u32 {
        match self {
            Self::IntervalRepeat { interval, .. }
            | Self::DayRepeat { interval, .. }
            | Self::WeekRepeat { interval, .. }
            | Self::MonthRepeat { interval, .. }
            | Self::OrdinalRepeat { interval, .. }
            | Self::YearRepeat { interval, .. } => *interval,
            Self::SingleDate { .. } => 1,
        }
    }

    /// Fixed times of day; interval repeats generate theirs and return an empty slice.
    pub fn times(&self) -> &[TimeOfDay] {
        match self {
            Self::IntervalRepeat { .. } => &[],
            Self::DayRepeat { times, .. }
            | Self::WeekRepeat { times, .. }
            | Self::MonthRepeat { times, .. }
            | Self::OrdinalRepeat { times, .. }
            | Self::SingleDate { times, .. }
            | Self::YearRepeat { times, .. } => times,
        }
    }
}

/// `<month> <day>` or an ISO date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DateSpec {
    Named { month: MonthName, day: u8 },
    Iso(Date),
}

/// Date excluded by `except`. Named dates recur every year.
pub type ExceptionSpec = DateSpec;

/// Inclusive end bound from `until`. A named date resolves to its next
/// occurrence on or after the reference date.
pub type UntilSpec = DateSpec;

impl DateSpec {
    /// Does `date` fall on this spec? Named specs ignore the year.
    pub fn covers(&self, date: Date) -> bool {
        match *self {
            Self::Named { month, day } => {
                date.month() == month.number() as i8 && date.day() == day as i8
            }
            Self::Iso(d) => d == date,
        }
    }
}

/// Target of a yearly expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum YearTarget {
    /// `dec 25`
    Date { month: MonthName, day: u8 },
    /// `the first monday of mar`
    OrdinalWeekday {
        ordinal: OrdinalPosition,
        weekday: Weekday,
        month: MonthName,
    },
    /// `the 15th of mar`
    DayOfMonth { day: u8, month: MonthName },
    /// `the last weekday of dec`
    LastWeekday { month: MonthName },
}

impl YearTarget {
    pub fn month(&self) -> MonthName {
        match *self {
            Self::Date { month, .. }
            | Self::OrdinalWeekday { month, .. }
            | Self::DayOfMonth { month, .. }
            | Self::LastWeekday { month } => month,
        }
    }
}

/// Wall-clock time, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn total_minutes(self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// Inverse of [`TimeOfDay::total_minutes`] for values inside one day.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        let hour = u8::try_from(minutes / 60).ok()?;
        Self::new(hour, (minutes % 60) as u8)
    }

    /// `None` only for a hand-built value outside 00:00..=23:59.
    pub fn to_jiff(self) -> Option<jiff::civil::Time> {
        jiff::civil::Time::new(self.hour as i8, self.minute as i8, 0, 0).ok()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.split_once(':').ok_or_else(|| format!("expected HH:MM, got '{s}'"))?;
        let hour = h.parse().map_err(|_| format!("invalid hour '{h}'"))?;
        let minute = m.parse().map_err(|_| format!("invalid minute '{m}'"))?;
        Self::new(hour, minute).ok_or_else(|| format!("time out of range '{s}'"))
    }
}

#[cfg(feature = "serde")]
impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which days a day-repeat or interval-repeat fires on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DayFilter {
    Every,
    Weekday,
    Weekend,
    Days(Vec<Weekday>),
}

impl DayFilter {
    pub fn accepts(&self, day: Weekday) -> bool {
        match self {
            Self::Every => true,
            Self::Weekday => !day.is_weekend(),
            Self::Weekend => day.is_weekend(),
            Self::Days(days) => days.contains(&day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Three-letter form used by the canonical rendering.
    pub fn abbr(self) -> &'static str {
        &self.name()[..3]
    }

    /// ISO 8601 number, Monday = 1 .. Sunday = 7.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Cron day-of-week number, Sunday = 0.
    pub fn cron_number(self) -> u8 {
        self.number() % 7
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Accepts 0..=7; both 0 and 7 are Sunday.
    pub fn from_cron_number(n: u8) -> Option<Self> {
        match n {
            0 | 7 => Some(Self::Sunday),
            _ => Self::from_number(n),
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }

    pub fn to_jiff(self) -> jiff::civil::Weekday {
        match self {
            Self::Monday => jiff::civil::Weekday::Monday,
            Self::Tuesday => jiff::civil::Weekday::Tuesday,
            Self::Wednesday => jiff::civil::Weekday::Wednesday,
            Self::Thursday => jiff::civil::Weekday::Thursday,
            Self::Friday => jiff::civil::Weekday::Friday,
            Self::Saturday => jiff::civil::Weekday::Saturday,
            Self::Sunday => jiff::civil::Weekday::Sunday,
        }
    }

    pub fn from_jiff(wd: jiff::civil::Weekday) -> Self {
        match wd {
            jiff::civil::Weekday::Monday => Self::Monday,
            jiff::civil::Weekday::Tuesday => Self::Tuesday,
            jiff::civil::Weekday::Wednesday => Self::Wednesday,
            jiff::civil::Weekday::Thursday => Self::Thursday,
            jiff::civil::Weekday::Friday => Self::Friday,
            jiff::civil::Weekday::Saturday => Self::Saturday,
            jiff::civil::Weekday::Sunday => Self::Sunday,
        }
    }

    /// Full or three-letter name, any case.
    pub fn from_name(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == lower || d.abbr() == lower)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

/// Day-of-month entry in a monthly target: `15th` or `1st to 5th`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DayOfMonthSpec {
    Single(u8),
    Range(u8, u8),
}

impl DayOfMonthSpec {
    pub fn days(self) -> std::ops::RangeInclusive<u8> {
        match self {
            Self::Single(d) => d..=d,
            Self::Range(start, end) => start..=end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NearestDirection {
    Next,
    Previous,
}

/// Which day(s) of the month a monthly expression fires on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MonthTarget {
    Days { specs: Vec<DayOfMonthSpec> },
    LastDay,
    LastWeekday,
    /// `nearest weekday to 15th`. Without a direction this is cron's `15W`
    /// and stays inside the month; with one it may spill into a neighbour.
    NearestWeekday {
        day: u8,
        direction: Option<NearestDirection>,
    },
    /// `first monday`, `last friday`
    OrdinalWeekday {
        ordinal: OrdinalPosition,
        weekday: Weekday,
    },
}

impl MonthTarget {
    /// Sorted, de-duplicated day numbers of a `Days` target; empty otherwise.
    pub fn expand_days(&self) -> Vec<u8> {
        let Self::Days { specs } = self else {
            return Vec::new();
        };
        let mut days: Vec<u8> = specs.iter().flat_map(|s| s.days()).collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrdinalPosition {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Last,
}

impl OrdinalPosition {
    pub fn name(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Fifth => "fifth",
            Self::Last => "last",
        }
    }

    /// 1..=5, or `None` for `Last`.
    pub fn nth(self) -> Option<u8> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Fifth => Some(5),
            Self::Last => None,
        }
    }

    pub fn from_nth(n: u8) -> Option<Self> {
        [Self::First, Self::Second, Self::Third, Self::Fourth, Self::Fifth]
            .get(usize::from(n).checked_sub(1)?)
            .copied()
    }
}

impl fmt::Display for OrdinalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MonthName {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl MonthName {
    pub const ALL: [MonthName; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    const FULL: [&'static str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    pub fn abbr(self) -> &'static str {
        &self.full_name()[..3]
    }

    pub fn full_name(self) -> &'static str {
        Self::FULL[self as usize]
    }

    /// 1 = January.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Longest possible day in this month; February allows the 29th
    /// because no year is known.
    pub fn max_days(self) -> u8 {
        match self {
            Self::Feb => 29,
            Self::Apr | Self::Jun | Self::Sep | Self::Nov => 30,
            _ => 31,
        }
    }

    /// Full or three-letter name, any case.
    pub fn from_name(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.full_name() == lower || m.abbr() == lower)
    }
}

impl fmt::Display for MonthName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IntervalUnit {
    Minutes,
    Hours,
}

impl IntervalUnit {
    pub fn minutes(self) -> u32 {
        match self {
            Self::Minutes => 1,
            Self::Hours => 60,
        }
    }

    /// Length of `interval` units in minutes.
    pub fn step_minutes(self, interval: u32) -> u64 {
        u64::from(interval) * u64::from(self.minutes())
    }
}
