//! hron: human-readable cron.
//!
//! Schedule expressions such as `every weekday at 09:00 in America/New_York`
//! that cover everything 5-field cron can say and more: week and month
//! intervals, ordinal weekdays, nearest weekdays, yearly dates, exceptions,
//! end dates and month restrictions.
//!
//! # Examples
//!
//! ```
//! use hron::Schedule;
//!
//! let schedule: Schedule = "every weekday at 9:00 in America/New_York".parse().unwrap();
//! assert_eq!(schedule.to_string(), "every weekday at 09:00 in America/New_York");
//!
//! let now: jiff::Zoned = "2026-02-06T12:00:00-05:00[America/New_York]".parse().unwrap();
//! let next = schedule.next_from(&now).unwrap();
//! assert_eq!(next.to_string(), "2026-02-09T09:00:00-05:00[America/New_York]");
//! ```
//!
//! Times that fall into a spring-forward gap move forward by the gap length,
//! and times repeated by a fall-back transition fire once, at the earlier
//! offset.

pub mod ast;
pub mod cron;
mod display;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{ScheduleData, ScheduleExpr};
pub use error::{ScheduleError, Span};
pub use eval::{Between, Occurrences};

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Zoned;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// True when `input` parses.
pub fn validate(input: &str) -> bool {
    parser::parse(input).is_ok()
}

/// A parsed expression together with its resolved time zone.
///
/// Expressions without an `in` clause evaluate in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    data: ScheduleData,
    tz: TimeZone,
}

impl Schedule {
    pub fn parse(input: &str) -> Result<Self, ScheduleError> {
        Self::new(parser::parse(input)?)
    }

    /// Resolve the zone named by `data`.
    pub fn new(data: ScheduleData) -> Result<Self, ScheduleError> {
        let tz = match &data.timezone {
            Some(name) => TimeZone::get(name)
                .map_err(|_| ScheduleError::eval(format!("unknown timezone '{name}'")))?,
            None => TimeZone::UTC,
        };
        Ok(Self { data, tz })
    }

    /// Convert a 5-field cron expression or `@` shortcut.
    pub fn from_cron(cron: &str) -> Result<Self, ScheduleError> {
        Self::new(cron::from_cron(cron)?)
    }

    /// First occurrence strictly after `now`.
    pub fn next_from(&self, now: &Zoned) -> Option<Zoned> {
        eval::next_from(&self.data, &self.tz, now)
    }

    /// Up to `n` occurrences after `now`; fewer if the schedule ends.
    pub fn next_n_from(&self, now: &Zoned, n: usize) -> Vec<Zoned> {
        self.occurrences(now).take(n).collect()
    }

    /// Last occurrence strictly before `now`.
    pub fn previous_from(&self, now: &Zoned) -> Option<Zoned> {
        eval::previous_from(&self.data, &self.tz, now)
    }

    /// Does the schedule fire at exactly `instant`?
    pub fn matches(&self, instant: &Zoned) -> bool {
        eval::matches(&self.data, &self.tz, instant)
    }

    /// Occurrences after `from`, computed lazily.
    pub fn occurrences(&self, from: &Zoned) -> Occurrences<'_> {
        Occurrences::new(&self.data, &self.tz, from.clone())
    }

    /// Occurrences after `from` up to and including `to`.
    pub fn between(&self, from: &Zoned, to: &Zoned) -> Between<'_> {
        Between::new(&self.data, &self.tz, from.clone(), to.clone())
    }

    pub fn to_cron(&self) -> Result<String, ScheduleError> {
        cron::to_cron(&self.data)
    }

    /// Align intervals to `date` instead of the epoch.
    pub fn with_anchor(mut self, date: Date) -> Self {
        self.data.anchor = Some(date);
        self
    }

    /// The zone name from the `in` clause, if any.
    pub fn timezone(&self) -> Option<&str> {
        self.data.timezone.as_deref()
    }

    pub fn data(&self) -> &ScheduleData {
        &self.data
    }
}

impl From<Schedule> for ScheduleData {
    fn from(schedule: Schedule) -> Self {
        schedule.data
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Schedule::parse(&s).map_err(serde::de::Error::custom)
    }
}
