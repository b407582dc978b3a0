//! Syntax shared by the five cron fields: numbers, names, ranges, steps and
//! comma lists.

use crate::ast::{MonthName, Weekday};
use crate::error::ScheduleError;

/// One comma-separated element of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Part {
    Value(u8),
    Range(u8, u8),
    /// `*`, `*/N`, `a/N` and `a-b/N`. A bare `*` is a step of 1 over the
    /// whole field.
    Step { start: u8, end: u8, step: u8 },
}

impl Part {
    pub(super) fn values(self) -> Vec<u8> {
        match self {
            Self::Value(v) => vec![v],
            Self::Range(start, end) => (start..=end).collect(),
            Self::Step { start, end, step } => {
                (start..=end).step_by(usize::from(step)).collect()
            }
        }
    }
}

/// Bounds and vocabulary of a field.
#[derive(Debug, Clone, Copy)]
pub(super) struct Field {
    pub(super) name: &'static str,
    pub(super) min: u8,
    pub(super) max: u8,
    names: fn(&str) -> Option<u8>,
}

fn no_names(_: &str) -> Option<u8> {
    None
}

fn month_number(name: &str) -> Option<u8> {
    MonthName::from_name(name).map(MonthName::number)
}

fn cron_weekday(name: &str) -> Option<u8> {
    Weekday::from_name(name).map(Weekday::cron_number)
}

pub(super) const MINUTE: Field = Field {
    name: "minute",
    min: 0,
    max: 59,
    names: no_names,
};

pub(super) const HOUR: Field = Field {
    name: "hour",
    min: 0,
    max: 23,
    names: no_names,
};

pub(super) const DAY_OF_MONTH: Field = Field {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: no_names,
};

pub(super) const MONTH: Field = Field {
    name: "month",
    min: 1,
    max: 12,
    names: month_number,
};

/// 0 and 7 are both Sunday.
pub(super) const DAY_OF_WEEK: Field = Field {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: cron_weekday,
};

impl Field {
    /// A single number or name, range checked.
    pub(super) fn value(&self, text: &str) -> Result<u8, ScheduleError> {
        let n = match text.parse::<u32>() {
            Ok(n) => n,
            Err(_) => (self.names)(text)
                .map(u32::from)
                .ok_or_else(|| ScheduleError::cron(format!("invalid {} value: {text}", self.name)))?,
        };
        if n < u32::from(self.min) || n > u32::from(self.max) {
            return Err(ScheduleError::cron(format!(
                "{} must be {}-{}, got {n}",
                self.name, self.min, self.max
            )));
        }
        Ok(n as u8)
    }

    pub(super) fn part(&self, text: &str) -> Result<Part, ScheduleError> {
        let (range, step) = match text.split_once('/') {
            Some((range, step)) => (range, Some(self.step(step)?)),
            None => (text, None),
        };

        if range == "*" {
            return Ok(Part::Step {
                start: self.min,
                end: self.max,
                step: step.unwrap_or(1),
            });
        }

        let (start, end) = match range.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (self.value(start)?, self.value(end)?);
                if start > end {
                    return Err(ScheduleError::cron(format!(
                        "invalid {} range: {start}-{end}",
                        self.name
                    )));
                }
                (start, Some(end))
            }
            None => (self.value(range)?, None),
        };

        Ok(match (step, end) {
            (Some(step), end) => Part::Step {
                start,
                end: end.unwrap_or(self.max),
                step,
            },
            (None, Some(end)) => Part::Range(start, end),
            (None, None) => Part::Value(start),
        })
    }

    pub(super) fn list(&self, text: &str) -> Result<Vec<Part>, ScheduleError> {
        text.split(',').map(|part| self.part(part)).collect()
    }

    /// Every value the field selects, sorted and de-duplicated.
    pub(super) fn values(&self, text: &str) -> Result<Vec<u8>, ScheduleError> {
        Ok(expand(&self.list(text)?))
    }

    /// A step is at most the field's largest value.
    fn step(&self, text: &str) -> Result<u8, ScheduleError> {
        let step: u32 = text
            .parse()
            .map_err(|_| ScheduleError::cron(format!("invalid {} step: {text}", self.name)))?;
        match step {
            0 => Err(ScheduleError::cron("step cannot be 0")),
            step if step > u32::from(self.max) => Err(ScheduleError::cron(format!(
                "{} step must be 1-{}, got {step}",
                self.name, self.max
            ))),
            step => Ok(step as u8),
        }
    }
}

pub(super) fn expand(parts: &[Part]) -> Vec<u8> {
    let mut values: Vec<u8> = parts.iter().flat_map(|part| part.values()).collect();
    values.sort_unstable();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts() {
        assert_eq!(MINUTE.part("5").unwrap(), Part::Value(5));
        assert_eq!(HOUR.part("9-17").unwrap(), Part::Range(9, 17));
        assert_eq!(
            MINUTE.part("*/15").unwrap(),
            Part::Step {
                start: 0,
                end: 59,
                step: 15
            }
        );
        assert_eq!(
            HOUR.part("*").unwrap(),
            Part::Step {
                start: 0,
                end: 23,
                step: 1
            }
        );
        assert_eq!(
            MINUTE.part("10/20").unwrap(),
            Part::Step {
                start: 10,
                end: 59,
                step: 20
            }
        );
    }

    #[test]
    fn names_and_lists() {
        assert_eq!(MONTH.values("jan-MAR,dec").unwrap(), vec![1, 2, 3, 12]);
        assert_eq!(MONTH.values("*/4").unwrap(), vec![1, 5, 9]);
        assert_eq!(DAY_OF_WEEK.values("MON,wed,friday").unwrap(), vec![1, 3, 5]);
        assert_eq!(DAY_OF_WEEK.values("5-7").unwrap(), vec![5, 6, 7]);
        assert_eq!(DAY_OF_MONTH.values("1,15,1").unwrap(), vec![1, 15]);
    }

    #[test]
    fn range_errors() {
        let message = |r: Result<Vec<Part>, ScheduleError>| r.unwrap_err().to_string();
        assert_eq!(message(MINUTE.list("60")), "minute must be 0-59, got 60");
        assert_eq!(message(HOUR.list("24")), "hour must be 0-23, got 24");
        assert_eq!(message(DAY_OF_MONTH.list("0")), "day-of-month must be 1-31, got 0");
        assert_eq!(message(MONTH.list("13")), "month must be 1-12, got 13");
        assert_eq!(message(DAY_OF_WEEK.list("8")), "day-of-week must be 0-7, got 8");
        assert_eq!(message(MONTH.list("foo")), "invalid month value: foo");
        assert_eq!(message(HOUR.list("17-9")), "invalid hour range: 17-9");
        assert_eq!(message(MINUTE.list("*/0")), "step cannot be 0");
        assert_eq!(message(MINUTE.list("*/x")), "invalid minute step: x");
        assert_eq!(message(HOUR.list("*/300")), "hour step must be 1-23, got 300");
        assert_eq!(message(MINUTE.list("*/60")), "minute step must be 1-59, got 60");
        assert_eq!(message(MINUTE.list("1,,2")), "invalid minute value: ");
    }
}
