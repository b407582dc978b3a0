//! Conversion between hron expressions and 5-field cron
//! (`minute hour day-of-month month day-of-week`).

mod field;

use tracing::debug;

use self::field::{Part, DAY_OF_MONTH, DAY_OF_WEEK, HOUR, MINUTE, MONTH};
use crate::ast::*;
use crate::error::ScheduleError;

fn inexpressible(reason: &str) -> ScheduleError {
    ScheduleError::cron(format!("not expressible as cron ({reason})"))
}

/// Render `data` as a 5-field cron expression.
///
/// Only a subset of hron maps onto cron: single-interval day and month
/// repeats with one time, and full-day interval windows. Time zones are
/// dropped since cron has no notion of them.
pub fn to_cron(data: &ScheduleData) -> Result<String, ScheduleError> {
    if !data.except.is_empty() {
        return Err(inexpressible("except clauses not supported"));
    }
    if data.until.is_some() {
        return Err(inexpressible("until clauses not supported"));
    }
    if !data.during.is_empty() {
        return Err(inexpressible("during clauses not supported"));
    }

    match &data.expr {
        ScheduleExpr::DayRepeat {
            interval,
            days,
            times,
        } => {
            if *interval > 1 {
                return Err(inexpressible("multi-day intervals not supported"));
            }
            let time = single_time(times)?;
            Ok(format!("{} {} * * {}", time.minute, time.hour, dow_field(days)))
        }

        ScheduleExpr::IntervalRepeat {
            interval,
            unit,
            from,
            to,
            day_filter,
        } => {
            if *from != TimeOfDay::MIDNIGHT || (to.hour, to.minute) != (23, 59) {
                return Err(inexpressible("partial-day interval windows not supported"));
            }
            if day_filter.is_some() {
                return Err(inexpressible("interval with day filter not supported"));
            }
            let step = |n: u32| match n {
                1 => "*".to_string(),
                n => format!("*/{n}"),
            };
            match unit {
                IntervalUnit::Minutes if *interval >= 60 => Err(inexpressible(&format!(
                    "minute step {interval} exceeds an hour"
                ))),
                IntervalUnit::Hours if *interval >= 24 => Err(inexpressible(&format!(
                    "hour step {interval} exceeds a day"
                ))),
                IntervalUnit::Minutes if 60u32.checked_rem(*interval) != Some(0) => {
                    Err(inexpressible(&format!(
                        "*/{interval} breaks at hour boundaries"
                    )))
                }
                IntervalUnit::Minutes => Ok(format!("{} * * * *", step(*interval))),
                IntervalUnit::Hours => Ok(format!("0 {} * * *", step(*interval))),
            }
        }

        ScheduleExpr::MonthRepeat {
            interval,
            target,
            times,
        } => {
            if *interval > 1 {
                return Err(inexpressible("multi-month intervals not supported"));
            }
            let time = single_time(times)?;
            let dom = match target {
                MonthTarget::Days { .. } => target
                    .expand_days()
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
                MonthTarget::NearestWeekday {
                    day,
                    direction: None,
                } => format!("{day}W"),
                MonthTarget::NearestWeekday { .. } => {
                    return Err(inexpressible("directional nearest weekday not supported"))
                }
                MonthTarget::LastDay => {
                    return Err(inexpressible("last day of month not supported"))
                }
                MonthTarget::LastWeekday => {
                    return Err(inexpressible("last weekday of month not supported"))
                }
                MonthTarget::OrdinalWeekday { .. } => {
                    return Err(inexpressible("ordinal weekday of month not supported"))
                }
            };
            Ok(format!("{} {} {dom} * *", time.minute, time.hour))
        }

        ScheduleExpr::WeekRepeat { .. } => Err(inexpressible("week repeats not supported")),
        ScheduleExpr::OrdinalRepeat { .. } => {
            Err(inexpressible("ordinal weekday of month not supported"))
        }
        ScheduleExpr::SingleDate { .. } => {
            Err(inexpressible("single dates are not repeating"))
        }
        ScheduleExpr::YearRepeat { .. } => Err(inexpressible(
            "yearly schedules not supported in 5-field cron",
        )),
    }
}

fn single_time(times: &[TimeOfDay]) -> Result<TimeOfDay, ScheduleError> {
    match times {
        [time] => Ok(*time),
        _ => Err(inexpressible("multiple times not supported")),
    }
}

fn dow_field(days: &DayFilter) -> String {
    match days {
        DayFilter::Every => "*".to_string(),
        DayFilter::Weekday => "1-5".to_string(),
        DayFilter::Weekend => "0,6".to_string(),
        DayFilter::Days(days) => {
            let mut numbers: Vec<u8> = days.iter().map(|d| d.cron_number()).collect();
            numbers.sort_unstable();
            numbers.dedup();
            numbers
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// Parse a 5-field cron expression or one of the `@` shortcuts.
///
/// `?` is read as `*`, day-of-week 7 is Sunday, and a restricted month
/// field becomes a `during` clause. Steps in the minute or hour field turn
/// into an interval window.
pub fn from_cron(cron: &str) -> Result<ScheduleData, ScheduleError> {
    let cron = cron.trim();
    if cron.starts_with('@') {
        return shortcut(cron);
    }

    let fields: Vec<&str> = cron.split_whitespace().collect();
    let [minute, hour, dom, month, dow] = fields[..] else {
        return Err(ScheduleError::cron(format!(
            "expected 5 cron fields, got {}",
            fields.len()
        )));
    };
    let dom = if dom == "?" { "*" } else { dom };
    let dow = if dow == "?" { "*" } else { dow };

    let minute = MINUTE.list(minute)?;
    let hour = HOUR.list(hour)?;

    let expr = if let Some(expr) = weekday_of_month(&minute, &hour, dom, dow)? {
        expr
    } else if let Some(expr) = special_dom(&minute, &hour, dom, dow)? {
        expr
    } else if let Some(expr) = interval(&minute, &hour, dom, dow)? {
        expr
    } else {
        let times = fixed_times(&minute, &hour, "a cron expression")?;
        match (dom, dow) {
            ("*", dow) => ScheduleExpr::DayRepeat {
                interval: 1,
                days: day_filter(dow)?,
                times,
            },
            (dom, "*") => ScheduleExpr::MonthRepeat {
                interval: 1,
                target: dom_target(dom)?,
                times,
            },
            _ => {
                return Err(ScheduleError::cron(
                    "cannot combine day-of-month and day-of-week fields",
                ))
            }
        }
    };

    let mut data = ScheduleData::new(expr);
    data.during = during(month)?;
    debug!(cron, schedule = %data, "converted cron expression");
    Ok(data)
}

fn shortcut(cron: &str) -> Result<ScheduleData, ScheduleError> {
    let midnight = vec![TimeOfDay::MIDNIGHT];
    let expr = match cron.to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => ScheduleExpr::YearRepeat {
            interval: 1,
            target: YearTarget::Date {
                month: MonthName::Jan,
                day: 1,
            },
            times: midnight,
        },
        "@monthly" => ScheduleExpr::MonthRepeat {
            interval: 1,
            target: MonthTarget::Days {
                specs: vec![DayOfMonthSpec::Single(1)],
            },
            times: midnight,
        },
        "@weekly" => ScheduleExpr::DayRepeat {
            interval: 1,
            days: DayFilter::Days(vec![Weekday::Sunday]),
            times: midnight,
        },
        "@daily" | "@midnight" => ScheduleExpr::DayRepeat {
            interval: 1,
            days: DayFilter::Every,
            times: midnight,
        },
        "@hourly" => ScheduleExpr::IntervalRepeat {
            interval: 1,
            unit: IntervalUnit::Hours,
            from: TimeOfDay::MIDNIGHT,
            to: TimeOfDay {
                hour: 23,
                minute: 59,
            },
            day_filter: None,
        },
        _ => return Err(ScheduleError::cron(format!("unknown @ shortcut: {cron}"))),
    };
    Ok(ScheduleData::new(expr))
}

fn during(field: &str) -> Result<Vec<MonthName>, ScheduleError> {
    if field == "*" {
        return Ok(Vec::new());
    }
    Ok(MONTH
        .values(field)?
        .into_iter()
        .filter_map(MonthName::from_number)
        .collect())
}

/// Every combination of the minute and hour values, sorted.
fn fixed_times(
    minute: &[Part],
    hour: &[Part],
    what: &str,
) -> Result<Vec<TimeOfDay>, ScheduleError> {
    if minute
        .iter()
        .chain(hour)
        .any(|part| matches!(part, Part::Step { .. }))
    {
        return Err(ScheduleError::cron(format!(
            "{what} with steps or wildcards in the minute or hour field is not supported"
        )));
    }
    let minutes = field::expand(minute);
    let mut times: Vec<TimeOfDay> = field::expand(hour)
        .into_iter()
        .flat_map(|hour| minutes.iter().map(move |&minute| TimeOfDay { hour, minute }))
        .collect();
    times.sort_unstable();
    Ok(times)
}

/// `N#M` and `NL` in the day-of-week field.
fn weekday_of_month(
    minute: &[Part],
    hour: &[Part],
    dom: &str,
    dow: &str,
) -> Result<Option<ScheduleExpr>, ScheduleError> {
    let (day, ordinal) = if let Some((day, nth)) = dow.split_once('#') {
        let nth: u8 = nth
            .parse()
            .map_err(|_| ScheduleError::cron(format!("invalid nth value: {nth}")))?;
        let ordinal = OrdinalPosition::from_nth(nth)
            .ok_or_else(|| ScheduleError::cron(format!("nth must be 1-5, got {nth}")))?;
        (day, ordinal)
    } else if let Some(day) = dow.strip_suffix('L').filter(|day| !day.is_empty()) {
        (day, OrdinalPosition::Last)
    } else {
        return Ok(None);
    };

    if dom != "*" {
        return Err(ScheduleError::cron(
            "day-of-month must be * with an nth or last weekday",
        ));
    }
    let day = DAY_OF_WEEK.value(day)?;
    let day = Weekday::from_cron_number(day)
        .ok_or_else(|| ScheduleError::cron(format!("invalid day-of-week: {day}")))?;

    Ok(Some(ScheduleExpr::OrdinalRepeat {
        interval: 1,
        ordinal,
        day,
        times: fixed_times(minute, hour, "an nth weekday")?,
    }))
}

/// `L`, `LW` and `NW` in the day-of-month field.
fn special_dom(
    minute: &[Part],
    hour: &[Part],
    dom: &str,
    dow: &str,
) -> Result<Option<ScheduleExpr>, ScheduleError> {
    let target = match dom {
        "L" => MonthTarget::LastDay,
        "LW" => MonthTarget::LastWeekday,
        _ => match dom.strip_suffix('W') {
            Some(day) => MonthTarget::NearestWeekday {
                day: DAY_OF_MONTH.value(day)?,
                direction: None,
            },
            None => return Ok(None),
        },
    };
    if dow != "*" {
        return Err(ScheduleError::cron(
            "day-of-week must be * with L, LW or W",
        ));
    }
    Ok(Some(ScheduleExpr::MonthRepeat {
        interval: 1,
        target,
        times: fixed_times(minute, hour, "a last or nearest weekday")?,
    }))
}

/// A step in the minute field, or a fixed minute with a step in the hour
/// field, becomes an interval window.
fn interval(
    minute: &[Part],
    hour: &[Part],
    dom: &str,
    dow: &str,
) -> Result<Option<ScheduleExpr>, ScheduleError> {
    let end_of_day = TimeOfDay {
        hour: 23,
        minute: 59,
    };
    let (step, unit, from, to) = match (minute, hour) {
        ([Part::Step { start, end, step }], _) => {
            let (from_hour, to_hour) = match hour {
                [Part::Value(h)] => (*h, *h),
                [Part::Range(a, b)] | [Part::Step { start: a, end: b, step: 1 }] => (*a, *b),
                _ => {
                    return Err(ScheduleError::cron(
                        "minute steps need a single hour, hour range or *",
                    ))
                }
            };
            let full_day = (*start, *end, from_hour, to_hour) == (0, 59, 0, 23);
            if !full_day && *end != 59 && from_hour != to_hour {
                return Err(ScheduleError::cron(format!(
                    "minute range {start}-{end} across several hours is not supported"
                )));
            }
            let from = TimeOfDay {
                hour: from_hour,
                minute: *start,
            };
            let to = if full_day {
                end_of_day
            } else {
                TimeOfDay {
                    hour: to_hour,
                    minute: start + (end - start) / step * step,
                }
            };
            (*step, IntervalUnit::Minutes, from, to)
        }
        ([Part::Value(m)], [Part::Step { start, end, step }]) => {
            let from = TimeOfDay {
                hour: *start,
                minute: *m,
            };
            let to = if (*m, *start, *end) == (0, 0, 23) {
                end_of_day
            } else {
                TimeOfDay {
                    hour: start + (end - start) / step * step,
                    minute: *m,
                }
            };
            (*step, IntervalUnit::Hours, from, to)
        }
        _ => return Ok(None),
    };

    if dom != "*" {
        return Err(ScheduleError::cron(
            "minute or hour steps with a day-of-month field are not supported",
        ));
    }
    let day_filter = match day_filter(dow)? {
        DayFilter::Every => None,
        filter => Some(filter),
    };
    Ok(Some(ScheduleExpr::IntervalRepeat {
        interval: u32::from(step),
        unit,
        from,
        to,
        day_filter,
    }))
}

fn dom_target(field: &str) -> Result<MonthTarget, ScheduleError> {
    let mut specs = Vec::new();
    for part in DAY_OF_MONTH.list(field)? {
        match part {
            Part::Value(day) => specs.push(DayOfMonthSpec::Single(day)),
            Part::Range(start, end) => specs.push(DayOfMonthSpec::Range(start, end)),
            Part::Step { .. } => specs.extend(part.values().into_iter().map(DayOfMonthSpec::Single)),
        }
    }
    Ok(MonthTarget::Days { specs })
}

fn day_filter(field: &str) -> Result<DayFilter, ScheduleError> {
    let mut days: Vec<Weekday> = DAY_OF_WEEK
        .values(field)?
        .into_iter()
        .filter_map(Weekday::from_cron_number)
        .collect();
    days.sort_unstable();
    days.dedup();

    Ok(if days.len() == Weekday::ALL.len() {
        DayFilter::Every
    } else if days[..] == Weekday::ALL[..5] {
        DayFilter::Weekday
    } else if days[..] == Weekday::ALL[5..] {
        DayFilter::Weekend
    } else {
        DayFilter::Days(days)
    })
}

/// Describe a cron expression as hron text.
///
/// A minute step that does not divide 60 adds a note, since cron restarts
/// the step at every hour.
pub fn explain_cron(cron: &str) -> Result<String, ScheduleError> {
    let mut explanation = from_cron(cron)?.to_string();

    let step = cron
        .split_whitespace()
        .next()
        .and_then(|minute| minute.strip_prefix("*/"))
        .and_then(|step| step.parse::<u32>().ok());
    if let Some(step) = step.filter(|step| 60 % step != 0) {
        let fires: Vec<String> = (0..60).step_by(step as usize).map(|m| format!(":{m:02}")).collect();
        explanation.push_str(&format!(
            "\nnote: cron */{step} actually fires at {} each hour, not every {step} minutes",
            fires.join(" and ")
        ));
    }
    Ok(explanation)
}
