use jiff::civil::Date;

use crate::ast::*;
use crate::error::{ScheduleError, Span};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse an expression into its AST. Fails with `Lex` or `Parse` errors only;
/// the time zone name is not resolved here.
pub fn parse(input: &str) -> Result<ScheduleData, ScheduleError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };
    parser.schedule()
}

/// Trailing clauses in the only order they may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Clause {
    Except,
    Until,
    Starting,
    During,
    In,
}

impl Clause {
    fn of(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Except => Some(Self::Except),
            TokenKind::Until => Some(Self::Until),
            TokenKind::Starting => Some(Self::Starting),
            TokenKind::During => Some(Self::During),
            TokenKind::In => Some(Self::In),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Except => "except",
            Self::Until => "until",
            Self::Starting => "starting",
            Self::During => "during",
            Self::In => "in",
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    // --- cursor ---

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        let hit = self.at(kind);
        if hit {
            self.pos += 1;
        }
        hit
    }

    /// Span of the next token, or an empty span just past the input.
    fn here(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(tok) => tok.span,
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                Span::new(end, end)
            }
        }
    }

    fn error_at(&self, message: impl Into<String>, span: Span) -> ScheduleError {
        ScheduleError::parse(message, span, self.input)
    }

    fn error(&self, message: impl Into<String>) -> ScheduleError {
        self.error_at(message, self.here())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, ScheduleError> {
        let span = self.here();
        if self.eat(&kind) {
            return Ok(span);
        }
        let wanted = kind.describe();
        Err(match self.peek() {
            Some(found) => self.error(format!("expected {wanted}, found {}", found.describe())),
            None => self.error(format!("expected {wanted}")),
        })
    }

    // --- top level ---

    fn schedule(&mut self) -> Result<ScheduleData, ScheduleError> {
        if self.tokens.is_empty() {
            return Err(self.error_at("empty expression", Span::new(0, 0)));
        }
        let expr = match self.peek() {
            Some(TokenKind::Every) => {
                self.pos += 1;
                self.every()?
            }
            Some(TokenKind::On) => {
                self.pos += 1;
                self.single_date()?
            }
            Some(TokenKind::Ordinal(_) | TokenKind::Last) => self.ordinal_repeat()?,
            _ => {
                return Err(self.error(
                    "expected 'every', 'on', or an ordinal (first, second, ..., last)",
                ))
            }
        };
        let mut data = ScheduleData::new(expr);
        self.clauses(&mut data)?;
        Ok(data)
    }

    fn clauses(&mut self, data: &mut ScheduleData) -> Result<(), ScheduleError> {
        let mut latest: Option<Clause> = None;
        while let Some(kind) = self.peek() {
            let span = self.here();
            let Some(clause) = Clause::of(kind) else {
                return Err(self.error(format!(
                    "unexpected tokens after expression: {}",
                    kind.describe()
                )));
            };
            match latest {
                Some(prev) if prev == clause => {
                    return Err(self.error(format!("duplicate {} clause", clause.name())));
                }
                Some(prev) if prev > clause => {
                    return Err(self.error(format!(
                        "wrong clause order: {} before {}",
                        prev.name(),
                        clause.name()
                    )));
                }
                _ => {}
            }
            latest = Some(clause);
            self.pos += 1;

            match clause {
                Clause::Except => data.except = self.comma_list(Self::date_spec)?,
                Clause::Until => data.until = Some(self.date_spec()?),
                Clause::Starting => data.anchor = Some(self.iso_date("'starting'")?),
                Clause::During => data.during = self.comma_list(Self::month_name)?,
                Clause::In => match self.bump() {
                    Some(Token {
                        kind: TokenKind::Timezone(tz),
                        ..
                    }) => data.timezone = Some(tz),
                    _ => return Err(self.error_at("expected timezone after 'in'", span)),
                },
            }
        }
        Ok(())
    }

    // --- expressions ---

    fn every(&mut self) -> Result<ScheduleExpr, ScheduleError> {
        match self.peek() {
            Some(TokenKind::Day) => {
                self.pos += 1;
                self.day_repeat(1, DayFilter::Every)
            }
            Some(TokenKind::Weekday | TokenKind::Weekend | TokenKind::DayName(_)) => {
                let days = self.day_filter()?;
                self.day_repeat(1, days)
            }
            Some(TokenKind::Year) => {
                self.pos += 1;
                self.year_repeat(1)
            }
            Some(TokenKind::Month) => {
                self.pos += 1;
                self.month_repeat(1)
            }
            Some(TokenKind::Weeks) => {
                self.pos += 1;
                self.week_repeat(1)
            }
            Some(TokenKind::Number(_)) => self.numbered_repeat(),
            _ => Err(self.error(
                "expected day, weekday, weekend, year, day name, month, or number after 'every'",
            )),
        }
    }

    /// `every N <unit> ...`
    fn numbered_repeat(&mut self) -> Result<ScheduleExpr, ScheduleError> {
        let interval = self.interval()?;
        match self.peek() {
            Some(TokenKind::IntervalUnit(unit)) => {
                let unit = *unit;
                self.pos += 1;
                self.interval_repeat(interval, unit)
            }
            Some(TokenKind::Weeks) => {
                self.pos += 1;
                self.week_repeat(interval)
            }
            Some(TokenKind::Day) => {
                self.pos += 1;
                self.day_repeat(interval, DayFilter::Every)
            }
            Some(TokenKind::Month) => {
                self.pos += 1;
                self.month_repeat(interval)
            }
            Some(TokenKind::Year) => {
                self.pos += 1;
                self.year_repeat(interval)
            }
            _ => Err(self.error(
                "expected 'weeks', 'min', 'minutes', 'hour', 'hours', 'day(s)', 'month(s)', or 'year(s)' after number",
            )),
        }
    }

    fn interval(&mut self) -> Result<u32, ScheduleError> {
        let span = self.here();
        match self.bump().map(|t| t.kind) {
            Some(TokenKind::Number(0)) => Err(self.error_at("interval must be at least 1", span)),
            Some(TokenKind::Number(n)) => Ok(n),
            _ => Err(self.error_at("expected number", span)),
        }
    }

    fn day_repeat(&mut self, interval: u32, days: DayFilter) -> Result<ScheduleExpr, ScheduleError> {
        let times = self.at_times()?;
        Ok(ScheduleExpr::DayRepeat {
            interval,
            days,
            times,
        })
    }

    fn week_repeat(&mut self, interval: u32) -> Result<ScheduleExpr, ScheduleError> {
        self.expect(TokenKind::On)?;
        let days = self.comma_list(Self::day_name)?;
        let times = self.at_times()?;
        Ok(ScheduleExpr::WeekRepeat {
            interval,
            days,
            times,
        })
    }

    fn interval_repeat(
        &mut self,
        interval: u32,
        unit: IntervalUnit,
    ) -> Result<ScheduleExpr, ScheduleError> {
        self.expect(TokenKind::From)?;
        let from_span = self.here();
        let from = self.time()?;
        self.expect(TokenKind::To)?;
        let to_span = self.here();
        let to = self.time()?;
        if from > to {
            return Err(self.error_at(
                "interval window start must not be after end",
                from_span.to(to_span),
            ));
        }
        let day_filter = if self.eat(&TokenKind::On) {
            Some(self.day_filter()?)
        } else {
            None
        };
        Ok(ScheduleExpr::IntervalRepeat {
            interval,
            unit,
            from,
            to,
            day_filter,
        })
    }

    fn month_repeat(&mut self, interval: u32) -> Result<ScheduleExpr, ScheduleError> {
        self.expect(TokenKind::On)?;
        self.expect(TokenKind::The)?;
        let target = self.month_target()?;
        let times = self.at_times()?;
        Ok(ScheduleExpr::MonthRepeat {
            interval,
            target,
            times,
        })
    }

    fn month_target(&mut self) -> Result<MonthTarget, ScheduleError> {
        match self.peek() {
            Some(TokenKind::Last) => {
                self.pos += 1;
                match self.peek() {
                    Some(TokenKind::Day) => {
                        self.pos += 1;
                        Ok(MonthTarget::LastDay)
                    }
                    Some(TokenKind::Weekday) => {
                        self.pos += 1;
                        Ok(MonthTarget::LastWeekday)
                    }
                    Some(TokenKind::DayName(_)) => Ok(MonthTarget::OrdinalWeekday {
                        ordinal: OrdinalPosition::Last,
                        weekday: self.day_name()?,
                    }),
                    _ => Err(self.error("expected 'day', 'weekday', or day name after 'last'")),
                }
            }
            Some(TokenKind::Ordinal(ordinal)) => {
                let ordinal = *ordinal;
                self.pos += 1;
                Ok(MonthTarget::OrdinalWeekday {
                    ordinal,
                    weekday: self.day_name()?,
                })
            }
            Some(TokenKind::Next | TokenKind::Previous | TokenKind::Nearest) => {
                self.nearest_weekday()
            }
            Some(TokenKind::OrdinalNumber(_)) => Ok(MonthTarget::Days {
                specs: self.comma_list(Self::day_of_month_spec)?,
            }),
            _ => Err(self.error(
                "expected ordinal day (1st, 15th), 'last', ordinal weekday, or '[next|previous] nearest' after 'the'",
            )),
        }
    }

    /// `[next|previous] nearest weekday to 15th`
    fn nearest_weekday(&mut self) -> Result<MonthTarget, ScheduleError> {
        let direction = if self.eat(&TokenKind::Next) {
            Some(NearestDirection::Next)
        } else if self.eat(&TokenKind::Previous) {
            Some(NearestDirection::Previous)
        } else {
            None
        };
        self.expect(TokenKind::Nearest)?;
        self.expect(TokenKind::Weekday)?;
        self.expect(TokenKind::To)?;
        let day = self.ordinal_day()?;
        Ok(MonthTarget::NearestWeekday { day, direction })
    }

    fn day_of_month_spec(&mut self) -> Result<DayOfMonthSpec, ScheduleError> {
        let start_span = self.here();
        let start = self.ordinal_day()?;
        if !self.eat(&TokenKind::To) {
            return Ok(DayOfMonthSpec::Single(start));
        }
        let end_span = self.here();
        let end = self.ordinal_day()?;
        if start > end {
            return Err(self.error_at(
                format!("invalid day range {start} to {end}"),
                start_span.to(end_span),
            ));
        }
        Ok(DayOfMonthSpec::Range(start, end))
    }

    /// `15th`, checked against 1..=31.
    fn ordinal_day(&mut self) -> Result<u8, ScheduleError> {
        let span = self.here();
        match self.peek() {
            Some(TokenKind::OrdinalNumber(n)) => {
                let n = *n;
                self.pos += 1;
                match u8::try_from(n) {
                    Ok(day @ 1..=31) => Ok(day),
                    _ => Err(self.error_at(format!("invalid day {n}, must be 1-31"), span)),
                }
            }
            _ => Err(self.error("expected ordinal day number (1st, 15th, ...)")),
        }
    }

    /// `first monday of every [N] month(s) at ...`
    fn ordinal_repeat(&mut self) -> Result<ScheduleExpr, ScheduleError> {
        let ordinal = match self.bump().map(|t| t.kind) {
            Some(TokenKind::Ordinal(o)) => o,
            _ => OrdinalPosition::Last,
        };
        let day = self.day_name()?;
        self.expect(TokenKind::Of)?;
        self.expect(TokenKind::Every)?;
        let interval = if matches!(self.peek(), Some(TokenKind::Number(_))) {
            self.interval()?
        } else {
            1
        };
        self.expect(TokenKind::Month)?;
        let times = self.at_times()?;
        Ok(ScheduleExpr::OrdinalRepeat {
            interval,
            ordinal,
            day,
            times,
        })
    }

    fn year_repeat(&mut self, interval: u32) -> Result<ScheduleExpr, ScheduleError> {
        self.expect(TokenKind::On)?;
        let target = if self.eat(&TokenKind::The) {
            self.year_target_after_the()?
        } else if matches!(self.peek(), Some(TokenKind::MonthName(_))) {
            let (month, day) = self.month_day()?;
            YearTarget::Date { month, day }
        } else {
            return Err(self.error("expected month name or 'the' after 'every year on'"));
        };
        let times = self.at_times()?;
        Ok(ScheduleExpr::YearRepeat {
            interval,
            target,
            times,
        })
    }

    fn year_target_after_the(&mut self) -> Result<YearTarget, ScheduleError> {
        match self.peek() {
            Some(TokenKind::Last) => {
                self.pos += 1;
                if self.eat(&TokenKind::Weekday) {
                    self.expect(TokenKind::Of)?;
                    return Ok(YearTarget::LastWeekday {
                        month: self.month_name()?,
                    });
                }
                if !matches!(self.peek(), Some(TokenKind::DayName(_))) {
                    return Err(self.error("expected 'weekday' or day name after 'last'"));
                }
                self.ordinal_weekday_of(OrdinalPosition::Last)
            }
            Some(TokenKind::Ordinal(ordinal)) => {
                let ordinal = *ordinal;
                self.pos += 1;
                self.ordinal_weekday_of(ordinal)
            }
            Some(TokenKind::OrdinalNumber(_)) => {
                let span = self.here();
                let day = self.ordinal_day()?;
                self.expect(TokenKind::Of)?;
                let month = self.month_name()?;
                self.check_month_day(month, day.into(), span)?;
                Ok(YearTarget::DayOfMonth { day, month })
            }
            _ => Err(self.error("expected ordinal, day number, or 'last' after 'the'")),
        }
    }

    fn ordinal_weekday_of(&mut self, ordinal: OrdinalPosition) -> Result<YearTarget, ScheduleError> {
        let weekday = self.day_name()?;
        self.expect(TokenKind::Of)?;
        Ok(YearTarget::OrdinalWeekday {
            ordinal,
            weekday,
            month: self.month_name()?,
        })
    }

    fn single_date(&mut self) -> Result<ScheduleExpr, ScheduleError> {
        let date = self.date_spec()?;
        let times = self.at_times()?;
        Ok(ScheduleExpr::SingleDate { date, times })
    }

    // --- leaves ---

    fn date_spec(&mut self) -> Result<DateSpec, ScheduleError> {
        match self.peek() {
            Some(TokenKind::IsoDate(_)) => Ok(DateSpec::Iso(self.iso_date("date")?)),
            Some(TokenKind::MonthName(_)) => {
                let (month, day) = self.month_day()?;
                Ok(DateSpec::Named { month, day })
            }
            _ => Err(self.error("expected ISO date (YYYY-MM-DD) or month and day")),
        }
    }

    /// `dec 25` or `dec 25th`, checked against the month's longest length.
    fn month_day(&mut self) -> Result<(MonthName, u8), ScheduleError> {
        let month = self.month_name()?;
        let span = self.here();
        let day = match self.peek() {
            Some(TokenKind::Number(n) | TokenKind::OrdinalNumber(n)) => *n,
            _ => return Err(self.error("expected day number after month name")),
        };
        self.pos += 1;
        let day = self.check_month_day(month, day, span)?;
        Ok((month, day))
    }

    fn check_month_day(&self, month: MonthName, day: u32, span: Span) -> Result<u8, ScheduleError> {
        match u8::try_from(day) {
            Ok(d) if (1..=month.max_days()).contains(&d) => Ok(d),
            _ => Err(self.error_at(
                format!("invalid day {day} for {}", month.full_name()),
                span,
            )),
        }
    }

    fn iso_date(&mut self, after: &str) -> Result<Date, ScheduleError> {
        let span = self.here();
        match self.peek() {
            Some(TokenKind::IsoDate(text)) => {
                let parsed = text.parse::<Date>();
                let text = text.clone();
                self.pos += 1;
                parsed.map_err(|_| self.error_at(format!("invalid date: {text}"), span))
            }
            _ => Err(self.error(format!("expected ISO date (YYYY-MM-DD) after {after}"))),
        }
    }

    fn day_filter(&mut self) -> Result<DayFilter, ScheduleError> {
        match self.peek() {
            Some(TokenKind::Day) => {
                self.pos += 1;
                Ok(DayFilter::Every)
            }
            Some(TokenKind::Weekday) => {
                self.pos += 1;
                Ok(DayFilter::Weekday)
            }
            Some(TokenKind::Weekend) => {
                self.pos += 1;
                Ok(DayFilter::Weekend)
            }
            Some(TokenKind::DayName(_)) => Ok(DayFilter::Days(self.comma_list(Self::day_name)?)),
            _ => Err(self.error("expected 'day', 'weekday', 'weekend', or day name")),
        }
    }

    fn day_name(&mut self) -> Result<Weekday, ScheduleError> {
        match self.peek() {
            Some(TokenKind::DayName(d)) => {
                let d = *d;
                self.pos += 1;
                Ok(d)
            }
            _ => Err(self.error("expected day name")),
        }
    }

    fn month_name(&mut self) -> Result<MonthName, ScheduleError> {
        match self.peek() {
            Some(TokenKind::MonthName(m)) => {
                let m = *m;
                self.pos += 1;
                Ok(m)
            }
            _ => Err(self.error("expected month name")),
        }
    }

    /// `at HH:MM[, HH:MM ...]`. A bare time where `at` belongs gets a hint.
    fn at_times(&mut self) -> Result<Vec<TimeOfDay>, ScheduleError> {
        if let Some(TokenKind::Time(t)) = self.peek() {
            let hint = format!("at {t}");
            return Err(self.error("expected 'at' before time").with_suggestion(hint));
        }
        self.expect(TokenKind::At)?;
        self.comma_list(Self::time)
    }

    fn time(&mut self) -> Result<TimeOfDay, ScheduleError> {
        match self.peek() {
            Some(TokenKind::Time(t)) => {
                let t = *t;
                self.pos += 1;
                Ok(t)
            }
            _ => Err(self.error("expected time (HH:MM)")),
        }
    }

    fn comma_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ScheduleError>,
    ) -> Result<Vec<T>, ScheduleError> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }
}
