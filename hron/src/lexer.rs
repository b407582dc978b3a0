use crate::ast::{IntervalUnit, MonthName, OrdinalPosition, TimeOfDay, Weekday};
use crate::error::{ScheduleError, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Every,
    On,
    At,
    From,
    To,
    In,
    Of,
    The,
    Last,
    Except,
    Until,
    Starting,
    During,
    Nearest,
    Next,
    Previous,

    // unit words, singular and plural lex the same
    Year,
    Day,
    Weekday,
    Weekend,
    Weeks,
    Month,

    DayName(Weekday),
    MonthName(MonthName),
    Ordinal(OrdinalPosition),
    IntervalUnit(IntervalUnit),

    Number(u32),
    /// `15th` keeps only the number.
    OrdinalNumber(u32),
    Time(TimeOfDay),
    /// `YYYY-MM-DD`, shape-checked only. The parser validates the calendar date.
    IsoDate(String),
    Timezone(String),

    Comma,
}

impl TokenKind {
    /// Short description for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            Self::DayName(d) => format!("day name '{}'", d.name()),
            Self::MonthName(m) => format!("month name '{}'", m.full_name()),
            Self::Ordinal(o) => format!("'{o}'"),
            Self::IntervalUnit(IntervalUnit::Minutes) => "'min'".into(),
            Self::IntervalUnit(IntervalUnit::Hours) => "'hours'".into(),
            Self::Number(n) => format!("number {n}"),
            Self::OrdinalNumber(n) => format!("ordinal number {n}"),
            Self::Time(t) => format!("time {t}"),
            Self::IsoDate(d) => format!("date {d}"),
            Self::Timezone(tz) => format!("timezone '{tz}'"),
            Self::Comma => "','".into(),
            keyword => format!("'{}'", keyword_text(keyword)),
        }
    }
}

fn keyword_text(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Every => "every",
        TokenKind::On => "on",
        TokenKind::At => "at",
        TokenKind::From => "from",
        TokenKind::To => "to",
        TokenKind::In => "in",
        TokenKind::Of => "of",
        TokenKind::The => "the",
        TokenKind::Last => "last",
        TokenKind::Except => "except",
        TokenKind::Until => "until",
        TokenKind::Starting => "starting",
        TokenKind::During => "during",
        TokenKind::Nearest => "nearest",
        TokenKind::Next => "next",
        TokenKind::Previous => "previous",
        TokenKind::Year => "year",
        TokenKind::Day => "day",
        TokenKind::Weekday => "weekday",
        TokenKind::Weekend => "weekend",
        TokenKind::Weeks => "weeks",
        TokenKind::Month => "month",
        _ => "?",
    }
}

/// Resolve a lower-cased word. Day and month names accept both the full
/// and the three-letter spelling.
fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "every" => TokenKind::Every,
        "on" => TokenKind::On,
        "at" => TokenKind::At,
        "from" => TokenKind::From,
        "to" => TokenKind::To,
        "in" => TokenKind::In,
        "of" => TokenKind::Of,
        "the" => TokenKind::The,
        "last" => TokenKind::Last,
        "except" => TokenKind::Except,
        "until" => TokenKind::Until,
        "starting" => TokenKind::Starting,
        "during" => TokenKind::During,
        "nearest" => TokenKind::Nearest,
        "next" => TokenKind::Next,
        "previous" => TokenKind::Previous,
        "year" | "years" => TokenKind::Year,
        "day" | "days" => TokenKind::Day,
        "weekday" | "weekdays" => TokenKind::Weekday,
        "weekend" | "weekends" => TokenKind::Weekend,
        "week" | "weeks" => TokenKind::Weeks,
        "month" | "months" => TokenKind::Month,
        "first" => TokenKind::Ordinal(OrdinalPosition::First),
        "second" => TokenKind::Ordinal(OrdinalPosition::Second),
        "third" => TokenKind::Ordinal(OrdinalPosition::Third),
        "fourth" => TokenKind::Ordinal(OrdinalPosition::Fourth),
        "fifth" => TokenKind::Ordinal(OrdinalPosition::Fifth),
        "min" | "mins" | "minute" | "minutes" => TokenKind::IntervalUnit(IntervalUnit::Minutes),
        "hour" | "hours" | "hr" | "hrs" => TokenKind::IntervalUnit(IntervalUnit::Hours),
        other => {
            if let Some(day) = Weekday::from_name(other) {
                TokenKind::DayName(day)
            } else {
                TokenKind::MonthName(MonthName::from_name(other)?)
            }
        }
    };
    Some(kind)
}

/// Split `input` into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ScheduleError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// The previous token was `in`, so the next word is a zone name.
    expect_zone: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            expect_zone: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ScheduleError> {
        let mut tokens = Vec::new();
        while let Some(b) = self.skip_whitespace() {
            let start = self.pos;
            let kind = if std::mem::take(&mut self.expect_zone) {
                self.zone()
            } else if b == b',' {
                self.pos += 1;
                TokenKind::Comma
            } else if b.is_ascii_digit() {
                self.numeric()?
            } else if b.is_ascii_alphabetic() {
                self.word()?
            } else {
                return Err(self.unexpected_char(start));
            };
            tokens.push(Token {
                kind,
                span: self.span(start, self.pos),
            });
        }
        if let Some(token) = tokens.last().filter(|_| self.expect_zone) {
            return Err(ScheduleError::lex(
                "expected timezone after 'in'",
                token.span,
                self.input,
            ));
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> Option<u8> {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.peek()
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Spans count characters, while the cursor walks bytes.
    fn span(&self, start: usize, end: usize) -> Span {
        let offset = |byte: usize| self.input.get(..byte).map_or(byte, |s| s.chars().count());
        Span::new(offset(start), offset(end))
    }

    fn error(&self, message: impl Into<String>, start: usize) -> ScheduleError {
        let span = self.span(start, self.pos);
        let span = Span::new(span.start, span.end.max(span.start + 1));
        ScheduleError::lex(message, span, self.input)
    }

    fn unexpected_char(&self, start: usize) -> ScheduleError {
        let ch = self.input[start..].chars().next().unwrap_or('?');
        ScheduleError::lex(
            format!("unexpected character '{ch}'"),
            self.span(start, start + ch.len_utf8()),
            self.input,
        )
    }

    /// Zone names such as `America/New_York` run to the next whitespace.
    fn zone(&mut self) -> TokenKind {
        let name = self.eat_while(|b| !b.is_ascii_whitespace());
        TokenKind::Timezone(name.to_string())
    }

    fn numeric(&mut self) -> Result<TokenKind, ScheduleError> {
        let start = self.pos;
        let digits = self.eat_while(|b| b.is_ascii_digit());

        if digits.len() == 4 && self.looks_like_date_tail() {
            self.pos = start + 10;
            return Ok(TokenKind::IsoDate(self.input[start..self.pos].to_string()));
        }

        if digits.len() <= 2 && self.peek() == Some(b':') {
            return self.time(start, digits);
        }

        let value: u32 = digits
            .parse()
            .map_err(|_| self.error("number too large", start))?;

        if let Some(suffix) = self.bytes.get(self.pos..self.pos + 2) {
            let suffix = suffix.to_ascii_lowercase();
            if matches!(&suffix[..], b"st" | b"nd" | b"rd" | b"th") {
                self.pos += 2;
                return Ok(TokenKind::OrdinalNumber(value));
            }
        }
        Ok(TokenKind::Number(value))
    }

    /// `-MM-DD` right after four digits.
    fn looks_like_date_tail(&self) -> bool {
        let Some(tail) = self.bytes.get(self.pos..self.pos + 6) else {
            return false;
        };
        tail[0] == b'-'
            && tail[1].is_ascii_digit()
            && tail[2].is_ascii_digit()
            && tail[3] == b'-'
            && tail[4].is_ascii_digit()
            && tail[5].is_ascii_digit()
    }

    fn time(&mut self, start: usize, hour_digits: &str) -> Result<TokenKind, ScheduleError> {
        self.pos += 1;
        let minute_digits = self.eat_while(|b| b.is_ascii_digit());
        if minute_digits.len() != 2 {
            return Err(self.error("invalid time, expected HH:MM", start));
        }
        let hour: u8 = hour_digits.parse().unwrap_or(u8::MAX);
        let minute: u8 = minute_digits.parse().unwrap_or(u8::MAX);
        TimeOfDay::new(hour, minute)
            .map(TokenKind::Time)
            .ok_or_else(|| self.error("invalid time", start))
    }

    fn word(&mut self) -> Result<TokenKind, ScheduleError> {
        let start = self.pos;
        let raw = self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        let word = raw.to_ascii_lowercase();
        let kind = keyword(&word)
            .ok_or_else(|| self.error(format!("unknown keyword '{word}'"), start))?;
        if kind == TokenKind::In {
            self.expect_zone = true;
        }
        Ok(kind)
    }
}
