use std::fmt;

/// Half-open character range into the parsed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of carets used to underline this span. Never zero.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start).max(1)
    }

    pub(crate) fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Every failure hron can report.
///
/// `Lex` and `Parse` point back into the source text; `Eval` and `Cron`
/// carry only a message. `Display` prints the bare message, use
/// [`ScheduleError::display_rich`] for the underlined form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ScheduleError {
    #[error("{message}")]
    Lex {
        message: String,
        span: Span,
        input: String,
    },

    #[error("{message}")]
    Parse {
        message: String,
        span: Span,
        input: String,
        suggestion: Option<String>,
    },

    #[error("{message}")]
    Eval { message: String },

    #[error("{message}")]
    Cron { message: String },
}

impl ScheduleError {
    pub fn lex(message: impl Into<String>, span: Span, input: impl Into<String>) -> Self {
        Self::Lex {
            message: message.into(),
            span,
            input: input.into(),
        }
    }

    pub fn parse(message: impl Into<String>, span: Span, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            span,
            input: input.into(),
            suggestion: None,
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }

    pub fn cron(message: impl Into<String>) -> Self {
        Self::Cron {
            message: message.into(),
        }
    }

    /// Attach a corrective hint. Only parse errors carry one; other kinds
    /// are returned unchanged.
    pub fn with_suggestion(self, hint: impl Into<String>) -> Self {
        match self {
            Self::Parse {
                message,
                span,
                input,
                ..
            } => Self::Parse {
                message,
                span,
                input,
                suggestion: Some(hint.into()),
            },
            other => other,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. }
            | Self::Parse { message, .. }
            | Self::Eval { message }
            | Self::Cron { message } => message,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. } | Self::Parse { span, .. } => Some(*span),
            Self::Eval { .. } | Self::Cron { .. } => None,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Parse { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Multi-line rendering with the offending span underlined:
    ///
    /// ```text
    /// error: unknown keyword 'evry'
    ///   evry day at 09:00
    ///   ^^^^
    /// ```
    pub fn display_rich(&self) -> String {
        match self {
            Self::Lex {
                message,
                span,
                input,
            } => underline(message, *span, input, None),
            Self::Parse {
                message,
                span,
                input,
                suggestion,
            } => underline(message, *span, input, suggestion.as_deref()),
            Self::Eval { message } | Self::Cron { message } => format!("error: {message}"),
        }
    }
}

fn underline(message: &str, span: Span, input: &str, suggestion: Option<&str>) -> String {
    let mut out = format!("error: {message}\n  {input}\n");
    out.push_str(&" ".repeat(span.start + 2));
    out.push_str(&"^".repeat(span.width()));
    if let Some(hint) = suggestion {
        out.push_str(&format!(" try: \"{hint}\""));
    }
    out
}
