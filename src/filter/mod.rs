//! Record filtering
//!
//! A [`Filter`] is one configured predicate over a log record: a closed set
//! of variants, each permanently bound to its evaluator in
//! [`processors::is_match`]. Filters carry a shared `exclude` flag that
//! inverts the result. The CLI builds filters from a small expression
//! language:
//!
//! ```text
//! type:value            Include records matching this predicate
//! !type:value           Exclude records matching this predicate
//! a,b,c                 Comma-joined values form a value set
//! ```
//!
//! # Filter types
//!
//! - `level:` / `lvl:` / `l:` - level name set
//! - `severity:` / `sev:` / `s:` - classified severity set
//! - `thread:` / `th:` - thread set
//! - `logger:` / `log:` - logger set
//! - `field:` / `f:` - `name=v1,v2` field-value set
//! - `file:` - source file-name set
//! - `text:` / `t:` - substring message search
//! - `regex:` / `re:` / `r:` - regex message search
//! - `from:` / `to:` - inclusive time range (must be used together)
//! - `ago:` / `within:` / `w:` - maximum record age, e.g. `15m`

pub mod error;
pub mod parser;
pub mod processors;

pub use error::FilterParseError;
pub use parser::{FilterExpression, FilterTerm, FilterType};
pub use processors::is_match;

use chrono::{DateTime, Duration, Local, Timelike};

use crate::parser::Severity;

/// How several selected filters combine in a match context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Every selected filter must match (AND).
    #[default]
    All,
    /// At least one selected filter must match (OR).
    Any,
}

/// One configured predicate plus the shared exclusion flag.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Inverts the variant's match result.
    pub exclude: bool,
    pub kind: FilterKind,
}

impl Filter {
    pub fn include(kind: FilterKind) -> Self {
        Self {
            exclude: false,
            kind,
        }
    }

    pub fn exclude(kind: FilterKind) -> Self {
        Self {
            exclude: true,
            kind,
        }
    }
}

/// Closed registry of filter variants. Adding a variant means adding its
/// arm in [`processors::is_match`]; there is no runtime registration.
#[derive(Debug, Clone)]
pub enum FilterKind {
    Message(MessageFilter),
    LogLevels(NameSetFilter),
    LogSeverities(SeveritySetFilter),
    Threads(NameSetFilter),
    Loggers(NameSetFilter),
    Field(FieldFilter),
    Files(NameSetFilter),
    TimeRange(TimeRangeFilter),
    TimeAgo(TimeAgoFilter),
    Group(FilterGroup),
}

/// Substring or regex search against the message (and optionally the
/// attached artifacts text).
#[derive(Debug, Clone)]
pub struct MessageFilter {
    pub pattern: String,
    pub use_regex: bool,
    pub case_sensitive: bool,
    pub include_artifacts: bool,
}

impl MessageFilter {
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            use_regex: false,
            case_sensitive: false,
            include_artifacts: false,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            use_regex: true,
            case_sensitive: false,
            include_artifacts: false,
        }
    }
}

/// Case-insensitive membership in a set of names.
#[derive(Debug, Clone, Default)]
pub struct NameSetFilter {
    names: Vec<String>,
}

impl NameSetFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.into().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.names.iter().any(|name| *name == value)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Membership in a set of classified severities.
#[derive(Debug, Clone)]
pub struct SeveritySetFilter {
    pub severities: Vec<Severity>,
}

/// Accepted-value set for one named record field.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub values: NameSetFilter,
}

/// Inclusive timestamp range.
#[derive(Debug, Clone, Copy)]
pub struct TimeRangeFilter {
    pub from: DateTime<Local>,
    pub to: DateTime<Local>,
}

impl TimeRangeFilter {
    pub fn new(from: DateTime<Local>, to: DateTime<Local>) -> Self {
        Self { from, to }
    }

    /// Second-granularity bounds: `from` is floored to the start of its
    /// second and `to` ceiled to the last representable instant of its
    /// second, so a user-entered range still captures sub-second
    /// timestamps.
    pub fn extended(from: DateTime<Local>, to: DateTime<Local>) -> Self {
        Self {
            from: from.with_nanosecond(0).unwrap_or(from),
            to: to.with_nanosecond(999_999_999).unwrap_or(to),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Local>) -> bool {
        self.from <= timestamp && timestamp <= self.to
    }
}

/// Records younger than `max_age` relative to evaluation time.
#[derive(Debug, Clone, Copy)]
pub struct TimeAgoFilter {
    pub max_age: Duration,
}

/// Composite quick-filter set with its own combine mode. An empty group
/// places no constraint and matches every record.
#[derive(Debug, Clone)]
pub struct FilterGroup {
    pub mode: CombineMode,
    pub filters: Vec<Filter>,
}
