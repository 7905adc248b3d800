//! Combined record matching
//!
//! A [`MatchContext`] bundles everything one query selects: a filter set
//! with its combine mode, an optional source-file scope, an optional time
//! window and an optional free-text/regex message search. It is built per
//! query and has no identity beyond it.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::filter::{
    self, CombineMode, FieldFilter, Filter, FilterExpression, FilterKind, FilterParseError,
    FilterType, MessageFilter, NameSetFilter, SeveritySetFilter, TimeAgoFilter, TimeRangeFilter,
    processors,
};
use crate::parser::{LogRecord, LogStore, Severity};

/// Free-text or regex message search; the regex wins when both are set.
#[derive(Debug, Clone, Default)]
pub struct MessageSearch {
    pub text: Option<String>,
    pub regex: Option<String>,
    pub case_sensitive: bool,
}

impl MessageSearch {
    pub fn text(pattern: impl Into<String>) -> Self {
        Self {
            text: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, message: &str) -> bool {
        if let Some(pattern) = &self.regex {
            return match processors::cached_regex(pattern, self.case_sensitive) {
                Some(regex) => regex.is_match(message),
                None => false,
            };
        }
        match &self.text {
            Some(text) if self.case_sensitive => message.contains(text),
            Some(text) => message.to_lowercase().contains(&text.to_lowercase()),
            None => true,
        }
    }
}

/// Everything one query selects. Built per query, then discarded.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    pub filters: Vec<Filter>,
    pub mode: CombineMode,
    /// Source display names in scope; empty means no scope restriction.
    pub sources: Vec<String>,
    /// Inclusive time window; only applied when both bounds are present.
    pub time_window: Option<(DateTime<Local>, DateTime<Local>)>,
    pub search: Option<MessageSearch>,
}

impl MatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn scoped_to<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn window(mut self, from: DateTime<Local>, to: DateTime<Local>) -> Self {
        self.time_window = Some((from, to));
        self
    }

    pub fn search(mut self, search: MessageSearch) -> Self {
        self.search = Some(search);
        self
    }
}

/// Combined evaluation of a record against a context. A `None` context
/// always matches (no filtering active).
pub fn is_match(context: Option<&MatchContext>, record: &LogRecord, store: &LogStore) -> bool {
    let Some(context) = context else {
        return true;
    };

    if !context.sources.is_empty() {
        let name = &store.source(record.source).display_name;
        if !context
            .sources
            .iter()
            .any(|source| source.eq_ignore_ascii_case(name))
        {
            return false;
        }
    }

    if let Some((from, to)) = context.time_window {
        if record.timestamp < from || record.timestamp > to {
            return false;
        }
    }

    let mut any_matched = false;
    for selected in &context.filters {
        if filter::is_match(selected, record, store) {
            any_matched = true;
            if context.mode == CombineMode::Any {
                break;
            }
        } else if context.mode == CombineMode::All {
            return false;
        }
    }
    // Covers the OR-mode "scanned all, found none" case and doubles as a
    // safety net in AND mode.
    if !context.filters.is_empty() && !any_matched {
        return false;
    }

    if let Some(search) = &context.search {
        if !search.matches(&record.message) {
            return false;
        }
    }

    true
}

/// Translate a parsed filter expression into a match context.
pub fn context_from_expression(
    expr: &FilterExpression,
    mode: CombineMode,
) -> Result<MatchContext, FilterParseError> {
    let mut context = MatchContext::new().mode(mode);

    name_set_filters(&mut context.filters, expr, FilterType::Level, FilterKind::LogLevels);
    name_set_filters(&mut context.filters, expr, FilterType::Thread, FilterKind::Threads);
    name_set_filters(&mut context.filters, expr, FilterType::Logger, FilterKind::Loggers);
    name_set_filters(&mut context.filters, expr, FilterType::File, FilterKind::Files);

    for exclude in [false, true] {
        let values = if exclude {
            expr.exclude_values(FilterType::Severity)
        } else {
            expr.include_values(FilterType::Severity)
        };
        if values.is_empty() {
            continue;
        }
        let severities = values
            .iter()
            .map(|value| {
                Severity::from_name(value)
                    .ok_or_else(|| FilterParseError::UnknownSeverity(value.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        context.filters.push(Filter {
            exclude,
            kind: FilterKind::LogSeverities(SeveritySetFilter { severities }),
        });
    }

    for term in expr.terms_of(FilterType::Field) {
        let Some((name, values)) = term.value.split_once('=') else {
            return Err(FilterParseError::InvalidField(term.value.clone()));
        };
        let name = name.trim();
        let values: Vec<&str> = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();
        if name.is_empty() || values.is_empty() {
            return Err(FilterParseError::InvalidField(term.value.clone()));
        }
        context.filters.push(Filter {
            exclude: term.exclude,
            kind: FilterKind::Field(FieldFilter {
                field: name.to_string(),
                values: NameSetFilter::new(values),
            }),
        });
    }

    for term in expr.terms_of(FilterType::Text) {
        context.filters.push(Filter {
            exclude: term.exclude,
            kind: FilterKind::Message(MessageFilter::substring(&term.value)),
        });
    }
    for term in expr.terms_of(FilterType::Regex) {
        context.filters.push(Filter {
            exclude: term.exclude,
            kind: FilterKind::Message(MessageFilter::regex(&term.value)),
        });
    }

    let mut from = None;
    let mut to = None;
    for term in expr.terms_of(FilterType::From) {
        if term.exclude {
            return Err(FilterParseError::InvalidExpression(
                "from: cannot be excluded".to_string(),
            ));
        }
        from = Some(parse_expression_timestamp(&term.value)?);
    }
    for term in expr.terms_of(FilterType::To) {
        if term.exclude {
            return Err(FilterParseError::InvalidExpression(
                "to: cannot be excluded".to_string(),
            ));
        }
        to = Some(parse_expression_timestamp(&term.value)?);
    }
    match (from, to) {
        (Some(from), Some(to)) => {
            context.filters.push(Filter::include(FilterKind::TimeRange(
                TimeRangeFilter::extended(from, to),
            )));
        }
        (None, None) => {}
        _ => return Err(FilterParseError::IncompleteRange),
    }

    for term in expr.terms_of(FilterType::Ago) {
        context.filters.push(Filter {
            exclude: term.exclude,
            kind: FilterKind::TimeAgo(TimeAgoFilter {
                max_age: parse_age(&term.value)?,
            }),
        });
    }

    Ok(context)
}

fn name_set_filters(
    filters: &mut Vec<Filter>,
    expr: &FilterExpression,
    filter_type: FilterType,
    kind: fn(NameSetFilter) -> FilterKind,
) {
    let include = expr.include_values(filter_type);
    if !include.is_empty() {
        filters.push(Filter::include(kind(NameSetFilter::new(include))));
    }
    let exclude = expr.exclude_values(filter_type);
    if !exclude.is_empty() {
        filters.push(Filter::exclude(kind(NameSetFilter::new(exclude))));
    }
}

fn parse_expression_timestamp(value: &str) -> Result<DateTime<Local>, FilterParseError> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            if let Some(timestamp) = Local.from_local_datetime(&naive).earliest() {
                return Ok(timestamp);
            }
        }
    }
    Err(FilterParseError::InvalidTimestamp(value.to_string()))
}

fn parse_age(value: &str) -> Result<chrono::Duration, FilterParseError> {
    let value = value.trim();
    let Some(unit) = value.chars().last() else {
        return Err(FilterParseError::InvalidDuration(value.to_string()));
    };
    let number = &value[..value.len() - unit.len_utf8()];
    let Ok(amount) = number.parse::<i64>() else {
        return Err(FilterParseError::InvalidDuration(value.to_string()));
    };
    match unit {
        's' => Ok(chrono::Duration::seconds(amount)),
        'm' => Ok(chrono::Duration::minutes(amount)),
        'h' => Ok(chrono::Duration::hours(amount)),
        'd' => Ok(chrono::Duration::days(amount)),
        _ => Err(FilterParseError::InvalidDuration(value.to_string())),
    }
}
