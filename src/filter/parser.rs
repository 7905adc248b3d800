use super::error::FilterParseError;
use std::str::FromStr;

/// Types of filter terms the expression language knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Filter by level name (e.g. "INFO", "ERROR")
    Level,
    /// Filter by classified severity (e.g. "error", "warning")
    Severity,
    /// Filter by thread identifier
    Thread,
    /// Filter by logger name
    Logger,
    /// Filter by a named field's value ("field:name=value")
    Field,
    /// Filter by source file name
    File,
    /// Substring search in the message
    Text,
    /// Regex search in the message
    Regex,
    /// Inclusive lower time bound
    From,
    /// Inclusive upper time bound
    To,
    /// Maximum record age (e.g. "15m")
    Ago,
}

impl FromStr for FilterType {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "level" | "lvl" | "l" => Ok(FilterType::Level),
            "severity" | "sev" | "s" => Ok(FilterType::Severity),
            "thread" | "th" => Ok(FilterType::Thread),
            "logger" | "log" => Ok(FilterType::Logger),
            "field" | "f" => Ok(FilterType::Field),
            "file" => Ok(FilterType::File),
            "text" | "t" => Ok(FilterType::Text),
            "regex" | "re" | "r" => Ok(FilterType::Regex),
            "from" => Ok(FilterType::From),
            "to" => Ok(FilterType::To),
            "ago" | "within" | "w" => Ok(FilterType::Ago),
            _ => Err(FilterParseError::UnknownFilterType(s.to_string())),
        }
    }
}

impl FilterType {
    /// Get the canonical name of this filter type
    pub fn canonical_name(&self) -> &'static str {
        match self {
            FilterType::Level => "level",
            FilterType::Severity => "severity",
            FilterType::Thread => "thread",
            FilterType::Logger => "logger",
            FilterType::Field => "field",
            FilterType::File => "file",
            FilterType::Text => "text",
            FilterType::Regex => "regex",
            FilterType::From => "from",
            FilterType::To => "to",
            FilterType::Ago => "ago",
        }
    }
}

/// A single filter term (e.g. "level:ERROR" or "!text:timeout")
#[derive(Debug, Clone)]
pub struct FilterTerm {
    /// The type of filter
    pub filter_type: FilterType,
    /// The raw value to the right of the colon
    pub value: String,
    /// Whether this is an exclusion term (prefixed with !)
    pub exclude: bool,
}

impl FilterTerm {
    /// Parse a single filter term from a string
    pub fn parse(s: &str) -> Result<Self, FilterParseError> {
        let (exclude, rest) = if let Some(stripped) = s.strip_prefix('!') {
            (true, stripped)
        } else {
            (false, s)
        };

        let Some((name, value)) = rest.split_once(':') else {
            return Err(FilterParseError::InvalidExpression(format!(
                "Expected 'type:value' format, got: {}",
                s
            )));
        };

        let filter_type: FilterType = name.parse()?;
        let value = unquote(value.trim()).to_string();

        if value.is_empty() {
            return Err(FilterParseError::EmptyValue(
                filter_type.canonical_name().to_string(),
            ));
        }

        Ok(FilterTerm {
            filter_type,
            value,
            exclude,
        })
    }
}

/// A complete filter expression consisting of multiple terms
#[derive(Debug, Clone, Default)]
pub struct FilterExpression {
    pub terms: Vec<FilterTerm>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Parse a filter expression from a string. Terms are separated by
    /// whitespace; quoted segments stay intact.
    pub fn parse(s: &str) -> Result<Self, FilterParseError> {
        let mut terms = Vec::new();
        for part in split_preserving_quotes(s) {
            if part.contains(':') {
                terms.push(FilterTerm::parse(part)?);
            }
        }
        Ok(FilterExpression { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All include values of a specific type, comma-joined sets flattened
    pub fn include_values(&self, filter_type: FilterType) -> Vec<&str> {
        self.values(filter_type, false)
    }

    /// All exclude values of a specific type, comma-joined sets flattened
    pub fn exclude_values(&self, filter_type: FilterType) -> Vec<&str> {
        self.values(filter_type, true)
    }

    /// All terms of a specific type, excluded or not
    pub fn terms_of(&self, filter_type: FilterType) -> impl Iterator<Item = &FilterTerm> {
        self.terms
            .iter()
            .filter(move |term| term.filter_type == filter_type)
    }

    fn values(&self, filter_type: FilterType, exclude: bool) -> Vec<&str> {
        self.terms
            .iter()
            .filter(|term| term.filter_type == filter_type && term.exclude == exclude)
            .flat_map(|term| term.value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect()
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Split a string by whitespace while preserving quoted segments
fn split_preserving_quotes(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if i > start {
                    let part = &s[start..i];
                    if !part.trim().is_empty() {
                        parts.push(part.trim());
                    }
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < s.len() {
        let part = &s[start..];
        if !part.trim().is_empty() {
            parts.push(part.trim());
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_term() {
        let term = FilterTerm::parse("level:ERROR").unwrap();
        assert_eq!(term.filter_type, FilterType::Level);
        assert_eq!(term.value, "ERROR");
        assert!(!term.exclude);
    }

    #[test]
    fn test_parse_exclude_term() {
        let term = FilterTerm::parse("!logger:net.http").unwrap();
        assert_eq!(term.filter_type, FilterType::Logger);
        assert_eq!(term.value, "net.http");
        assert!(term.exclude);
    }

    #[test]
    fn test_parse_short_aliases() {
        let term = FilterTerm::parse("l:ERROR").unwrap();
        assert_eq!(term.filter_type, FilterType::Level);

        let term = FilterTerm::parse("s:warning").unwrap();
        assert_eq!(term.filter_type, FilterType::Severity);

        let term = FilterTerm::parse("t:timeout").unwrap();
        assert_eq!(term.filter_type, FilterType::Text);

        let term = FilterTerm::parse("w:15m").unwrap();
        assert_eq!(term.filter_type, FilterType::Ago);
    }

    #[test]
    fn test_parse_expression_with_sets() {
        let expr = FilterExpression::parse("level:ERROR,WARN thread:worker-1 !text:retry").unwrap();
        assert_eq!(expr.terms.len(), 3);
        assert_eq!(expr.include_values(FilterType::Level), vec!["ERROR", "WARN"]);
        assert_eq!(expr.include_values(FilterType::Thread), vec!["worker-1"]);
        assert_eq!(expr.exclude_values(FilterType::Text), vec!["retry"]);
    }

    #[test]
    fn test_quoted_value_keeps_spaces() {
        let expr = FilterExpression::parse(r#"text:"connection lost""#).unwrap();
        assert_eq!(expr.terms[0].value, "connection lost");
    }

    #[test]
    fn test_field_value_is_kept_raw() {
        let term = FilterTerm::parse("field:user=alice,bob").unwrap();
        assert_eq!(term.filter_type, FilterType::Field);
        assert_eq!(term.value, "user=alice,bob");
    }

    #[test]
    fn test_unknown_filter_type() {
        assert!(FilterTerm::parse("unknown:value").is_err());
    }

    #[test]
    fn test_empty_value() {
        assert!(FilterTerm::parse("level: ").is_err());
    }
}
