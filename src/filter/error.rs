use thiserror::Error;

/// Errors that can occur when parsing filter expressions
#[derive(Debug, Error)]
pub enum FilterParseError {
    #[error(
        "Unknown filter type: '{0}'. Valid types are: level (l), severity (s), thread (th), logger (log), field (f), file, text (t), regex (r), from, to, ago (w)"
    )]
    UnknownFilterType(String),

    #[error("Empty filter value for type '{0}'")]
    EmptyValue(String),

    #[error("Unknown severity '{0}'. Valid severities are: trace, debug, info, warning, error, critical")]
    UnknownSeverity(String),

    #[error("Invalid timestamp '{0}'. Expected e.g. 2026-03-01T09:15:00 or 2026-03-01 09:15:00.250")]
    InvalidTimestamp(String),

    #[error("Invalid duration '{0}'. Expected a number with a s/m/h/d suffix, e.g. 15m")]
    InvalidDuration(String),

    #[error("from: and to: must be used together")]
    IncompleteRange,

    #[error("Invalid field filter '{0}'. Expected field:name=value[,value...]")]
    InvalidField(String),

    #[error("Invalid filter expression: {0}")]
    InvalidExpression(String),
}
