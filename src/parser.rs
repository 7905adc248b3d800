use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use thiserror::Error;

mod entities;

pub use entities::{
    FieldId, LogLevel, LogRecord, LogSource, LogStore, ParsedLine, Severity, SourceId, ValueId,
};

use crate::pattern;

/// Group that captures the timestamp text. Required.
pub const GROUP_DATETIME: &str = "datetime";
/// Group that captures the message text. Required.
pub const GROUP_MESSAGE: &str = "message";
/// Group that captures the level name. Optional; defaults to "INFO".
pub const GROUP_LEVEL: &str = "level";

const DEFAULT_LEVEL: &str = "INFO";

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line pattern is missing the required capture group '{0}'")]
    MissingGroup(&'static str),
    #[error("invalid line pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Applies a named-capture-group regex to raw lines.
///
/// The pattern may come from [`crate::pattern::compile_mask_pattern`] or be
/// authored directly as a regular expression; either way it must define
/// `datetime` and `message` groups.
pub struct LineParser {
    regex: Regex,
    datetime_format: String,
}

impl LineParser {
    /// `datetime_format` uses the letter-based format of the profile
    /// (e.g. `"yyyy-MM-dd HH:mm:ss.fff"`); it is translated to a chrono
    /// format for timestamp parsing.
    pub fn new(pattern: &str, datetime_format: &str) -> Result<Self, ParserError> {
        let regex = Regex::new(pattern)?;
        for required in [GROUP_DATETIME, GROUP_MESSAGE] {
            if !regex.capture_names().flatten().any(|name| name == required) {
                return Err(ParserError::MissingGroup(required));
            }
        }
        Ok(Self {
            regex,
            datetime_format: pattern::to_chrono_format(datetime_format),
        })
    }

    /// Match one raw line. `None` is the normal "line did not match"
    /// outcome, also returned when `datetime` or `message` did not
    /// participate in the match.
    pub fn parse(&self, line: &str) -> Option<ParsedLine> {
        let caps = self.regex.captures(line)?;
        let timestamp = caps.name(GROUP_DATETIME)?.as_str().to_string();
        let message = caps.name(GROUP_MESSAGE)?.as_str().to_string();
        let level = caps
            .name(GROUP_LEVEL)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        // Every remaining group becomes a field, in capture order; unnamed
        // groups are keyed by their index.
        let mut fields = Vec::new();
        for (index, name) in self.regex.capture_names().enumerate() {
            if index == 0 {
                continue;
            }
            match name {
                Some(GROUP_DATETIME) | Some(GROUP_MESSAGE) | Some(GROUP_LEVEL) => {}
                Some(name) => {
                    let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                    fields.push((name.to_string(), value.to_string()));
                }
                None => {
                    let value = caps.get(index).map(|m| m.as_str()).unwrap_or_default();
                    fields.push((index.to_string(), value.to_string()));
                }
            }
        }

        Some(ParsedLine {
            timestamp,
            level,
            fields,
            message,
        })
    }

    pub fn parse_timestamp(&self, text: &str) -> Option<DateTime<Local>> {
        let naive = NaiveDateTime::parse_from_str(text, &self.datetime_format).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }

    /// Turn a parsed line into a record owned by `store`. Fields named
    /// `thread` and `logger` land in the record's dedicated slots; the rest
    /// are interned into the store's field-value dictionary. `None` when
    /// the timestamp text does not parse under the profile's format.
    pub fn build_record(
        &self,
        parsed: ParsedLine,
        source: SourceId,
        store: &mut LogStore,
    ) -> Option<LogRecord> {
        let timestamp = self.parse_timestamp(&parsed.timestamp)?;
        let level = LogLevel::new(parsed.level);

        let mut thread = String::new();
        let mut logger = String::new();
        let mut fields = Vec::new();
        for (name, value) in parsed.fields {
            match name.as_str() {
                "thread" => thread = value,
                "logger" => logger = value,
                _ => {
                    let field = store.field_id(&name);
                    let value = store.intern_value(&value);
                    fields.push((field, value));
                }
            }
        }

        Some(LogRecord {
            timestamp,
            level,
            thread,
            source,
            logger,
            message: parsed.message,
            artifacts: None,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LineParser {
        LineParser::new(
            r"(?<datetime>\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}\.\d{3})\s\[(?<level>[A-Z]+)\]\s\[(?<thread>[^\]]+)\]\s(?<logger>\S+):\s(?<message>.+)",
            "yyyy-MM-dd HH:mm:ss.fff",
        )
        .unwrap()
    }

    #[test]
    fn parses_a_full_line() {
        let parsed = parser()
            .parse("2026-03-01 09:15:00.250 [WARN] [worker-2] net.http: retrying request")
            .unwrap();
        assert_eq!(parsed.timestamp, "2026-03-01 09:15:00.250");
        assert_eq!(parsed.level, "WARN");
        assert_eq!(parsed.message, "retrying request");
        assert_eq!(
            parsed.fields,
            vec![
                ("thread".to_string(), "worker-2".to_string()),
                ("logger".to_string(), "net.http".to_string()),
            ]
        );
    }

    #[test]
    fn non_matching_line_is_none() {
        assert!(parser().parse("  at com.example.Main(Main.java:42)").is_none());
    }

    #[test]
    fn missing_level_group_defaults_to_info() {
        let parser = LineParser::new(
            r"(?<datetime>\d{4}-\d{2}-\d{2})\s(?<message>.+)",
            "yyyy-MM-dd",
        )
        .unwrap();
        let parsed = parser.parse("2026-03-01 plain line").unwrap();
        assert_eq!(parsed.level, "INFO");
    }

    #[test]
    fn missing_required_group_is_a_construction_error() {
        let result = LineParser::new(r"(?<datetime>\d+)", "yyyy");
        assert!(matches!(result, Err(ParserError::MissingGroup("message"))));
    }
}
