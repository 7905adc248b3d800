use chrono::{Local, TimeZone};
use std::path::Path;

use loglens::columns::ColumnExtractor;
use loglens::config::{ExtractionDefinition, ExtractionMethod};
use loglens::parser::{LogLevel, LogRecord, LogStore, SourceId};

fn store_with_source() -> (LogStore, SourceId) {
    let mut store = LogStore::new();
    let source = store.add_source(Path::new("app.log"));
    (store, source)
}

fn record(source: SourceId, message: &str, artifacts: Option<&str>) -> LogRecord {
    LogRecord {
        timestamp: Local.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        level: LogLevel::new("INFO"),
        thread: "main".to_string(),
        source,
        logger: "app".to_string(),
        message: message.to_string(),
        artifacts: artifacts.map(str::to_string),
        fields: Vec::new(),
    }
}

fn timing_definition() -> ExtractionDefinition {
    ExtractionDefinition {
        id: "timing".to_string(),
        method: ExtractionMethod::Regex,
        pattern: r"user=(?<user>\w+) took (?<elapsed>\d+)ms".to_string(),
    }
}

#[test]
fn columns_come_from_the_pattern_text_in_order() {
    let extractor = ColumnExtractor::new();
    let columns = extractor.columns(&timing_definition(), 0);
    assert_eq!(*columns, vec!["user".to_string(), "elapsed".to_string()]);
}

#[test]
fn extracts_values_from_the_message() {
    let (_store, source) = store_with_source();
    let extractor = ColumnExtractor::new();
    let log = record(source, "request user=alice took 42ms", None);

    let values = extractor.extract(&timing_definition(), 0, &log);
    assert_eq!(values, vec!["alice".to_string(), "42".to_string()]);
}

#[test]
fn falls_back_to_artifacts_when_the_message_does_not_match() {
    let (_store, source) = store_with_source();
    let extractor = ColumnExtractor::new();
    let log = record(
        source,
        "slow request detected",
        Some("details: user=bob took 1375ms"),
    );

    let values = extractor.extract(&timing_definition(), 0, &log);
    assert_eq!(values, vec!["bob".to_string(), "1375".to_string()]);
}

#[test]
fn yields_one_empty_string_per_column_when_nothing_matches() {
    let (_store, source) = store_with_source();
    let extractor = ColumnExtractor::new();
    let log = record(source, "nothing to see", None);

    let values = extractor.extract(&timing_definition(), 0, &log);
    assert_eq!(values, vec![String::new(), String::new()]);
}

#[test]
fn invalid_extraction_pattern_degrades_to_empty_columns() {
    let (_store, source) = store_with_source();
    let extractor = ColumnExtractor::new();
    let definition = ExtractionDefinition {
        id: "broken".to_string(),
        method: ExtractionMethod::Regex,
        pattern: r"(?<user>\w+) (unclosed".to_string(),
    };
    let log = record(source, "alice logged in", None);

    // The schema still derives from the pattern text.
    assert_eq!(*extractor.columns(&definition, 0), vec!["user".to_string()]);
    assert_eq!(extractor.extract(&definition, 0, &log), vec![String::new()]);
}

#[test]
fn invalidate_clears_every_cached_definition() {
    let extractor = ColumnExtractor::new();
    let mut definition = timing_definition();

    assert_eq!(extractor.columns(&definition, 0).len(), 2);

    // Without invalidation the edited pattern is masked by the cache.
    definition.pattern = r"(?<only>\w+)".to_string();
    assert_eq!(extractor.columns(&definition, 0).len(), 2);

    extractor.invalidate();
    assert_eq!(*extractor.columns(&definition, 0), vec!["only".to_string()]);
}
