use chrono::{DateTime, Duration, Local, TimeZone};
use std::path::Path;

use loglens::comparator::{ComparisonRecord, ComparisonSummary, compare_stores};
use loglens::parser::{LogLevel, LogRecord, LogStore};

fn base_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Build a store whose records sit at the given millisecond offsets.
fn store_of(file_name: &str, records: &[(i64, &str)]) -> LogStore {
    let mut store = LogStore::new();
    let source = store.add_source(Path::new(file_name));
    for (offset_ms, message) in records {
        store.push(LogRecord {
            timestamp: base_time() + Duration::milliseconds(*offset_ms),
            level: LogLevel::new("INFO"),
            thread: "main".to_string(),
            source,
            logger: "app".to_string(),
            message: message.to_string(),
            artifacts: None,
            fields: Vec::new(),
        });
    }
    store
}

fn kinds(results: &[ComparisonRecord]) -> Vec<&'static str> {
    results
        .iter()
        .map(|row| {
            if row.is_pair() {
                "pair"
            } else if row.is_left_only() {
                "left"
            } else {
                "right"
            }
        })
        .collect()
}

fn assert_bounds(results: &[ComparisonRecord], len_a: usize, len_b: usize) {
    assert!(results.iter().all(|row| row.left().is_some() || row.right().is_some()));
    assert!(results.len() >= len_a.max(len_b));
    assert!(results.len() <= len_a + len_b);
}

// The literal scenario from the alignment design: two four-record streams
// where the middle two messages drifted textually beyond numeric noise.
#[test]
fn drifted_middle_records_stay_unmatched() {
    let left = store_of(
        "run1.log",
        &[
            (0, "Starting pipeline"),
            (122, "Loading configuration"),
            (1375, "Connected to broker"),
            (1464, "Pipeline finished"),
        ],
    );
    let right = store_of(
        "run2.log",
        &[
            (0, "Starting pipeline"),
            (122, "Loading configuration for Second Profile"),
            (375, "Connected to broker for Second Profile"),
            (464, "Pipeline finished"),
        ],
    );

    let results = compare_stores(&left, &right);

    assert_eq!(
        kinds(&results),
        vec!["pair", "left", "left", "right", "right", "pair"]
    );
    assert_eq!(results[0].left().unwrap().message, "Starting pipeline");
    assert_eq!(results[1].left().unwrap().message, "Loading configuration");
    assert_eq!(results[2].left().unwrap().message, "Connected to broker");
    assert_eq!(
        results[3].right().unwrap().message,
        "Loading configuration for Second Profile"
    );
    assert_eq!(
        results[4].right().unwrap().message,
        "Connected to broker for Second Profile"
    );
    assert_eq!(results[5].right().unwrap().message, "Pipeline finished");
    assert_bounds(&results, 4, 4);
}

// Numeric drift alone (ports, counters, embedded durations) must not
// break the pairing.
#[test]
fn numeric_noise_still_pairs() {
    let left = store_of(
        "run1.log",
        &[(0, "worker 3 bound to port 8080"), (100, "served 42 requests")],
    );
    let right = store_of(
        "run2.log",
        &[(0, "worker 7 bound to port 9090"), (95, "served 1375 requests")],
    );

    let results = compare_stores(&left, &right);
    assert_eq!(kinds(&results), vec!["pair", "pair"]);
}

// Three against two, with the second stream's last record identical to a
// later first-stream record: both pair, the trailing record is left-only.
#[test]
fn shorter_second_stream_leaves_trailing_left_only() {
    let left = store_of(
        "run1.log",
        &[(0, "session opened"), (50, "cache warmed"), (100, "session closed")],
    );
    let right = store_of("run2.log", &[(0, "session opened"), (55, "cache warmed")]);

    let results = compare_stores(&left, &right);

    assert_eq!(kinds(&results), vec!["pair", "pair", "left"]);
    assert_eq!(results[2].left().unwrap().message, "session closed");
    assert_bounds(&results, 3, 2);
}

// A matching record beyond the lookahead window is not found; the scan
// gives up rather than searching the whole stream.
#[test]
fn lookahead_window_bounds_the_scan() {
    let left = store_of("run1.log", &[(0, "checkpoint"), (100, "shutdown")]);
    let right = store_of("run2.log", &[(0, "unrelated noise"), (700, "checkpoint")]);

    let results = compare_stores(&left, &right);

    // gap to the next left record is 100ms; 700ms exceeds 100 + 500.
    assert_eq!(kinds(&results), vec!["left", "left", "right", "right"]);
    assert_bounds(&results, 2, 2);
}

#[test]
fn fully_disjoint_streams_produce_maximal_output() {
    let left = store_of("run1.log", &[(0, "alpha"), (10, "beta")]);
    let right = store_of("run2.log", &[(0, "gamma"), (10, "delta")]);

    let results = compare_stores(&left, &right);
    assert_eq!(results.len(), 4);
    assert_bounds(&results, 2, 2);

    let summary = ComparisonSummary::of(&results);
    assert_eq!(summary.paired, 0);
    assert_eq!(summary.left_only, 2);
    assert_eq!(summary.right_only, 2);
}

#[test]
fn empty_streams_compare_cleanly() {
    let left = store_of("run1.log", &[]);
    let right = store_of("run2.log", &[(0, "only here")]);

    let results = compare_stores(&left, &right);
    assert_eq!(kinds(&results), vec!["right"]);

    let results = compare_stores(&left, &store_of("run3.log", &[]));
    assert!(results.is_empty());
}
