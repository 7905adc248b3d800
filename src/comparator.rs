//! Two-stream comparison
//!
//! Pairs semantically equivalent records from two independently loaded log
//! sets. Identity is a content hash over the digit/punctuation-stripped
//! source name, the level name and the equally stripped message, so
//! counters, ports and embedded timestamps that differ between two runs of
//! the same process do not break the pairing. Alignment is a greedy
//! forward scan bounded by a fixed lookahead window; it trades the global
//! optimum for a single pass over both streams, which is adequate when the
//! streams are mostly chronologically synchronized captures of the same
//! run.

mod display;
mod entities;

pub use display::{comparison_json, display_comparison, summary_table};
pub use entities::{CompareError, ComparisonRecord, ComparisonSummary};

use chrono::Duration;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::thread;

use crate::config::InspectorConfig;
use crate::loader;
use crate::parser::LogStore;
use entities::HashedRecord;

/// How far past the expected gap the scan looks ahead in the second
/// stream before giving up on a match.
const LOOKAHEAD_MS: i64 = 500;

/// Load both files concurrently and align them. Either load failing
/// aborts the whole comparison; no partial diff is produced.
pub fn compare_files(
    path1: &Path,
    path2: &Path,
    config: &InspectorConfig,
) -> Result<Vec<ComparisonRecord>, CompareError> {
    let (first, second) = thread::scope(|scope| {
        let first = scope.spawn(|| {
            let mut store = LogStore::new();
            loader::load_log(path1, config, &mut store).map(|_| store)
        });
        let second = scope.spawn(|| {
            let mut store = LogStore::new();
            loader::load_log(path2, config, &mut store).map(|_| store)
        });
        (join_load(first), join_load(second))
    });

    let store1 = first.map_err(|source| CompareError::Load {
        path: path1.display().to_string(),
        source,
    })?;
    let store2 = second.map_err(|source| CompareError::Load {
        path: path2.display().to_string(),
        source,
    })?;

    Ok(compare_stores(&store1, &store2))
}

fn join_load(
    handle: thread::ScopedJoinHandle<'_, Result<LogStore, loader::LoadError>>,
) -> Result<LogStore, loader::LoadError> {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Align two fully loaded stores into an ordered list of matched and
/// unmatched rows.
pub fn compare_stores(store1: &LogStore, store2: &LogStore) -> Vec<ComparisonRecord> {
    let left = hash_records(store1);
    let right = hash_records(store2);
    align(&left, &right)
}

/// Greedy forward alignment: single pass, no backtracking. A record in
/// the first stream that would pair better with a second-stream record
/// the scan already skipped stays unmatched; that limitation is inherited
/// deliberately.
fn align(left: &[HashedRecord], right: &[HashedRecord]) -> Vec<ComparisonRecord> {
    let lookahead = Duration::milliseconds(LOOKAHEAD_MS);
    let mut results = Vec::new();
    let mut j = 0usize;

    for (i, candidate) in left.iter().enumerate() {
        let gap_left = match left.get(i + 1) {
            Some(next) => next.record.timestamp - candidate.record.timestamp,
            None => Duration::zero(),
        };

        let mut matched = false;
        for k in j..right.len() {
            let gap_right = right[k].record.timestamp - right[j].record.timestamp;
            if gap_right > gap_left + lookahead {
                break;
            }
            if right[k].hash == candidate.hash {
                for skipped in &right[j..k] {
                    results.push(ComparisonRecord::right_only(skipped.record.clone()));
                }
                results.push(ComparisonRecord::pair(
                    candidate.record.clone(),
                    right[k].record.clone(),
                ));
                j = k + 1;
                matched = true;
                break;
            }
        }

        if !matched {
            results.push(ComparisonRecord::left_only(candidate.record.clone()));
        }
    }

    for remaining in &right[j..] {
        results.push(ComparisonRecord::right_only(remaining.record.clone()));
    }

    results
}

fn hash_records(store: &LogStore) -> Vec<HashedRecord> {
    store
        .records()
        .iter()
        .map(|record| {
            let source = strip_volatile(&store.source(record.source).display_name);
            let message = strip_volatile(&record.message);
            let mut hasher = DefaultHasher::new();
            source.hash(&mut hasher);
            record.level.name.hash(&mut hasher);
            message.hash(&mut hasher);
            HashedRecord {
                record: record.clone(),
                hash: hasher.finish(),
            }
        })
        .collect()
}

/// Drop digits and every non-word character, keeping only letters and
/// underscores, so numeric noise embedded in messages does not change
/// record identity.
fn strip_volatile(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphabetic() || *c == '_')
        .collect()
}
