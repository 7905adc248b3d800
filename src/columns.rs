//! Message-column extraction
//!
//! An extraction definition turns free-form messages into named columns.
//! Column names come from scanning the definition's pattern text for
//! named-group syntax, so a column schema is available without ever
//! executing the regex. Compiled regexes and derived column lists are
//! cached per definition id; entries are validated against the config
//! generation so a profile reload drops stale state without any
//! subscription mechanism.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use crate::config::{ExtractionDefinition, ExtractionMethod};
use crate::parser::LogRecord;

static NAMED_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\?P?<([A-Za-z_][A-Za-z0-9_]*)>").expect("valid named group scanner")
});

#[derive(Clone)]
struct CacheEntry {
    generation: u64,
    regex: Option<Arc<Regex>>,
    columns: Arc<Vec<String>>,
}

/// Shared, concurrently readable extraction cache.
#[derive(Default)]
pub struct ColumnExtractor {
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl ColumnExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names of a definition, in pattern order.
    pub fn columns(&self, definition: &ExtractionDefinition, generation: u64) -> Arc<Vec<String>> {
        self.entry(definition, generation).columns
    }

    /// Column values for one record. Matches the message first, then the
    /// artifacts text; when both fail the record still yields one empty
    /// string per column.
    pub fn extract(
        &self,
        definition: &ExtractionDefinition,
        generation: u64,
        record: &LogRecord,
    ) -> Vec<String> {
        let entry = self.entry(definition, generation);
        let Some(regex) = entry.regex else {
            return vec![String::new(); entry.columns.len()];
        };

        let caps = regex.captures(&record.message).or_else(|| {
            record
                .artifacts
                .as_deref()
                .and_then(|artifacts| regex.captures(artifacts))
        });

        match caps {
            Some(caps) => entry
                .columns
                .iter()
                .map(|column| {
                    caps.name(column)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                })
                .collect(),
            None => vec![String::new(); entry.columns.len()],
        }
    }

    /// Drop every cached entry at once.
    pub fn invalidate(&self) {
        self.cache.write().clear();
    }

    fn entry(&self, definition: &ExtractionDefinition, generation: u64) -> CacheEntry {
        match definition.method {
            ExtractionMethod::Regex => {}
        }

        if let Some(entry) = self.cache.read().get(&definition.id) {
            if entry.generation == generation {
                return entry.clone();
            }
        }

        let columns = Arc::new(scan_columns(&definition.pattern));
        let regex = match Regex::new(&definition.pattern) {
            Ok(regex) => Some(Arc::new(regex)),
            Err(err) => {
                warn!(%err, id = %definition.id, "extraction pattern failed to compile");
                None
            }
        };
        let entry = CacheEntry {
            generation,
            regex,
            columns,
        };
        self.cache
            .write()
            .insert(definition.id.clone(), entry.clone());
        entry
    }
}

/// Collect named-group names from the pattern text, in order.
fn scan_columns(pattern: &str) -> Vec<String> {
    NAMED_GROUP_RE
        .captures_iter(pattern)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_column_names_without_executing() {
        let columns = scan_columns(r"user=(?<user>\w+).*took (?<elapsed>\d+)ms");
        assert_eq!(columns, vec!["user", "elapsed"]);
    }

    #[test]
    fn generation_bump_recompiles() {
        let extractor = ColumnExtractor::new();
        let mut definition = ExtractionDefinition {
            id: "timing".to_string(),
            method: ExtractionMethod::Regex,
            pattern: r"took (?<elapsed>\d+)ms".to_string(),
        };

        let columns = extractor.columns(&definition, 0);
        assert_eq!(*columns, vec!["elapsed".to_string()]);

        // Same generation: the stale pattern is served from cache.
        definition.pattern = r"user=(?<user>\w+)".to_string();
        assert_eq!(*extractor.columns(&definition, 0), vec!["elapsed".to_string()]);

        // New generation: the entry is rebuilt.
        assert_eq!(*extractor.columns(&definition, 1), vec!["user".to_string()]);
    }
}
