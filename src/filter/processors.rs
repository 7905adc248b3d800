//! One stateless evaluator per filter variant.
//!
//! Evaluators are safe for concurrent use: the only shared state is the
//! compiled-regex cache, keyed by pattern text and case-sensitivity so the
//! same `Regex` serves every reader.

use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use super::{CombineMode, FieldFilter, Filter, FilterGroup, FilterKind, MessageFilter};
use crate::parser::{LogRecord, LogStore};

static MESSAGE_REGEX_CACHE: LazyLock<RwLock<HashMap<(String, bool), Option<Arc<Regex>>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Get-or-insert a compiled message regex. A pattern that fails to compile
/// is cached as a permanent non-match and warned about once.
pub(crate) fn cached_regex(pattern: &str, case_sensitive: bool) -> Option<Arc<Regex>> {
    let key = (pattern.to_string(), case_sensitive);
    if let Some(entry) = MESSAGE_REGEX_CACHE.read().get(&key) {
        return entry.clone();
    }

    let entry = match RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(regex) => Some(Arc::new(regex)),
        Err(err) => {
            warn!(%err, pattern, "message filter regex failed to compile");
            None
        }
    };
    MESSAGE_REGEX_CACHE.write().entry(key).or_insert(entry).clone()
}

/// Evaluate one filter against one record; `filter.exclude` inverts the
/// variant's result.
pub fn is_match(filter: &Filter, record: &LogRecord, store: &LogStore) -> bool {
    let matched = match &filter.kind {
        FilterKind::Message(f) => message_matches(f, record),
        FilterKind::LogLevels(f) => f.contains(&record.level.name),
        FilterKind::LogSeverities(f) => f.severities.contains(&record.level.severity),
        FilterKind::Threads(f) => f.contains(&record.thread),
        FilterKind::Loggers(f) => f.contains(&record.logger),
        FilterKind::Field(f) => field_matches(f, record, store),
        FilterKind::Files(f) => f.contains(&store.source(record.source).display_name),
        FilterKind::TimeRange(f) => f.contains(record.timestamp),
        FilterKind::TimeAgo(f) => chrono::Local::now() - record.timestamp < f.max_age,
        FilterKind::Group(group) => group_matches(group, record, store),
    };
    matched != filter.exclude
}

fn message_matches(filter: &MessageFilter, record: &LogRecord) -> bool {
    if text_matches(filter, &record.message) {
        return true;
    }
    if filter.include_artifacts {
        if let Some(artifacts) = &record.artifacts {
            return text_matches(filter, artifacts);
        }
    }
    false
}

fn text_matches(filter: &MessageFilter, text: &str) -> bool {
    if filter.use_regex {
        match cached_regex(&filter.pattern, filter.case_sensitive) {
            Some(regex) => regex.is_match(text),
            None => false,
        }
    } else if filter.case_sensitive {
        text.contains(&filter.pattern)
    } else {
        text.to_lowercase().contains(&filter.pattern.to_lowercase())
    }
}

fn field_matches(filter: &FieldFilter, record: &LogRecord, store: &LogStore) -> bool {
    let Some(field) = store.lookup_field(&filter.field) else {
        return false;
    };
    match store.field_value(record, field) {
        Some(value) => filter.values.contains(value),
        None => false,
    }
}

fn group_matches(group: &FilterGroup, record: &LogRecord, store: &LogStore) -> bool {
    if group.filters.is_empty() {
        return true;
    }
    match group.mode {
        CombineMode::All => group
            .filters
            .iter()
            .all(|filter| is_match(filter, record, store)),
        CombineMode::Any => group
            .filters
            .iter()
            .any(|filter| is_match(filter, record, store)),
    }
}
