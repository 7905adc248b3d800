//! File loading
//!
//! Turns a log file into records inside a [`LogStore`]. Lines that do not
//! match the line pattern are treated as continuations of the previous
//! record and accumulate into its artifacts text (stack traces, wrapped
//! payloads); unmatched lines before the first record are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::InspectorConfig;
use crate::parser::{LineParser, LogStore, ParserError, SourceId};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read log file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Profile '{0}' has no usable line pattern")]
    UnusablePattern(String),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Load one file into `store` under the profile's line format, returning
/// the registered source id.
pub fn load_log(
    path: &Path,
    config: &InspectorConfig,
    store: &mut LogStore,
) -> Result<SourceId, LoadError> {
    let pattern = config
        .format
        .line_pattern()
        .ok_or_else(|| LoadError::UnusablePattern(config.profile_name.clone()))?;
    let parser = LineParser::new(&pattern, &config.format.datetime_format)?;

    let read_error = |source| LoadError::Read {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    let reader = BufReader::new(file);

    let source = store.add_source(path);
    let mut current: Option<usize> = None;
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line.map_err(read_error)?;
        match parser.parse(&line) {
            Some(parsed) => match parser.build_record(parsed, source, store) {
                Some(record) => current = Some(store.push(record)),
                // Matched the pattern but the timestamp text does not
                // parse under the profile's datetime format.
                None => skipped += 1,
            },
            None => match current {
                Some(index) => store.append_artifacts(index, &line),
                None => skipped += 1,
            },
        }
    }

    if skipped > 0 {
        debug!(skipped, path = %path.display(), "lines did not match the line pattern");
    }

    Ok(source)
}
