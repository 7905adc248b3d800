use thiserror::Error;

use crate::loader::LoadError;
use crate::parser::LogRecord;

/// Error types for comparison operations
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Could not load '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
}

/// One row of a two-stream diff. At least one side is always present;
/// the private fields keep the constructors the only way in.
#[derive(Debug, Clone)]
pub struct ComparisonRecord {
    left: Option<LogRecord>,
    right: Option<LogRecord>,
}

impl ComparisonRecord {
    pub fn pair(left: LogRecord, right: LogRecord) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn left_only(left: LogRecord) -> Self {
        Self {
            left: Some(left),
            right: None,
        }
    }

    pub fn right_only(right: LogRecord) -> Self {
        Self {
            left: None,
            right: Some(right),
        }
    }

    pub fn left(&self) -> Option<&LogRecord> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&LogRecord> {
        self.right.as_ref()
    }

    pub fn is_pair(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn is_left_only(&self) -> bool {
        self.right.is_none()
    }

    pub fn is_right_only(&self) -> bool {
        self.left.is_none()
    }
}

/// Comparison-internal record wrapper carrying the content hash.
#[derive(Debug, Clone)]
pub(crate) struct HashedRecord {
    pub record: LogRecord,
    pub hash: u64,
}

/// Counts over a finished comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub paired: usize,
    pub left_only: usize,
    pub right_only: usize,
}

impl ComparisonSummary {
    pub fn of(results: &[ComparisonRecord]) -> Self {
        let mut summary = Self::default();
        for row in results {
            if row.is_pair() {
                summary.paired += 1;
            } else if row.is_left_only() {
                summary.left_only += 1;
            } else {
                summary.right_only += 1;
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.paired + self.left_only + self.right_only
    }
}
