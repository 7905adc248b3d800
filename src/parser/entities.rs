use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity classification of a log level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Strict lookup of a severity by level name, covering the common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "VERBOSE" => Some(Severity::Trace),
            "DEBUG" | "DBG" => Some(Severity::Debug),
            "INFO" | "INFORMATION" => Some(Severity::Info),
            "WARN" | "WARNING" => Some(Severity::Warning),
            "ERROR" | "ERR" => Some(Severity::Error),
            "FATAL" | "CRITICAL" | "CRIT" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Lenient classification; unknown level names count as `Info`.
    pub fn classify(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

/// A log level as it appeared in the line, plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLevel {
    /// Display name exactly as captured (e.g. "WARN", "Error").
    pub name: String,
    pub severity: Severity,
}

impl LogLevel {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let severity = Severity::classify(&name);
        Self { name, severity }
    }
}

/// Index of a source file registered in a [`LogStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub usize);

/// Index into a store's field-name registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub usize);

/// Index into a store's shared field-value dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// A source file the store holds records from.
#[derive(Debug, Clone)]
pub struct LogSource {
    pub path: PathBuf,
    pub display_name: String,
}

/// Transient result of matching one raw line against the line pattern.
///
/// Consumed immediately to build a [`LogRecord`]; never persisted.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub timestamp: String,
    pub level: String,
    /// Remaining captured groups as (name, value), in capture order.
    pub fields: Vec<(String, String)>,
    pub message: String,
}

/// One structured log line. Immutable once its load completes.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub thread: String,
    pub source: SourceId,
    pub logger: String,
    pub message: String,
    /// Continuation lines attached to this record (stack traces etc.).
    pub artifacts: Option<String>,
    /// Per-field value indices into the owning store's dictionary.
    pub fields: Vec<(FieldId, ValueId)>,
}

/// Container owning a set of records plus the dictionaries they index into.
#[derive(Debug, Default)]
pub struct LogStore {
    sources: Vec<LogSource>,
    field_names: Vec<String>,
    field_index: HashMap<String, FieldId>,
    values: Vec<String>,
    value_index: HashMap<String, ValueId>,
    records: Vec<LogRecord>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, path: &Path) -> SourceId {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.sources.push(LogSource {
            path: path.to_path_buf(),
            display_name,
        });
        SourceId(self.sources.len() - 1)
    }

    /// A record carrying an unregistered id is an invariant violation,
    /// so lookups index directly and panic on a corrupt store.
    pub fn source(&self, id: SourceId) -> &LogSource {
        &self.sources[id.0]
    }

    pub fn sources(&self) -> &[LogSource] {
        &self.sources
    }

    pub fn field_id(&mut self, name: &str) -> FieldId {
        if let Some(id) = self.field_index.get(name) {
            return *id;
        }
        let id = FieldId(self.field_names.len());
        self.field_names.push(name.to_string());
        self.field_index.insert(name.to_string(), id);
        id
    }

    pub fn lookup_field(&self, name: &str) -> Option<FieldId> {
        self.field_index.get(name).copied()
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        &self.field_names[id.0]
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn intern_value(&mut self, value: &str) -> ValueId {
        if let Some(id) = self.value_index.get(value) {
            return *id;
        }
        let id = ValueId(self.values.len());
        self.values.push(value.to_string());
        self.value_index.insert(value.to_string(), id);
        id
    }

    pub fn value(&self, id: ValueId) -> &str {
        &self.values[id.0]
    }

    /// The record's value for the given field, if the record captured it.
    pub fn field_value(&self, record: &LogRecord, field: FieldId) -> Option<&str> {
        record
            .fields
            .iter()
            .find(|(id, _)| *id == field)
            .map(|(_, value)| self.value(*value))
    }

    pub fn push(&mut self, record: LogRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub(crate) fn append_artifacts(&mut self, index: usize, line: &str) {
        let artifacts = &mut self.records[index].artifacts;
        match artifacts {
            Some(text) => {
                text.push('\n');
                text.push_str(line);
            }
            None => *artifacts = Some(line.to_string()),
        }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
