use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use crate::pattern;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A loaded format profile: how lines are shaped, how timestamps read,
/// and which message-column extractions are available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub format: FormatProfile,
    #[serde(rename = "extraction")]
    pub extractions: Vec<ExtractionDefinition>,
    /// Bumped on every (re)load; caches keyed on extraction definitions
    /// validate against this id instead of subscribing to change events.
    #[serde(skip)]
    pub generation: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            format: FormatProfile::default(),
            extractions: Vec::new(),
            generation: 0,
        }
    }
}

impl InspectorConfig {
    pub fn extraction(&self, id: &str) -> Option<&ExtractionDefinition> {
        self.extractions.iter().find(|def| def.id == id)
    }

    /// Replace this config with a freshly loaded one, advancing the
    /// generation so extraction caches drop their stale entries.
    pub fn reload(&mut self, path: &Path) -> Result<(), ConfigError> {
        let mut next = load_config_from_path(path)?;
        next.generation = self.generation + 1;
        *self = next;
        Ok(())
    }
}

/// Line-format half of a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatProfile {
    /// `%{name}` mask describing one log line.
    pub mask: String,
    /// Raw regex alternative; takes precedence over `mask` when non-empty.
    pub line_regex: String,
    /// Letter-based date/time format, e.g. "yyyy-MM-dd HH:mm:ss.fff".
    pub datetime_format: String,
    /// Per-placeholder regex overrides for mask groups.
    pub field_patterns: BTreeMap<String, String>,
}

impl Default for FormatProfile {
    fn default() -> Self {
        Self {
            mask: r"%{datetime} \[%{level}\] \[%{thread}\] %{logger}: %{message}".to_string(),
            line_regex: String::new(),
            datetime_format: "yyyy-MM-dd HH:mm:ss.fff".to_string(),
            field_patterns: BTreeMap::new(),
        }
    }
}

impl FormatProfile {
    /// The substitution rule for one mask placeholder. Overrides win;
    /// `datetime` derives from the datetime format, `message` is greedy;
    /// anything else falls back to the compiler's default.
    pub fn field_pattern(&self, name: &str) -> Option<String> {
        if let Some(pattern) = self.field_patterns.get(name) {
            return Some(pattern.clone());
        }
        match name {
            "datetime" => Some(pattern::datetime_mask(&self.datetime_format)),
            "message" => Some(".+".to_string()),
            _ => None,
        }
    }

    /// The final line regex, or `None` when the mask is unusable.
    pub fn line_pattern(&self) -> Option<String> {
        if !self.line_regex.is_empty() {
            return Some(self.line_regex.clone());
        }
        pattern::compile_mask_pattern(&self.mask, |name| self.field_pattern(name))
    }
}

/// How a message-column extraction runs. Config files naming a method
/// this enum does not carry are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    #[default]
    Regex,
}

/// A user-defined message-column extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDefinition {
    pub id: String,
    #[serde(default)]
    pub method: ExtractionMethod,
    /// Named-group regex; group names become column names.
    pub pattern: String,
}

pub fn load_config(path: Option<&Path>) -> Result<InspectorConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<InspectorConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<InspectorConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static InspectorConfig {
    static DEFAULT_CONFIG: LazyLock<InspectorConfig> = LazyLock::new(InspectorConfig::default);
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_compiles_to_a_usable_pattern() {
        let profile = FormatProfile::default();
        let pattern = profile.line_pattern().expect("default mask must compile");
        assert!(pattern.contains("(?<datetime>"));
        assert!(pattern.contains("(?<message>.+)"));
    }

    #[test]
    fn raw_regex_takes_precedence_over_mask() {
        let profile = FormatProfile {
            line_regex: r"(?<datetime>\d+) (?<message>.+)".to_string(),
            ..FormatProfile::default()
        };
        assert_eq!(
            profile.line_pattern().as_deref(),
            Some(r"(?<datetime>\d+) (?<message>.+)")
        );
    }

    #[test]
    fn unknown_extraction_method_is_rejected_at_parse() {
        let raw = r#"
            profile_name = "broken"

            [[extraction]]
            id = "ids"
            method = "xpath"
            pattern = "x"
        "#;
        assert!(toml::from_str::<InspectorConfig>(raw).is_err());
    }
}
