//! Mask-pattern compilation
//!
//! A line format can be authored as a mask, a plain string with `%{name}`
//! placeholders, instead of a raw regular expression:
//!
//! ```text
//! %{datetime} \[%{level}\] \[%{thread}\] %{logger}: %{message}
//! ```
//!
//! Each placeholder becomes a named capture group; the inner pattern for a
//! group comes from a field handler, falling back to `.+`. Literal spaces
//! outside groups are rewritten to `\s` since log lines often pad columns
//! with variable whitespace. Everything else passes through verbatim, so
//! literal regex metacharacters in the mask must be escaped by the author.

use regex::Regex;
use tracing::warn;

/// Compile a `%{name}` mask into a named-group regular expression.
///
/// Returns `None` (after a logged warning) for a malformed mask: a group
/// containing a space, an unterminated `%{`, or a mask that assembles into
/// an invalid regex. Callers must treat `None` as "no usable pattern".
pub fn compile_mask_pattern<F>(pattern: &str, field_handler: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                match c {
                    '}' => {
                        closed = true;
                        break;
                    }
                    ' ' => {
                        warn!(pattern, "mask group name contains a space");
                        return None;
                    }
                    other => name.push(other),
                }
            }
            if !closed {
                warn!(pattern, "unterminated %{{ group in mask pattern");
                return None;
            }
            let inner = field_handler(&name).unwrap_or_else(|| ".+".to_string());
            out.push_str("(?<");
            out.push_str(&name);
            out.push('>');
            out.push_str(&inner);
            out.push(')');
        } else if c == ' ' {
            out.push_str("\\s");
        } else {
            out.push(c);
        }
    }

    match Regex::new(&out) {
        Ok(_) => Some(out),
        Err(err) => {
            warn!(%err, pattern, "mask assembled into an invalid regular expression");
            None
        }
    }
}

/// Derive the `datetime` group's regex from a date/time format string.
///
/// Every format letter matches one digit; spaces match any whitespace;
/// separators pass through verbatim. `"yyyy-MM-dd HH:mm:ss.fff"` becomes
/// `\d\d\d\d-\d\d-\d\d\s\d\d:\d\d:\d\d.\d\d\d`.
pub fn datetime_mask(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    for c in format.chars() {
        if c.is_ascii_alphabetic() {
            out.push_str("\\d");
        } else if c == ' ' {
            out.push_str("\\s");
        } else {
            out.push(c);
        }
    }
    out
}

/// Translate a letter-based date/time format into a chrono format string
/// so the same profile field drives both the regex and timestamp parsing.
pub fn to_chrono_format(format: &str) -> String {
    let bytes = format.as_bytes();
    let mut out = String::with_capacity(format.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && bytes[i] as char == c {
                i += 1;
            }
            let run = i - start;
            match (c, run) {
                ('y', 2) => out.push_str("%y"),
                ('y', _) => out.push_str("%Y"),
                ('M', _) => out.push_str("%m"),
                ('d', _) => out.push_str("%d"),
                ('H', _) => out.push_str("%H"),
                ('m', _) => out.push_str("%M"),
                ('s', _) => out.push_str("%S"),
                ('f', 3) => out.push_str("%3f"),
                ('f', 6) => out.push_str("%6f"),
                ('f', 9) => out.push_str("%9f"),
                ('f', _) => out.push_str("%f"),
                // Unrecognized letters are kept as literal text.
                _ => {
                    for _ in 0..run {
                        out.push(c);
                    }
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(name: &str) -> Option<String> {
        match name {
            "level" => Some("[A-Z]+".to_string()),
            "message" => Some(".+".to_string()),
            _ => None,
        }
    }

    #[test]
    fn compiles_groups_and_rewrites_spaces() {
        let compiled = compile_mask_pattern("%{level} %{message}", handler).unwrap();
        assert_eq!(compiled, r"(?<level>[A-Z]+)\s(?<message>.+)");
    }

    #[test]
    fn unknown_field_defaults_to_greedy() {
        let compiled = compile_mask_pattern("%{thread}", handler).unwrap();
        assert_eq!(compiled, r"(?<thread>.+)");
    }

    #[test]
    fn unterminated_group_is_rejected() {
        assert_eq!(compile_mask_pattern("%{level", handler), None);
    }

    #[test]
    fn space_inside_group_is_rejected() {
        assert_eq!(compile_mask_pattern("%{log level}", handler), None);
    }

    #[test]
    fn invalid_assembled_regex_is_rejected() {
        // An unescaped '[' outside a group makes the final pattern invalid.
        assert_eq!(compile_mask_pattern("[%{level}", handler), None);
    }

    #[test]
    fn datetime_mask_maps_letters_to_digits() {
        assert_eq!(
            datetime_mask("yyyy-MM-dd HH:mm:ss.fff"),
            r"\d\d\d\d-\d\d-\d\d\s\d\d:\d\d:\d\d.\d\d\d"
        );
    }

    #[test]
    fn chrono_format_translation() {
        assert_eq!(
            to_chrono_format("yyyy-MM-dd HH:mm:ss.fff"),
            "%Y-%m-%d %H:%M:%S.%3f"
        );
        assert_eq!(to_chrono_format("yy/MM/dd"), "%y/%m/%d");
    }
}
