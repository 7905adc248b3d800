use colored::Colorize;
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use serde_json::{Value, json};
use similar::{ChangeTag, TextDiff};

use super::{ComparisonRecord, ComparisonSummary};
use crate::parser::LogRecord;

/// Print comparison rows: `=` for pairs, `<` for records only in the
/// first stream, `>` for records only in the second. Paired records whose
/// message text still differs (numeric drift) get an inline word diff.
pub fn display_comparison(results: &[ComparisonRecord], diff_only: bool) {
    for row in results {
        match (row.left(), row.right()) {
            (Some(left), Some(right)) => {
                if diff_only {
                    continue;
                }
                println!("= {}", format_record(left));
                if left.message != right.message {
                    println!("  {}", message_diff(&left.message, &right.message));
                }
            }
            (Some(left), None) => {
                println!("{} {}", "<".cyan().bold(), format_record(left).cyan());
            }
            (None, Some(right)) => {
                println!("{} {}", ">".magenta().bold(), format_record(right).magenta());
            }
            (None, None) => unreachable!("comparison row with no record"),
        }
    }
}

/// Summary counts as a console table.
pub fn summary_table(results: &[ComparisonRecord]) -> Table {
    let summary = ComparisonSummary::of(results);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["", "records"]);
    table.add_row(vec!["matched pairs".to_string(), summary.paired.to_string()]);
    table.add_row(vec![
        "only in first".to_string(),
        summary.left_only.to_string(),
    ]);
    table.add_row(vec![
        "only in second".to_string(),
        summary.right_only.to_string(),
    ]);
    table.add_row(vec!["total rows".to_string(), summary.total().to_string()]);
    table
}

/// Machine-readable rendition of a finished comparison.
pub fn comparison_json(results: &[ComparisonRecord]) -> String {
    let summary = ComparisonSummary::of(results);
    let rows: Vec<Value> = results
        .iter()
        .map(|row| {
            let kind = if row.is_pair() {
                "pair"
            } else if row.is_left_only() {
                "left_only"
            } else {
                "right_only"
            };
            json!({
                "kind": kind,
                "left": row.left().map(record_json),
                "right": row.right().map(record_json),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "comparison": {
            "paired": summary.paired,
            "left_only": summary.left_only,
            "right_only": summary.right_only,
            "rows": rows,
        }
    }))
    .unwrap_or_else(|_| "{\"comparison\":{\"error\":\"failed to serialize comparison\"}}".into())
}

fn record_json(record: &LogRecord) -> Value {
    json!({
        "timestamp": record.timestamp.to_rfc3339(),
        "level": record.level.name,
        "message": record.message,
    })
}

fn format_record(record: &LogRecord) -> String {
    format!(
        "{} [{}] {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level.name,
        record.message
    )
}

fn message_diff(left: &str, right: &str) -> String {
    let diff = TextDiff::from_words(left, right);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => out.push_str(&change.value().red().strikethrough().to_string()),
            ChangeTag::Insert => out.push_str(&change.value().green().to_string()),
            ChangeTag::Equal => out.push_str(change.value()),
        }
    }
    out
}
