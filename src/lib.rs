pub mod cli;
pub mod columns;
pub mod comparator;
pub mod config;
pub mod filter;
pub mod loader;
pub mod matcher;
pub mod parser;
pub mod pattern;

pub use cli::{Cli, Commands, OutputFormat, cli_parse};
pub use comparator::{
    CompareError, ComparisonRecord, ComparisonSummary, compare_files, compare_stores,
};
pub use config::{InspectorConfig, load_config};
pub use matcher::{MatchContext, MessageSearch, context_from_expression};
pub use parser::{LineParser, LogLevel, LogRecord, LogStore, ParsedLine, Severity};
pub use pattern::compile_mask_pattern;

use colored::{ColoredString, Colorize};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use indicatif::ProgressBar;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use crate::columns::ColumnExtractor;
use crate::filter::{CombineMode, FilterExpression};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the match context from the global --filter expression
fn build_context(
    filter_expr: &Option<String>,
    any: bool,
) -> Result<Option<MatchContext>, Box<dyn std::error::Error>> {
    let Some(expr_str) = filter_expr else {
        return Ok(None);
    };
    let expr = FilterExpression::parse(expr_str)
        .map_err(|e| format!("Invalid filter expression: {}", e))?;
    let mode = if any { CombineMode::Any } else { CombineMode::All };
    let context = matcher::context_from_expression(&expr, mode)
        .map_err(|e| format!("Invalid filter expression: {}", e))?;
    Ok(Some(context))
}

fn loading_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn load_store(path: &Path, config: &InspectorConfig) -> Result<LogStore, Box<dyn std::error::Error>> {
    let spinner = loading_spinner(format!("Loading {}", path.display()));
    let mut store = LogStore::new();
    loader::load_log(path, config, &mut store)?;
    spinner.finish_and_clear();
    Ok(store)
}

fn list_preview(values: &BTreeSet<String>, max_items: usize) -> String {
    let mut preview: Vec<String> = values.iter().take(max_items).cloned().collect();
    if values.len() > max_items {
        preview.push(format!("... +{} more", values.len() - max_items));
    }
    preview.join(", ")
}

fn level_colored(level: &LogLevel) -> ColoredString {
    match level.severity {
        Severity::Critical | Severity::Error => level.name.red().bold(),
        Severity::Warning => level.name.yellow(),
        Severity::Debug | Severity::Trace => level.name.dimmed(),
        Severity::Info => level.name.normal(),
    }
}

fn print_record(record: &LogRecord) {
    let mut line = format!(
        "{} [{}]",
        record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_colored(&record.level)
    );
    if !record.thread.is_empty() {
        line.push_str(&format!(" [{}]", record.thread));
    }
    if !record.logger.is_empty() {
        line.push_str(&format!(" {}:", record.logger));
    }
    line.push(' ');
    line.push_str(&record.message);
    println!("{line}");

    if let Some(artifacts) = &record.artifacts {
        for artifact_line in artifacts.lines() {
            println!("    {}", artifact_line.dimmed());
        }
    }
}

fn print_summary(store: &LogStore, context: Option<&MatchContext>) {
    let mut level_counts: BTreeMap<String, (Severity, usize)> = BTreeMap::new();
    let mut threads = BTreeSet::new();
    let mut loggers = BTreeSet::new();
    let mut matched = 0usize;

    for record in store.records() {
        if !matcher::is_match(context, record, store) {
            continue;
        }
        matched += 1;
        let entry = level_counts
            .entry(record.level.name.clone())
            .or_insert((record.level.severity, 0));
        entry.1 += 1;
        if !record.thread.is_empty() {
            threads.insert(record.thread.clone());
        }
        if !record.logger.is_empty() {
            loggers.insert(record.logger.clone());
        }
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["level", "severity", "records"]);
    for (name, (severity, count)) in &level_counts {
        table.add_row(vec![name.clone(), severity.to_string(), count.to_string()]);
    }
    println!("{table}");

    if !threads.is_empty() {
        println!("\nThreads ({}): {}", threads.len(), list_preview(&threads, 8));
    }
    if !loggers.is_empty() {
        println!("Loggers ({}): {}", loggers.len(), list_preview(&loggers, 8));
    }

    println!("\nSources:");
    for source in store.sources() {
        println!("  - {}", source.display_name);
    }
    if !store.field_names().is_empty() {
        println!("Fields: {}", store.field_names().join(", "));
    }
    println!("\nTotal log records: {} ({} matching)", store.len(), matched);
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = cli_parse();
    let config = load_config(cli.config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;
    let context = build_context(&cli.filter, cli.any)?;

    match &cli.command {
        Commands::Compare {
            file1,
            file2,
            diff_only,
            format,
        } => {
            let spinner = loading_spinner(format!(
                "Comparing {} with {}",
                file1.display(),
                file2.display()
            ));
            let results = compare_files(file1, file2, &config)?;
            spinner.finish_and_clear();

            match format {
                OutputFormat::Text => {
                    comparator::display_comparison(&results, *diff_only);
                    println!("{}", comparator::summary_table(&results));
                }
                OutputFormat::Json => {
                    println!("{}", comparator::comparison_json(&results));
                }
            }
        }
        Commands::Show { file, limit } => {
            let store = load_store(file, &config)?;
            let mut shown = 0usize;
            for record in store.records() {
                if !matcher::is_match(context.as_ref(), record, &store) {
                    continue;
                }
                print_record(record);
                shown += 1;
                if limit.is_some_and(|limit| shown >= limit) {
                    break;
                }
            }
            println!("\n{} of {} records shown", shown, store.len());
        }
        Commands::Info { file } => {
            let store = load_store(file, &config)?;
            print_summary(&store, context.as_ref());
        }
        Commands::Columns { file, definition } => {
            let Some(def) = config.extraction(definition) else {
                let available: Vec<&str> = config
                    .extractions
                    .iter()
                    .map(|def| def.id.as_str())
                    .collect();
                return Err(format!(
                    "Unknown extraction definition '{}'. Available: {}",
                    definition,
                    if available.is_empty() {
                        "none".to_string()
                    } else {
                        available.join(", ")
                    }
                )
                .into());
            };

            let store = load_store(file, &config)?;
            let extractor = ColumnExtractor::new();
            let column_names = extractor.columns(def, config.generation);

            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            let mut header = vec!["timestamp".to_string()];
            header.extend(column_names.iter().cloned());
            table.set_header(header);

            for record in store.records() {
                if !matcher::is_match(context.as_ref(), record, &store) {
                    continue;
                }
                let mut row = vec![record.timestamp.format("%H:%M:%S%.3f").to_string()];
                row.extend(extractor.extract(def, config.generation, record));
                table.add_row(row);
            }
            println!("{table}");
        }
    }

    Ok(())
}
