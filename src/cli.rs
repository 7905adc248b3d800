use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect, filter and compare structured log files
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML format profile
    #[arg(short, long, global = true, env = "LOGLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Filter expression, e.g. "level:ERROR !text:timeout"
    #[arg(short, long, global = true)]
    pub filter: Option<String>,

    /// Combine filter terms with OR instead of AND
    #[arg(long, global = true)]
    pub any: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align two log files and show matched and unmatched records
    Compare {
        /// First log file
        file1: PathBuf,

        /// Second log file
        file2: PathBuf,

        /// Show only unmatched records
        #[arg(short, long)]
        diff_only: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print records matching the filter expression
    Show {
        /// Log file to read
        file: PathBuf,

        /// Stop after this many matching records
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Summarize levels, threads, loggers and sources in a log file
    Info {
        /// Log file to analyze
        file: PathBuf,
    },
    /// Run a message-column extraction definition over matching records
    Columns {
        /// Log file to read
        file: PathBuf,

        /// Extraction definition id from the profile
        #[arg(short, long)]
        definition: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
