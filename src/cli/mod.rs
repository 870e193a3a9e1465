//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::views::ViewKind;
use crate::views::descriptor::DEFAULT_HISTOGRAM_BINS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesboard", version, about = "Sales analytics dashboard over sample CSV exports")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the sales data comes from. Later options win: `--url`/`--remote`,
/// then `--file`, then `--data-dir`.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Directory holding the sample parts.
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Explicit source file (repeatable, read in order).
    #[arg(long = "file", global = true, value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Remote source URL (repeatable, read in order).
    #[arg(long = "url", global = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Read source URLs from SALESBOARD_REMOTE_URLS (comma-separated; `.env` honored).
    #[arg(long, global = true)]
    pub remote: bool,

    /// Histogram bins for the sales distribution.
    #[arg(long, global = true, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dataset summary and column diagnostics.
    Summary,
    /// Global page: stores per state, top families, seasonality, distribution, promotions.
    Global,
    /// Store page (defaults to the first store).
    Store(StoreArgs),
    /// State page (defaults to the first state).
    State(StateArgs),
    /// Advanced page: trend, store comparison, promotion impact, insights.
    Advanced(AdvancedArgs),
    /// Run a single view, optionally exporting it (CSV or JSON by extension).
    View(ViewArgs),
    /// Write a synthetic two-part sample dataset.
    Demo(DemoArgs),
    /// Launch the interactive TUI.
    Tui,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Store number.
    #[arg(long)]
    pub id: Option<i64>,
}

#[derive(Debug, Args, Clone)]
pub struct StateArgs {
    /// State name (exact match).
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct AdvancedArgs {
    /// Stores to compare (comma-separated, at most 5 are used).
    #[arg(long, value_delimiter = ',')]
    pub compare: Vec<i64>,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Which view to run.
    #[arg(value_enum)]
    pub kind: ViewKind,

    /// Store for `store-detail`.
    #[arg(long)]
    pub store: Option<i64>,

    /// State for `state-detail`.
    #[arg(long)]
    pub state: Option<String>,

    /// Stores for `store-comparison` (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub stores: Vec<i64>,

    /// Export the result; `.json` writes JSON, anything else CSV.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Output directory (created if missing).
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Total rows across both parts.
    #[arg(long, default_value_t = 2000)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_source_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "salesboard",
            "view",
            "store-comparison",
            "--stores",
            "1,2,3",
            "--file",
            "a.csv",
            "--file",
            "b.csv",
        ]);
        assert_eq!(cli.source.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        match cli.command {
            Command::View(args) => {
                assert_eq!(args.kind, ViewKind::StoreComparison);
                assert_eq!(args.stores, vec![1, 2, 3]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["salesboard", "summary"]);
        assert_eq!(cli.source.data_dir, PathBuf::from("."));
        assert_eq!(cli.source.bins, DEFAULT_HISTOGRAM_BINS);
        assert!(!cli.source.remote);
    }
}
