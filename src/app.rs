//! Top-level application orchestration.
//!
//! The body of `main`:
//! - parses CLI arguments
//! - sets up logging
//! - loads the sales sources into a session
//! - runs pages/views and prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::app::pipeline::{Page, PageParams};
use crate::app::session::Session;
use crate::cli::{AdvancedArgs, Command, DemoArgs, SourceArgs, StateArgs, StoreArgs, ViewArgs};
use crate::data::{DemoConfig, RemoteClient};
use crate::domain::{CanonicalTable, DashboardConfig, SourceSpec};
use crate::error::{AppError, EXIT_DATA, EXIT_INPUT};
use crate::views::{ViewKind, ViewQuery};

pub mod pipeline;
pub mod session;

/// Entry point for the `salesboard` binary.
pub fn run() -> Result<(), AppError> {
    // `salesboard` and `salesboard --data-dir x` run the TUI; clap needs the
    // subcommand spelled out.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal, so it only logs warnings and up by default.
    let default_level = match cli.command {
        Command::Tui => LevelFilter::WARN,
        _ => LevelFilter::INFO,
    };
    init_tracing(default_level);

    let config = || dashboard_config_from_args(&cli.source);
    match cli.command {
        Command::Summary => handle_summary(&config()?),
        Command::Global => handle_page(&config()?, Page::Global, PageParams::default()),
        Command::Store(args) => handle_store(&config()?, args),
        Command::State(args) => handle_state(&config()?, args),
        Command::Advanced(args) => handle_advanced(&config()?, args),
        Command::View(args) => handle_view(&config()?, args),
        Command::Demo(args) => handle_demo(args),
        Command::Tui => crate::tui::run(config()?),
    }
}

fn init_tracing(default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    // Logs go to stderr so reports on stdout stay pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve the source options into a run configuration.
///
/// Remote URLs win over explicit files, which win over the data directory.
pub fn dashboard_config_from_args(args: &SourceArgs) -> Result<DashboardConfig, AppError> {
    let mut urls = Vec::new();
    if args.remote {
        urls.extend(RemoteClient::urls_from_env()?);
    }
    urls.extend(args.urls.iter().cloned());

    let source = if !urls.is_empty() {
        SourceSpec::Remote(urls)
    } else if !args.files.is_empty() {
        SourceSpec::Files(args.files.clone())
    } else {
        SourceSpec::directory(&args.data_dir)
    };

    if args.bins == 0 {
        return Err(AppError::new(EXIT_INPUT, "--bins must be > 0."));
    }

    Ok(DashboardConfig {
        source,
        histogram_bins: args.bins,
    })
}

/// Load the configured sources; a failed load is fatal for the CLI.
fn load(config: &DashboardConfig) -> Result<std::sync::Arc<CanonicalTable>, AppError> {
    let session = Session::open(&config.source);
    if let Some(err) = session.last_error() {
        eprint!("{}", crate::report::format_load_error(err));
        return Err(err.clone().into());
    }
    let table = session.snapshot();
    if table.is_empty() {
        return Err(AppError::new(EXIT_DATA, "Sources contain no rows."));
    }
    Ok(table)
}

fn handle_summary(config: &DashboardConfig) -> Result<(), AppError> {
    let table = load(config)?;
    println!("{}", crate::report::format_load_summary(&table.summary()));
    Ok(())
}

fn handle_page(config: &DashboardConfig, page: Page, params: PageParams) -> Result<(), AppError> {
    let table = load(config)?;
    let sections = pipeline::run_page(&table, page, &params, config.histogram_bins);
    println!("{}", crate::report::format_page(page.title(), &sections));
    Ok(())
}

fn handle_store(config: &DashboardConfig, args: StoreArgs) -> Result<(), AppError> {
    let params = PageParams {
        store: args.id,
        ..PageParams::default()
    };
    handle_page(config, Page::Store, params)
}

fn handle_state(config: &DashboardConfig, args: StateArgs) -> Result<(), AppError> {
    let params = PageParams {
        state: args.name,
        ..PageParams::default()
    };
    handle_page(config, Page::State, params)
}

fn handle_advanced(config: &DashboardConfig, args: AdvancedArgs) -> Result<(), AppError> {
    let params = PageParams {
        compare: args.compare,
        ..PageParams::default()
    };
    handle_page(config, Page::Advanced, params)
}

fn handle_view(config: &DashboardConfig, args: ViewArgs) -> Result<(), AppError> {
    let table = load(config)?;
    let query = view_query_from_args(&args, &table, config.histogram_bins)?;
    let section = pipeline::run_view(&table, &query);

    println!("{}", crate::report::format_section(&section));

    let output = section.outcome?;
    if let Some(path) = &args.export {
        let written = crate::io::export_view(path, &output)?;
        for p in written {
            info!(path = %p.display(), "exported view");
        }
    }
    Ok(())
}

/// Build the query for `view KIND`, filling in defaults for parameterized views.
fn view_query_from_args(args: &ViewArgs, table: &CanonicalTable, bins: usize) -> Result<ViewQuery, AppError> {
    let query = match args.kind {
        ViewKind::StoresPerState => ViewQuery::StoresPerState,
        ViewKind::TopFamilies => ViewQuery::TopFamilies,
        ViewKind::SalesDistribution => ViewQuery::SalesDistribution { bins },
        ViewKind::PromotionLeaders => ViewQuery::PromotionLeaders,
        ViewKind::WeekdayAverages => ViewQuery::WeekdayAverages,
        ViewKind::WeeklyAverages => ViewQuery::WeeklyAverages,
        ViewKind::MonthlyAverages => ViewQuery::MonthlyAverages,
        ViewKind::StoreDetail => {
            let store = args
                .store
                .or_else(|| table.store_ids().first().copied())
                .ok_or_else(|| AppError::new(EXIT_DATA, "No stores in the data."))?;
            ViewQuery::StoreDetail { store }
        }
        ViewKind::StateDetail => {
            let state = args
                .state
                .clone()
                .or_else(|| table.state_names().into_iter().next())
                .ok_or_else(|| AppError::new(EXIT_DATA, "No states in the data."))?;
            ViewQuery::StateDetail { state }
        }
        ViewKind::MonthlyTrend => ViewQuery::MonthlyTrend,
        ViewKind::StoreComparison => {
            if args.stores.is_empty() {
                return Err(AppError::new(EXIT_INPUT, "store-comparison needs --stores (e.g. --stores 1,2,3)."));
            }
            ViewQuery::StoreComparison {
                stores: args.stores.clone(),
            }
        }
        ViewKind::PromotionImpact => ViewQuery::PromotionImpact,
        ViewKind::Insights => ViewQuery::Insights,
    };
    Ok(query)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = DemoConfig {
        rows: args.rows,
        seed: args.seed,
        ..DemoConfig::default()
    };
    let written = crate::data::write_demo_dataset(&args.out, &config)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Rewrite argv so `salesboard` defaults to `salesboard tui`.
///
/// Rules:
/// - `salesboard`                     -> `salesboard tui`
/// - `salesboard --data-dir x ...`    -> `salesboard tui --data-dir x ...`
/// - `salesboard --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if SUBCOMMANDS.contains(&arg1.as_str()) {
        return argv;
    }

    // A leading flag may be a global source option placed before the
    // subcommand; only default to `tui` when no subcommand follows.
    if arg1.starts_with('-') {
        if !has_subcommand(&argv[1..]) {
            argv.push("tui".to_string());
        }
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

const SUBCOMMANDS: [&str; 8] = ["summary", "global", "store", "state", "advanced", "view", "demo", "tui"];

/// Global flags whose next token is a value, never a subcommand.
const VALUE_FLAGS: [&str; 4] = ["--data-dir", "--file", "--url", "--bins"];

fn has_subcommand(args: &[String]) -> bool {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        if SUBCOMMANDS.contains(&arg.as_str()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["salesboard"])), argv(&["salesboard", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["salesboard", "--data-dir", "data"])),
            argv(&["salesboard", "--data-dir", "data", "tui"])
        );
    }

    #[test]
    fn flag_values_named_like_subcommands_still_default_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["salesboard", "--data-dir", "demo"])),
            argv(&["salesboard", "--data-dir", "demo", "tui"])
        );
        assert_eq!(
            rewrite_args(argv(&["salesboard", "--file", "state", "--file", "store"])),
            argv(&["salesboard", "--file", "state", "--file", "store", "tui"])
        );
        let args = argv(&["salesboard", "--data-dir", "demo", "global"]);
        assert_eq!(rewrite_args(args.clone()), args);
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        let args = argv(&["salesboard", "--data-dir", "data", "global"]);
        assert_eq!(rewrite_args(args.clone()), args);
        let args = argv(&["salesboard", "view", "insights"]);
        assert_eq!(rewrite_args(args.clone()), args);
        let args = argv(&["salesboard", "--help"]);
        assert_eq!(rewrite_args(args.clone()), args);
    }

    #[test]
    fn source_precedence() {
        let mut args = SourceArgs {
            data_dir: PathBuf::from("data"),
            files: vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")],
            urls: vec!["https://example.invalid/p1.csv".into()],
            remote: false,
            bins: 20,
        };
        let config = dashboard_config_from_args(&args).unwrap();
        assert!(matches!(config.source, SourceSpec::Remote(ref u) if u.len() == 1));

        args.urls.clear();
        let config = dashboard_config_from_args(&args).unwrap();
        assert!(matches!(config.source, SourceSpec::Files(ref f) if f.len() == 2));

        args.files.clear();
        let config = dashboard_config_from_args(&args).unwrap();
        assert_eq!(config.source, SourceSpec::directory("data"));
    }

    #[test]
    fn zero_bins_is_an_input_error() {
        let args = SourceArgs {
            data_dir: PathBuf::from("."),
            files: vec![],
            urls: vec![],
            remote: false,
            bins: 0,
        };
        assert_eq!(dashboard_config_from_args(&args).unwrap_err().exit_code(), EXIT_INPUT);
    }
}
