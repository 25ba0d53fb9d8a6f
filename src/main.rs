//! Tiersort CLI application entry point
//!
//! # Usage
//!
//! ```bash
//! # Sort with the filters from the config file
//! tiersort sort ~/photos
//!
//! # Sort by extension, then 5 MB size buckets, into a chosen directory
//! tiersort sort ~/photos -d ~/sorted -f extension -f custom_size:custom_step=5
//!
//! # Four worker threads, JSON summary
//! tiersort sort ~/photos -w 4 --json
//!
//! # List filters and their options
//! tiersort filters
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/tiersort/config.toml` on Linux, or from
//! the file given with `--config`. `RUST_LOG` overrides the log level chosen
//! by `-q`/`-v`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tiersort::{
    TiersortError,
    cli::{Cli, Commands},
    config::{FilterSpec, SorterConfig},
    output,
    registry::FilterRegistry,
    repository::LocalRepository,
    sorter::{SortOutcome, Sorter, StatsReport},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type Result<T> = std::result::Result<T, TiersortError>;

/// Install the stderr log subscriber
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| TiersortError::LoggingError(e.to_string()))
}

/// JSON shape of a finished run
#[derive(Serialize)]
struct JsonSummary<'a> {
    destination: &'a Path,
    #[serde(flatten)]
    report: &'a StatsReport,
}

fn load_config(path: Option<&Path>) -> Result<SorterConfig> {
    Ok(match path {
        Some(path) => SorterConfig::load_from(path)?,
        None => SorterConfig::load()?,
    })
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn handle_sort_command(
    source: PathBuf,
    dest: Option<PathBuf>,
    config_path: Option<&Path>,
    workers: Option<u16>,
    filters: Vec<FilterSpec>,
    json: bool,
    tree: bool,
    quiet: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(workers) = workers {
        config.workers = usize::from(workers);
    }
    if !filters.is_empty() {
        config.filters = filters;
    }
    if dest.is_some() {
        config.destination = dest;
    }

    let sorter = Sorter::new(LocalRepository::new(), FilterRegistry::new(), source, config);
    let SortOutcome {
        result_tree,
        report,
        destination,
    } = sorter.sort()?;

    if json {
        let summary = JsonSummary {
            destination: &destination,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if tree {
        print!("{}", output::format_tree(&result_tree));
    }
    if !quiet || report.skipped_files > 0 {
        print!("{}", output::format_summary(&report, &destination));
    }
    Ok(())
}

fn handle_filters_command(json: bool) -> Result<()> {
    let registry = FilterRegistry::new();
    let filters = registry.all_filter_info();
    if json {
        println!("{}", serde_json::to_string_pretty(&filters)?);
    } else {
        print!("{}", output::format_filters(&filters));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.log_level())?;

    match cli.command {
        Commands::Sort {
            source,
            dest,
            config,
            workers,
            filters,
            json,
            tree,
        } => handle_sort_command(
            source,
            dest,
            config.as_deref(),
            workers,
            filters,
            json,
            tree,
            cli.quiet,
        ),
        Commands::Filters { json } => handle_filters_command(json),
    }
}
