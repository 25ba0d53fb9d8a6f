//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **sort**: classify the files under a source directory and copy them
//!   into the category tree
//! - **filters**: list the filters that can be configured
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use tiersort::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_from(["tiersort", "sort", "photos", "--filter", "byte_size:step_bytes=1000000"]);
//! match cli.command {
//!     Commands::Sort { filters, .. } => assert_eq!(filters[0].name, "byte_size"),
//!     Commands::Filters { .. } => unreachable!(),
//! }
//! ```

use crate::config::FilterSpec;
use crate::filters::OptionValue;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tiersort")]
#[command(about = "Sort files into a category tree", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only print errors and results
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log more detail (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify and copy the files of a directory
    #[command(visible_alias = "s")]
    Sort {
        /// Directory to sort
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Destination root (default: <SOURCE>_sorted next to the source)
        #[arg(short = 'd', long = "dest", value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Config file (default: the user config file)
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Worker threads (overrides config)
        #[arg(short = 'w', long = "workers", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
        workers: Option<u16>,

        /// Filter to apply; replaces the configured filters (repeatable)
        #[arg(
            short = 'f',
            long = "filter",
            value_name = "NAME[:KEY=VALUE,...]",
            value_parser = parse_filter_spec
        )]
        filters: Vec<FilterSpec>,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,

        /// Print the mirrored source tree
        #[arg(long = "tree")]
        tree: bool,
    },

    /// List available filters and their options
    #[command(visible_alias = "ls")]
    Filters {
        /// Print as JSON
        #[arg(long = "json")]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log level for the verbosity flags
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Parse `name` or `name:key=value,key=value` into a `FilterSpec`
///
/// Values are read as booleans, integers or floats where they parse as
/// such, otherwise as text.
///
/// # Errors
///
/// Returns a message for an empty name or a malformed `key=value` pair.
pub fn parse_filter_spec(input: &str) -> Result<FilterSpec, String> {
    let (name, options) = match input.split_once(':') {
        Some((name, options)) => (name.trim(), Some(options)),
        None => (input.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("missing filter name in '{input}'"));
    }

    let mut spec = FilterSpec::new(name);
    for pair in options.into_iter().flat_map(|o| o.split(',')) {
        if pair.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{pair}'"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty option name in '{pair}'"));
        }
        spec.options.insert(key.to_string(), OptionValue::parse_token(value));
    }
    Ok(spec)
}
