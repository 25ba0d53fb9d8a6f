//! Tiersort - sort files into a category tree
//!
//! A sorting run classifies every eligible file under a source directory
//! with an ordered list of filters. Each filter contributes one label and the
//! labels, in order, become the directory chain the file is copied into.
//! New filters plug in through the registry without touching the engine.

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod domain;
pub mod filters;
pub mod output;
pub mod plugins;
pub mod registry;
pub mod repository;
pub mod sorter;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TiersortError {
    /// A sorting run could not start
    #[error("Sort error: {0}")]
    SortError(#[from] sorter::SortError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// JSON rendering failed
    #[error("Output error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Logging could not be set up
    #[error("Logging error: {0}")]
    LoggingError(String),
}
