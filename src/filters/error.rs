//! Error types for filters and their option records
//!
//! `FilterFault` is what a filter reports when it cannot compute a label or
//! decide applicability. It is contained by the composite filter and never
//! reaches the caller. `OptionError` describes an options record that does not
//! fit a filter's declared configuration shape.

use std::io;
use thiserror::Error;

/// Internal failure of a single filter for a single file
#[derive(Debug, Error)]
pub enum FilterFault {
    /// The metadata variant lacks a field the filter needs
    #[error("Metadata field '{0}' is not available")]
    MissingField(&'static str),

    /// Reading filesystem attributes failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

/// Invalid filter configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    /// A required option has no value and no default
    #[error("Filter '{filter}' requires option '{option}'")]
    Missing { filter: String, option: String },

    /// An option value has the wrong type
    #[error("Option '{option}' of filter '{filter}' expects {expected}, got {found}")]
    WrongType {
        filter: String,
        option: String,
        expected: String,
        found: String,
    },

    /// An option value is well typed but not acceptable
    #[error("Option '{option}' of filter '{filter}' is invalid: {reason}")]
    Invalid {
        filter: String,
        option: String,
        reason: String,
    },

    /// The options record names an option the filter does not declare
    #[error("Filter '{filter}' has no option '{option}'")]
    Unknown { filter: String, option: String },
}

impl OptionError {
    #[must_use]
    pub fn invalid(filter: &str, option: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            filter: filter.to_string(),
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the filter the options belong to
    #[must_use]
    pub fn filter(&self) -> &str {
        match self {
            Self::Missing { filter, .. }
            | Self::WrongType { filter, .. }
            | Self::Invalid { filter, .. }
            | Self::Unknown { filter, .. } => filter,
        }
    }
}
