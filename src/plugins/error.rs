//! Discovery errors
//!
//! These never abort discovery. The failing source or plugin is logged and
//! left out of the registry.

use thiserror::Error;

/// A plugin source or a single plugin could not be registered
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The source itself could not be loaded
    #[error("Plugin source '{location}' failed to load: {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// A plugin does not satisfy the plugin contract
    #[error("Plugin '{name}' is invalid: {reason}")]
    InvalidPlugin { name: String, reason: String },
}
