use crate::filters::OptionError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Filter '{name}' not found. Available filters: {}", .available.join(", "))]
    FilterNotFound { name: String, available: Vec<String> },

    #[error(transparent)]
    InvalidOptions(#[from] OptionError),
}

impl RegistryError {
    /// Name of the filter that could not be created
    #[must_use]
    pub fn filter_name(&self) -> &str {
        match self {
            Self::FilterNotFound { name, .. } => name,
            Self::InvalidOptions(e) => e.filter(),
        }
    }
}
