//! Configuration for sorting runs
//!
//! Settings live in `config.toml` under the user's config directory
//! (`~/.config/tiersort/config.toml` on Linux). Filters are listed as an
//! array of tables; every key other than `name` is passed to the filter as
//! an option:
//!
//! ```toml
//! workers = 4
//! on_filter_error = "skip"
//!
//! [[filters]]
//! name = "extension"
//!
//! [[filters]]
//! name = "byte_size"
//! step_bytes = 1000000
//! ```

use crate::filters::{FilterOptions, OptionValue};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What a run does when a configured filter cannot be created
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterErrorPolicy {
    /// Fail the run before any file is touched
    #[default]
    Abort,
    /// Log the error and continue without that filter
    Skip,
}

/// One configured filter: a registry name plus its options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FilterSpec {
    pub name: String,
    #[serde(flatten)]
    pub options: FilterOptions,
}

impl FilterSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: FilterOptions::new(),
        }
    }

    /// Add an option
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

/// Settings of a sorting run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SorterConfig {
    /// Extensions eligible for sorting, case-insensitive, dot optional
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Destination root; defaults to a `<source>_sorted` sibling
    #[serde(default)]
    pub destination: Option<PathBuf>,

    /// Worker threads; 1 runs sequentially
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Refuse to run with an empty filter list
    #[serde(default)]
    pub require_filters: bool,

    #[serde(default)]
    pub on_filter_error: FilterErrorPolicy,

    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

fn default_extensions() -> Vec<String> {
    [
        "JPEG", "JPG", "PNG", "GIF", "WEBP", "TIFF", "BMP", "ICO", "SVG", "RAW", "EPS", "MP4", "AVI",
        "MKV", "MOV", "MP3", "WAV",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_workers() -> usize {
    1
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_extensions(),
            destination: None,
            workers: default_workers(),
            require_filters: false,
            on_filter_error: FilterErrorPolicy::default(),
            filters: Vec::new(),
        }
    }
}

impl SorterConfig {
    /// Get the path to the default config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("tiersort").join("config.toml"))
    }

    /// Load the default config file, or defaults if there is none
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        if config.workers == 0 {
            return Err(ConfigError::Message("workers must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Write configuration as TOML, creating the parent directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the
    /// configuration cannot be serialized, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
