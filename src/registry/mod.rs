//! Filter registry
//!
//! Maps filter names to factories. Built-in filters are registered when the
//! registry is constructed; plugins are pulled from the registry's sources
//! the first time a lookup needs them, exactly once, and memoized until
//! `reset` is called.
//!
//! # Examples
//!
//! ```
//! use tiersort::filters::{FilterOptions, OptionValue};
//! use tiersort::registry::FilterRegistry;
//!
//! let registry = FilterRegistry::new();
//!
//! let mut options = FilterOptions::new();
//! options.insert("step_bytes".into(), OptionValue::Integer(1_000_000));
//! let filter = registry.create_filter("byte_size", &options)?;
//! assert_eq!(filter.name(), "byte_size");
//!
//! assert!(registry.available_filters().contains("file_type"));
//! # Ok::<(), tiersort::registry::RegistryError>(())
//! ```

pub mod error;

pub use error::RegistryError;

use crate::filters::builtin::register_builtins;
use crate::filters::{ConfigField, ConfigShape, Filter, FilterOptions, OptionError, ResolvedOptions};
use crate::plugins::{self, FilterPlugin, PluginSource, custom_filters};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type Factory = dyn Fn(&ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> + Send + Sync;

/// A built-in filter factory with its declared configuration
#[derive(Clone)]
pub struct BuiltinFilter {
    description: String,
    shape: ConfigShape,
    factory: Arc<Factory>,
}

impl BuiltinFilter {
    pub fn new<F>(description: &str, shape: ConfigShape, factory: F) -> Self
    where
        F: Fn(&ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> + Send + Sync + 'static,
    {
        Self {
            description: description.to_string(),
            shape,
            factory: Arc::new(factory),
        }
    }

    #[must_use]
    pub fn shape(&self) -> &ConfigShape {
        &self.shape
    }
}

impl fmt::Debug for BuiltinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFilter")
            .field("description", &self.description)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Where a filter comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSource {
    Builtin,
    Plugin,
}

/// Description of an available filter, for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterInfo {
    pub name: String,
    pub source: FilterSource,
    pub description: String,
    pub fields: Vec<ConfigField>,
}

type PluginTable = BTreeMap<String, Arc<dyn FilterPlugin>>;

/// The set of filters a sorting run can choose from
pub struct FilterRegistry {
    builtins: BTreeMap<String, BuiltinFilter>,
    sources: Vec<Box<dyn PluginSource>>,
    plugins: OnceLock<PluginTable>,
}

impl FilterRegistry {
    /// Registry with the built-in filters and the bundled plugin source
    #[must_use]
    pub fn new() -> Self {
        Self::with_builtins().with_source(custom_filters())
    }

    /// Registry with built-in filters and no plugin sources
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        register_builtins(&mut registry);
        registry
    }

    /// Registry with nothing registered
    #[must_use]
    pub fn empty() -> Self {
        Self {
            builtins: BTreeMap::new(),
            sources: Vec::new(),
            plugins: OnceLock::new(),
        }
    }

    /// Add a plugin source
    ///
    /// Plugins from a source added after discovery are picked up on the next
    /// discovery, after a `reset`.
    #[must_use]
    pub fn with_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Register a built-in factory; a later registration for the same name
    /// replaces the earlier one
    pub fn register_builtin(&mut self, name: &str, builtin: BuiltinFilter) {
        if self.builtins.insert(name.to_string(), builtin).is_some() {
            debug!(filter = name, "replaced built-in filter");
        }
    }

    /// Run plugin discovery if it has not run yet
    ///
    /// Returns the number of discovered plugins. Concurrent callers block
    /// until the single discovery pass finishes.
    pub fn discover(&self) -> usize {
        self.plugins().len()
    }

    #[must_use]
    pub fn is_discovered(&self) -> bool {
        self.plugins.get().is_some()
    }

    /// Forget discovered plugins; the next lookup discovers again
    pub fn reset(&mut self) {
        self.plugins.take();
    }

    fn plugins(&self) -> &PluginTable {
        self.plugins.get_or_init(|| plugins::discover(&self.sources))
    }

    /// Build a filter by name from a raw options record
    ///
    /// Built-ins are consulted first, then discovered plugins.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::FilterNotFound` (listing the available names)
    /// if neither has `name`, or `RegistryError::InvalidOptions` if the
    /// options do not fit the filter's configuration shape.
    pub fn create_filter(&self, name: &str, options: &FilterOptions) -> Result<Box<dyn Filter>, RegistryError> {
        if let Some(builtin) = self.builtins.get(name) {
            let resolved = builtin.shape.resolve(name, options)?;
            return Ok((builtin.factory)(&resolved)?);
        }

        if let Some(plugin) = self.plugins().get(name) {
            let resolved = plugin.config_shape().resolve(name, options)?;
            return Ok(plugin.create_filter(&resolved)?);
        }

        Err(RegistryError::FilterNotFound {
            name: name.to_string(),
            available: self.available_filters().into_iter().collect(),
        })
    }

    /// Names of every built-in and discovered filter
    #[must_use]
    pub fn available_filters(&self) -> BTreeSet<String> {
        self.builtins
            .keys()
            .chain(self.plugins().keys())
            .cloned()
            .collect()
    }

    /// Description and declared options of a filter
    #[must_use]
    pub fn filter_info(&self, name: &str) -> Option<FilterInfo> {
        if let Some(builtin) = self.builtins.get(name) {
            return Some(FilterInfo {
                name: name.to_string(),
                source: FilterSource::Builtin,
                description: builtin.description.clone(),
                fields: builtin.shape.fields().to_vec(),
            });
        }

        self.plugins().get(name).map(|plugin| FilterInfo {
            name: name.to_string(),
            source: FilterSource::Plugin,
            description: plugin.description().to_string(),
            fields: plugin.config_shape().fields().to_vec(),
        })
    }

    /// `filter_info` for every available filter, sorted by name
    #[must_use]
    pub fn all_filter_info(&self) -> Vec<FilterInfo> {
        self.available_filters()
            .iter()
            .filter_map(|name| self.filter_info(name))
            .collect()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("builtins", &self.builtins.keys().collect::<Vec<_>>())
            .field(
                "sources",
                &self.sources.iter().map(|s| s.location()).collect::<Vec<_>>(),
            )
            .field("discovered", &self.is_discovered())
            .finish()
    }
}
