//! Filter plugins and their discovery
//!
//! A plugin declares a configuration shape and builds filters from resolved
//! options. Plugins are grouped into `PluginSource`s, the designated locations
//! the registry scans once, on first use. `StaticSource` is a registration
//! table filled at startup with explicit `register` calls.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tiersort::filters::{ConfigShape, ExtensionFilter, Filter, OptionError, ResolvedOptions};
//! use tiersort::plugins::{FilterPlugin, StaticSource};
//! use tiersort::registry::FilterRegistry;
//!
//! struct Ext;
//!
//! impl FilterPlugin for Ext {
//!     fn name(&self) -> &str { "ext_again" }
//!     fn config_shape(&self) -> ConfigShape { ConfigShape::new().order(0) }
//!     fn create_filter(&self, opts: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> {
//!         Ok(Box::new(ExtensionFilter::new(opts.order()?)))
//!     }
//! }
//!
//! let registry = FilterRegistry::empty()
//!     .with_source(StaticSource::new("local").register(Arc::new(Ext)));
//! assert!(registry.available_filters().contains("ext_again"));
//! ```

pub mod custom_filters;
pub mod error;

pub use custom_filters::custom_filters;
pub use error::DiscoveryError;

use crate::filters::{ConfigShape, Filter, OptionError, ResolvedOptions};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A filter implementation supplied from outside the engine
pub trait FilterPlugin: Send + Sync {
    /// Name the plugin is registered under
    fn name(&self) -> &str;

    /// Human description shown in filter listings
    fn description(&self) -> &str {
        ""
    }

    /// Options this plugin accepts
    fn config_shape(&self) -> ConfigShape;

    /// Build a filter from options already resolved against `config_shape`
    ///
    /// # Errors
    ///
    /// Returns `OptionError` when the options are well typed but unusable.
    fn create_filter(&self, options: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError>;
}

/// A designated location that provides plugins
pub trait PluginSource: Send + Sync {
    /// Identifies the source in logs and errors
    fn location(&self) -> &str;

    /// Load every plugin this source offers
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::SourceUnavailable` if the source cannot be read.
    fn load(&self) -> Result<Vec<Arc<dyn FilterPlugin>>, DiscoveryError>;
}

/// Plugins registered explicitly at startup
#[derive(Clone)]
pub struct StaticSource {
    location: String,
    plugins: Vec<Arc<dyn FilterPlugin>>,
}

impl StaticSource {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            plugins: Vec::new(),
        }
    }

    /// Add a plugin to the table
    #[must_use]
    pub fn register(mut self, plugin: Arc<dyn FilterPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }
}

impl PluginSource for StaticSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn load(&self) -> Result<Vec<Arc<dyn FilterPlugin>>, DiscoveryError> {
        Ok(self.plugins.clone())
    }
}

/// Check that a plugin satisfies the plugin contract
///
/// # Errors
///
/// Returns `DiscoveryError::InvalidPlugin` for a blank name or a malformed
/// configuration shape.
pub fn validate_plugin(plugin: &dyn FilterPlugin) -> Result<(), DiscoveryError> {
    let name = plugin.name();
    if name.trim().is_empty() {
        return Err(DiscoveryError::InvalidPlugin {
            name: name.to_string(),
            reason: "plugin name is empty".to_string(),
        });
    }
    plugin
        .config_shape()
        .validate()
        .map_err(|reason| DiscoveryError::InvalidPlugin {
            name: name.to_string(),
            reason,
        })
}

/// Load and validate plugins from every source
///
/// A source that fails to load, or a plugin that fails validation, is logged
/// and skipped. When two plugins share a name the later one wins.
#[must_use]
pub fn discover(sources: &[Box<dyn PluginSource>]) -> BTreeMap<String, Arc<dyn FilterPlugin>> {
    let mut discovered: BTreeMap<String, Arc<dyn FilterPlugin>> = BTreeMap::new();

    for source in sources {
        let plugins = match source.load() {
            Ok(plugins) => plugins,
            Err(e) => {
                warn!(source = source.location(), error = %e, "skipping plugin source");
                continue;
            }
        };

        for plugin in plugins {
            if let Err(e) = validate_plugin(plugin.as_ref()) {
                warn!(source = source.location(), error = %e, "skipping plugin");
                continue;
            }
            let name = plugin.name().to_string();
            if discovered.contains_key(&name) {
                warn!(plugin = %name, source = source.location(), "plugin name registered twice; later one wins");
            }
            debug!(plugin = %name, source = source.location(), "discovered plugin");
            discovered.insert(name, plugin);
        }
    }

    info!(count = discovered.len(), "plugin discovery finished");
    discovered
}
