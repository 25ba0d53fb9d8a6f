//! Testing utilities for tiersort
//!
//! Record builders, stub filters and plugins, and repositories that fail on
//! demand.
//!
//! Only available when compiled with `cfg(test)`.

use crate::domain::{Directory, FileRecord, Metadata};
use crate::filters::{ConfigShape, Filter, FilterFault, OptionError, ResolvedOptions};
use crate::plugins::{DiscoveryError, FilterPlugin, PluginSource};
use crate::repository::{FileRepository, LocalRepository, RepoError};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A size-only record; `name` doubles as the path
#[must_use]
pub fn generic(name: &str, size: u64) -> FileRecord {
    FileRecord::new(name, Metadata::Generic { size })
}

#[must_use]
pub fn image(name: &str, size: u64, dimensions: (u32, u32)) -> FileRecord {
    FileRecord::new(
        name,
        Metadata::Image {
            size,
            dimensions,
            format: String::new(),
        },
    )
}

#[must_use]
pub fn audio(name: &str, size: u64, duration: f64) -> FileRecord {
    FileRecord::new(
        name,
        Metadata::Audio {
            size,
            duration,
            format: String::new(),
        },
    )
}

#[must_use]
pub fn video(name: &str, size: u64, duration: f64, resolution: (u32, u32)) -> FileRecord {
    FileRecord::new(
        name,
        Metadata::Video {
            size,
            duration,
            resolution,
            codec: String::new(),
        },
    )
}

#[must_use]
pub fn document(name: &str, size: u64, page_count: u32) -> FileRecord {
    FileRecord::new(
        name,
        Metadata::Document {
            size,
            page_count,
            author: None,
        },
    )
}

/// Create `path` (and its parents) holding `size` zero bytes
///
/// # Panics
/// Panics if the file cannot be written.
pub fn write_file(path: &Path, size: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    let len = usize::try_from(size).expect("test file too large");
    fs::write(path, vec![0_u8; len]).expect("Failed to write test file");
}

/// Filter with scripted behaviour
#[derive(Debug, Clone)]
pub struct StubFilter {
    name: String,
    order: i32,
    label: String,
    applicable: bool,
    fail_category: bool,
    fail_applicability: bool,
    panic_category: bool,
}

impl StubFilter {
    /// Always applicable, labels every file with its own name
    #[must_use]
    pub fn new(name: &str, order: i32) -> Self {
        Self {
            name: name.to_string(),
            order,
            label: name.to_string(),
            applicable: true,
            fail_category: false,
            fail_applicability: false,
            panic_category: false,
        }
    }

    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    #[must_use]
    pub const fn applicable(mut self, applicable: bool) -> Self {
        self.applicable = applicable;
        self
    }

    /// `category` returns a fault
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail_category = true;
        self
    }

    /// `category` panics
    #[must_use]
    pub const fn panicking(mut self) -> Self {
        self.panic_category = true;
        self
    }

    /// `is_applicable` returns a fault
    #[must_use]
    pub const fn failing_applicability(mut self) -> Self {
        self.fail_applicability = true;
        self
    }
}

impl Filter for StubFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, _file: &FileRecord) -> Result<String, FilterFault> {
        if self.panic_category {
            panic!("{} blew up", self.name);
        }
        if self.fail_category {
            return Err(FilterFault::Other(format!("{} always fails", self.name)));
        }
        Ok(self.label.clone())
    }

    fn is_applicable(&self, _file: &FileRecord) -> Result<bool, FilterFault> {
        if self.fail_applicability {
            return Err(FilterFault::Io(io::Error::other("stat failed")));
        }
        Ok(self.applicable)
    }
}

/// Plugin producing `StubFilter`s
#[derive(Debug, Clone)]
pub struct StubPlugin {
    name: String,
    description: String,
    shape: ConfigShape,
}

impl StubPlugin {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            shape: ConfigShape::new().order(0),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: ConfigShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

impl FilterPlugin for StubPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn config_shape(&self) -> ConfigShape {
        self.shape.clone()
    }

    fn create_filter(&self, options: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> {
        Ok(Box::new(StubFilter::new(&self.name, options.order()?)))
    }
}

/// Source whose location cannot be read
#[derive(Debug, Clone, Copy)]
pub struct BrokenSource;

impl PluginSource for BrokenSource {
    fn location(&self) -> &str {
        "broken"
    }

    fn load(&self) -> Result<Vec<Arc<dyn FilterPlugin>>, DiscoveryError> {
        Err(DiscoveryError::SourceUnavailable {
            location: "broken".to_string(),
            reason: "permission denied".to_string(),
        })
    }
}

/// Source that counts how often it is loaded
pub struct CountingSource {
    plugins: Vec<Arc<dyn FilterPlugin>>,
    loads: Arc<AtomicUsize>,
}

impl CountingSource {
    #[must_use]
    pub fn new(plugins: Vec<Arc<dyn FilterPlugin>>) -> Self {
        Self {
            plugins,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared load counter, usable after the source moves into a registry
    #[must_use]
    pub fn loads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl PluginSource for CountingSource {
    fn location(&self) -> &str {
        "counting"
    }

    fn load(&self) -> Result<Vec<Arc<dyn FilterPlugin>>, DiscoveryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.plugins.clone())
    }
}

/// Local repository whose copies fail for the listed file names
#[derive(Debug, Default)]
pub struct FailingRepository {
    inner: LocalRepository,
    fail_names: HashSet<String>,
}

impl FailingRepository {
    #[must_use]
    pub fn new<'a>(fail_names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            inner: LocalRepository::new(),
            fail_names: fail_names.into_iter().map(String::from).collect(),
        }
    }
}

impl FileRepository for FailingRepository {
    fn build_tree(&self, root: &Path, allowed_extensions: &[String]) -> Result<Directory, RepoError> {
        self.inner.build_tree(root, allowed_extensions)
    }

    fn create_directory(&self, path: &Path) -> Result<(), RepoError> {
        self.inner.create_directory(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), RepoError> {
        let name = from
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_names.contains(&name) {
            return Err(RepoError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only target"),
            });
        }
        self.inner.copy_file(from, to)
    }
}
