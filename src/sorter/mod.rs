//! Sorting orchestrator
//!
//! A `Sorter` walks the eligible files of a source tree, classifies each with
//! a `CompositeFilter`, and copies it to `<destination>/<label>/<label>/...`.
//! A file that cannot be placed is counted as skipped and the run goes on.
//!
//! # Examples
//!
//! ```no_run
//! use tiersort::config::{FilterSpec, SorterConfig};
//! use tiersort::registry::FilterRegistry;
//! use tiersort::repository::LocalRepository;
//! use tiersort::sorter::Sorter;
//!
//! let sorter = Sorter::new(
//!     LocalRepository::new(),
//!     FilterRegistry::new(),
//!     "/home/me/photos",
//!     SorterConfig::default(),
//! );
//! let outcome = sorter.sort_by(
//!     &[FilterSpec::new("extension"), FilterSpec::new("byte_size").with("step_bytes", 1_000_000_i64)],
//!     None,
//! )?;
//! println!("{} files sorted into {}", outcome.report.total_files, outcome.destination.display());
//! # Ok::<(), tiersort::sorter::SortError>(())
//! ```

pub mod error;
pub mod paths;
pub mod stats;

pub use error::SortError;
pub use paths::{build_target_dir, sanitize_label};
pub use stats::{FilterStat, SortStats, StatsReport};

use crate::config::{FilterErrorPolicy, FilterSpec, SorterConfig};
use crate::domain::{Directory, FileRecord};
use crate::filters::{CompositeFilter, Filter};
use crate::registry::{FilterInfo, FilterRegistry};
use crate::repository::{FileRepository, LocalRepository};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the root node of a result tree
pub const RESULT_ROOT_NAME: &str = "sorted";

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct SortOutcome {
    /// Mirror of the source directories that held eligible files
    pub result_tree: Directory,
    pub report: StatsReport,
    /// Destination root the files were copied under
    pub destination: PathBuf,
}

/// Orchestrates one source directory's sorting runs
pub struct Sorter<R: FileRepository = LocalRepository> {
    repo: R,
    registry: FilterRegistry,
    source: PathBuf,
    config: SorterConfig,
}

impl<R: FileRepository> Sorter<R> {
    #[must_use]
    pub fn new(repo: R, registry: FilterRegistry, source: impl Into<PathBuf>, config: SorterConfig) -> Self {
        Self {
            repo,
            registry,
            source: source.into(),
            config,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub const fn config(&self) -> &SorterConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Every available filter with its description and options
    #[must_use]
    pub fn available_filters_with_info(&self) -> BTreeMap<String, FilterInfo> {
        self.registry
            .all_filter_info()
            .into_iter()
            .map(|info| (info.name.clone(), info))
            .collect()
    }

    /// Run with the filters and destination from the configuration
    ///
    /// # Errors
    ///
    /// See [`Sorter::sort_by`].
    pub fn sort(&self) -> Result<SortOutcome, SortError> {
        self.sort_by(&self.config.filters, self.config.destination.as_deref())
    }

    /// Run with the given filters and destination
    ///
    /// Without a destination, files go to a `<source>_sorted` sibling of the
    /// source directory.
    ///
    /// # Errors
    ///
    /// Returns `SortError` only for problems that prevent the run from
    /// starting: an unusable filter under the `abort` policy, an empty filter
    /// list when filters are required, an unreadable source, a destination
    /// that cannot be created, or a worker pool that cannot be built.
    pub fn sort_by(&self, specs: &[FilterSpec], destination: Option<&Path>) -> Result<SortOutcome, SortError> {
        let discovered = self.registry.discover();
        debug!(plugins = discovered, "filter registry ready");

        let filters = self.create_filters(specs)?;
        if filters.is_empty() && self.config.require_filters {
            return Err(SortError::NoFilters);
        }

        let source = self.repo.resolve_root(&self.source)?;
        let source_tree = self.repo.build_tree(&source, &self.config.allowed_extensions)?;
        info!(
            source = %source.display(),
            files = source_tree.file_count(),
            "found source tree"
        );

        let target = self.create_target_directory(&source, destination)?;
        info!(target = %target.display(), "target directory ready");

        let composite = CompositeFilter::new(filters);
        let stats = SortStats::for_composite(&composite);
        let files = source_tree.files_depth_first();

        if self.config.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()?;
            pool.install(|| {
                files
                    .par_iter()
                    .for_each(|file| self.place_file(&composite, &stats, &target, file));
            });
        } else {
            for file in &files {
                self.place_file(&composite, &stats, &target, file);
            }
        }

        let result_tree = mirror_tree(&source_tree, &target);
        let report = stats.summarize();
        info!(
            total = report.total_files,
            skipped = report.skipped_files,
            "sorting completed"
        );

        Ok(SortOutcome {
            result_tree,
            report,
            destination: target,
        })
    }

    fn create_filters(&self, specs: &[FilterSpec]) -> Result<Vec<Box<dyn Filter>>, SortError> {
        let mut filters = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.registry.create_filter(&spec.name, &spec.options) {
                Ok(filter) => {
                    debug!(filter = filter.name(), order = filter.order(), "created filter");
                    filters.push(filter);
                }
                Err(e) => match self.config.on_filter_error {
                    FilterErrorPolicy::Abort => return Err(e.into()),
                    FilterErrorPolicy::Skip => {
                        warn!(filter = %spec.name, error = %e, "skipping filter");
                    }
                },
            }
        }
        info!(count = filters.len(), "filters created");
        Ok(filters)
    }

    fn create_target_directory(&self, source: &Path, destination: Option<&Path>) -> Result<PathBuf, SortError> {
        let target = match destination {
            Some(dest) => dest.to_path_buf(),
            None => paths::default_destination(source)
                .ok_or_else(|| SortError::InvalidSource(source.to_path_buf()))?,
        };
        Ok(self.repo.create_new_entry(&target)?)
    }

    /// Classify, create the category directory and copy one file
    fn place_file(&self, composite: &CompositeFilter, stats: &SortStats, target: &Path, file: &FileRecord) {
        let classification = composite.classify(file);
        let dir = build_target_dir(target, &classification.path);

        let placed = self
            .repo
            .create_directory(&dir)
            .and_then(|()| self.repo.copy_file(&file.path, &dir.join(&file.name)));

        match placed {
            Ok(()) => {
                debug!(file = %file.path.display(), dir = %dir.display(), "placed file");
                stats.record_classification(&classification);
            }
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "skipping file");
                stats.record_skipped();
            }
        }
    }
}

/// Mirror the directories of `source` that hold eligible files
///
/// The result records structure only; its `files` lists stay empty.
fn mirror_tree(source: &Directory, target: &Path) -> Directory {
    fn mirror_children(source: &Directory, into: &mut Directory) {
        for sub in source.subdirectories.iter().filter(|d| d.has_files()) {
            let mut mirrored = Directory::new(sub.name.clone(), into.path.join(&sub.name));
            mirror_children(sub, &mut mirrored);
            into.add_subdirectory(mirrored);
        }
    }

    let mut root = Directory::new(RESULT_ROOT_NAME, target);
    mirror_children(source, &mut root);
    root
}

impl<R: FileRepository> std::fmt::Debug for Sorter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sorter")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
