//! Run statistics
//!
//! Counters are atomic so worker threads can record outcomes without a lock.
//! Filters are tracked by position in the composite, so two active filters
//! sharing a name keep separate counts.

use crate::domain::FileRecord;
use crate::filters::{Classification, CompositeFilter};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters of one sorting run
#[derive(Debug, Default)]
pub struct SortStats {
    total_files: AtomicUsize,
    skipped_files: AtomicUsize,
    filters: Vec<(String, AtomicUsize)>,
}

impl SortStats {
    /// Zeroed counters, one per filter name in order
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            total_files: AtomicUsize::new(0),
            skipped_files: AtomicUsize::new(0),
            filters: names
                .into_iter()
                .map(|n| (n.into(), AtomicUsize::new(0)))
                .collect(),
        }
    }

    /// Counters for the filters of `composite`, in application order
    #[must_use]
    pub fn for_composite(composite: &CompositeFilter) -> Self {
        Self::new(composite.names())
    }

    /// Record a successfully placed file
    ///
    /// Runs the applicability checks of `composite` again; use
    /// `record_classification` when the classification is already at hand.
    pub fn record_file(&self, composite: &CompositeFilter, file: &FileRecord) {
        self.record_classification(&composite.classify(file));
    }

    /// Record a successfully placed file from its classification
    pub fn record_classification(&self, classification: &Classification) {
        self.total_files.fetch_add(1, Ordering::Relaxed);
        for ((_, count), applies) in self.filters.iter().zip(&classification.applicable) {
            if *applies {
                count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a file that could not be placed
    pub fn record_skipped(&self) {
        self.skipped_files.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn skipped_files(&self) -> usize {
        self.skipped_files.load(Ordering::Relaxed)
    }

    /// Snapshot the counters with percentages
    #[must_use]
    pub fn summarize(&self) -> StatsReport {
        let total = self.total_files();
        let filters = self
            .filters
            .iter()
            .map(|(name, count)| {
                let applicable_files = count.load(Ordering::Relaxed);
                FilterStat {
                    name: name.clone(),
                    applicable_files,
                    percentage: percentage(applicable_files, total),
                }
            })
            .collect();

        StatsReport {
            total_files: total,
            skipped_files: self.skipped_files(),
            filters,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Final statistics of a sorting run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub total_files: usize,
    pub skipped_files: usize,
    pub filters: Vec<FilterStat>,
}

impl StatsReport {
    /// Files seen by the run, placed or skipped
    #[must_use]
    pub const fn files_seen(&self) -> usize {
        self.total_files + self.skipped_files
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStat {
    pub name: String,
    pub applicable_files: usize,
    pub percentage: f64,
}
