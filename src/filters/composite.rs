//! Ordered composition of filters into a category path

use super::error::FilterFault;
use super::traits::Filter;
use crate::domain::FileRecord;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Label substituted for a filter that failed on a file
pub const ERROR_LABEL: &str = "error";
/// Label substituted for an empty label
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered labels, one per active filter
pub type CategoryPath = Vec<String>;

/// `(filter name, applicable)` in application order
pub type ApplicabilityReport = Vec<(String, bool)>;

/// Result of running every filter once over a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub path: CategoryPath,
    /// `applicable[i]` is the applicability decision used for `path[i]`
    pub applicable: Vec<bool>,
}

/// The active filters of one sorting run, sorted by `order()`
///
/// Sorting is stable, so filters with equal order keep their input order.
pub struct CompositeFilter {
    filters: Vec<Box<dyn Filter>>,
}

impl CompositeFilter {
    #[must_use]
    pub fn new(mut filters: Vec<Box<dyn Filter>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    #[must_use]
    pub fn filters(&self) -> &[Box<dyn Filter>] {
        &self.filters
    }

    /// Filter names in application order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Compute the category path and the applicability decisions in one pass
    ///
    /// A filter that faults or panics contributes `"error"` and counts as
    /// not applicable; the remaining filters still run.
    #[must_use]
    pub fn classify(&self, file: &FileRecord) -> Classification {
        let mut path = Vec::with_capacity(self.filters.len());
        let mut applicable = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            let (label, applies) = match guarded(|| filter.is_applicable(file)) {
                Ok(true) => (guarded(|| filter.category(file)), true),
                Ok(false) => (Ok(filter.fallback_category()), false),
                Err(fault) => (Err(fault), false),
            };

            let label = match label {
                Ok(label) if label.is_empty() => UNKNOWN_LABEL.to_string(),
                Ok(label) => label,
                Err(fault) => {
                    warn!(
                        filter = filter.name(),
                        file = %file.path.display(),
                        error = %fault,
                        "filter failed; using error label"
                    );
                    ERROR_LABEL.to_string()
                }
            };

            path.push(label);
            applicable.push(applies);
        }

        Classification { path, applicable }
    }

    /// Category path for a file, one label per filter
    #[must_use]
    pub fn category_path(&self, file: &FileRecord) -> CategoryPath {
        self.classify(file).path
    }

    /// Applicability of each filter for a file
    #[must_use]
    pub fn applicability_report(&self, file: &FileRecord) -> ApplicabilityReport {
        self.names()
            .into_iter()
            .zip(self.classify(file).applicable)
            .collect()
    }
}

/// Run one filter call, turning a panic into a fault
fn guarded<T>(call: impl FnOnce() -> Result<T, FilterFault>) -> Result<T, FilterFault> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        Err(FilterFault::Other(format!("filter panicked: {message}")))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::{ByteSizeStepFilter, DurationFilter, ExtensionFilter};
    use crate::testing::{StubFilter, audio, generic, image};

    #[test]
    fn test_sorted_by_order_regardless_of_input() {
        let composite = CompositeFilter::new(vec![
            Box::new(StubFilter::new("c", 3).label("third")),
            Box::new(StubFilter::new("a", 1).label("first")),
            Box::new(StubFilter::new("b", 2).label("second")),
        ]);
        assert_eq!(composite.names(), vec!["a", "b", "c"]);
        assert_eq!(
            composite.category_path(&generic("x.bin", 1)),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let composite = CompositeFilter::new(vec![
            Box::new(StubFilter::new("second_in", 0)),
            Box::new(StubFilter::new("first_low", -1)),
            Box::new(StubFilter::new("third_in", 0)),
        ]);
        assert_eq!(composite.names(), vec!["first_low", "second_in", "third_in"]);
    }

    #[test]
    fn test_constant_depth_and_fallback() {
        let composite = CompositeFilter::new(vec![
            Box::new(DurationFilter::new(60.0, 0).unwrap()),
            Box::new(ExtensionFilter::new(1)),
        ]);

        let song = composite.category_path(&audio("song.mp3", 1, 125.0));
        let photo = composite.category_path(&image("photo.png", 1, (4, 4)));

        assert_eq!(song, vec!["120-180sec", "mp3"]);
        assert_eq!(photo, vec!["no_duration", "png"]);
        assert_eq!(song.len(), photo.len());
    }

    #[test]
    fn test_fallback_never_calls_category() {
        let composite = CompositeFilter::new(vec![Box::new(
            StubFilter::new("picky", 0).applicable(false).label("computed"),
        )]);
        assert_eq!(composite.category_path(&generic("x", 1)), vec!["no_picky"]);
    }

    #[test]
    fn test_fault_is_contained() {
        let composite = CompositeFilter::new(vec![
            Box::new(StubFilter::new("broken", 0).failing()),
            Box::new(StubFilter::new("broken_check", 1).failing_applicability()),
            Box::new(ExtensionFilter::new(2)),
        ]);
        let classification = composite.classify(&generic("a.gif", 1));
        assert_eq!(classification.path, vec!["error", "error", "gif"]);
        assert_eq!(classification.applicable, vec![true, false, true]);
    }

    #[test]
    fn test_panicking_filter_is_contained() {
        let composite = CompositeFilter::new(vec![
            Box::new(StubFilter::new("explodes", 0).panicking()),
            Box::new(ExtensionFilter::new(1)),
        ]);
        let classification = composite.classify(&generic("a.gif", 1));
        assert_eq!(classification.path, vec!["error", "gif"]);
        assert_eq!(classification.applicable, vec![true, true]);
    }

    #[test]
    fn test_empty_label_becomes_unknown() {
        let composite = CompositeFilter::new(vec![Box::new(StubFilter::new("blank", 0).label(""))]);
        assert_eq!(composite.category_path(&generic("x", 1)), vec!["unknown"]);
    }

    #[test]
    fn test_no_filters_gives_empty_path() {
        let composite = CompositeFilter::new(Vec::new());
        assert!(composite.is_empty());
        assert!(composite.category_path(&generic("x", 1)).is_empty());
    }

    #[test]
    fn test_applicability_report_matches_classification() {
        let composite = CompositeFilter::new(vec![
            Box::new(ExtensionFilter::new(0)),
            Box::new(ByteSizeStepFilter::new(1_000_000, 1).unwrap()),
            Box::new(DurationFilter::new(60.0, 2).unwrap()),
        ]);
        let file = image("a.png", 2_500_000, (0, 0));
        let report = composite.applicability_report(&file);
        assert_eq!(
            report,
            vec![
                ("extension".to_string(), true),
                ("byte_size".to_string(), true),
                ("duration".to_string(), false),
            ]
        );
        let applicable: Vec<bool> = report.iter().map(|(_, a)| *a).collect();
        assert_eq!(applicable, composite.classify(&file).applicable);
    }

    #[test]
    fn test_extension_then_size_scenario() {
        let composite = CompositeFilter::new(vec![
            Box::new(ByteSizeStepFilter::new(1_000_000, 1).unwrap()),
            Box::new(ExtensionFilter::new(0)),
        ]);
        let file = image("/photos/big.PNG", 2_500_000, (0, 0));
        assert_eq!(composite.category_path(&file), vec!["png", "2.0-3.0_MB"]);
    }
}
