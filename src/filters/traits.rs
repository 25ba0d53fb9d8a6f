//! The filter contract
//!
//! A filter maps a `FileRecord` to one category label. Filters are applied in
//! ascending `order()`, and each contributes exactly one path segment whether
//! or not it applies to the file, so every file of a run lands at the same
//! directory depth.

use super::error::FilterFault;
use crate::domain::FileRecord;
use std::fmt;

/// A named, ordered unit of classification
///
/// Implementations must be cheap to call repeatedly and free of side effects
/// beyond their own caching. A failure is reported as a `FilterFault`; the
/// composite filter turns it into the `"error"` label.
///
/// # Examples
///
/// ```
/// use tiersort::domain::FileRecord;
/// use tiersort::filters::{Filter, FilterFault};
///
/// struct Tiny;
///
/// impl Filter for Tiny {
///     fn name(&self) -> &str { "tiny" }
///     fn order(&self) -> i32 { 0 }
///     fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
///         Ok(if file.size() < 1024 { "tiny".into() } else { "regular".into() })
///     }
/// }
///
/// assert_eq!(Tiny.fallback_category(), "no_tiny");
/// ```
pub trait Filter: Send + Sync {
    /// Stable identifier, used for registry lookup and statistics keys
    fn name(&self) -> &str;

    /// Priority; lower runs first
    fn order(&self) -> i32;

    /// Label for a file this filter applies to
    ///
    /// # Errors
    ///
    /// Returns `FilterFault` when the label cannot be computed.
    fn category(&self, file: &FileRecord) -> Result<String, FilterFault>;

    /// Whether `category` is meaningful for this file
    ///
    /// # Errors
    ///
    /// Returns `FilterFault` when applicability cannot be decided.
    fn is_applicable(&self, _file: &FileRecord) -> Result<bool, FilterFault> {
        Ok(true)
    }

    /// Label used instead of `category` when the filter does not apply
    fn fallback_category(&self) -> String {
        format!("no_{}", self.name())
    }
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name())
            .field("order", &self.order())
            .finish()
    }
}
