//! Filters: the classification units of a sorting run
//!
//! Each filter turns a `FileRecord` into one category label. A
//! `CompositeFilter` runs the active filters in ascending order and yields the
//! category path that becomes the file's destination directory chain.
//!
//! # Examples
//!
//! ```
//! use tiersort::domain::{FileRecord, Metadata};
//! use tiersort::filters::{ByteSizeStepFilter, CompositeFilter, ExtensionFilter};
//!
//! let composite = CompositeFilter::new(vec![
//!     Box::new(ByteSizeStepFilter::new(1_000_000, 1).unwrap()),
//!     Box::new(ExtensionFilter::new(0)),
//! ]);
//!
//! let file = FileRecord::new("/photos/big.PNG", Metadata::Generic { size: 2_500_000 });
//! assert_eq!(composite.category_path(&file), vec!["png", "2.0-3.0_MB"]);
//! ```

pub mod builtin;
pub mod composite;
pub mod error;
pub mod options;
pub mod traits;

pub use builtin::{
    ByteSizeStepFilter, DateCreatedFilter, DurationFilter, ExtensionFilter, ResolutionFilter,
};
pub use composite::{
    ApplicabilityReport, CategoryPath, Classification, CompositeFilter, ERROR_LABEL, UNKNOWN_LABEL,
};
pub use error::{FilterFault, OptionError};
pub use options::{
    ConfigField, ConfigShape, FilterOptions, OptionKind, OptionValue, ResolvedOptions,
};
pub use traits::Filter;
