//! Built-in filters
//!
//! | name           | label                         | applies to                         |
//! |----------------|-------------------------------|------------------------------------|
//! | `extension`    | `png`, `no_extension`         | every file                         |
//! | `byte_size`    | `2.0-3.0_MB`                  | every file                         |
//! | `duration`     | `120-180sec`                  | audio/video with a known duration  |
//! | `resolution`   | `1920x1080`                   | images/video with known dimensions |
//! | `date_created` | `2024-05` (configurable)      | every file                         |

use super::error::{FilterFault, OptionError};
use super::options::{ConfigShape, OptionKind, ResolvedOptions};
use super::traits::Filter;
use crate::domain::FileRecord;
use crate::registry::{BuiltinFilter, FilterRegistry};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::time::SystemTime;

/// Label used by date filters when no timestamp can be read
pub const UNKNOWN_DATE: &str = "unknown_date";

const BYTES_PER_MB: f64 = 1e6;

/// Register every built-in filter with `registry`
pub fn register_builtins(registry: &mut FilterRegistry) {
    registry.register_builtin(
        "extension",
        BuiltinFilter::new(
            "Groups files by their lowercase extension",
            ExtensionFilter::config_shape(),
            |opts| Ok(Box::new(ExtensionFilter::new(opts.order()?))),
        ),
    );
    registry.register_builtin(
        "byte_size",
        BuiltinFilter::new(
            "Groups files into fixed-width size buckets labelled in megabytes",
            ByteSizeStepFilter::config_shape(),
            |opts| Ok(Box::new(ByteSizeStepFilter::from_options(opts)?)),
        ),
    );
    registry.register_builtin(
        "duration",
        BuiltinFilter::new(
            "Groups audio and video files into fixed-width duration buckets",
            DurationFilter::config_shape(),
            |opts| Ok(Box::new(DurationFilter::from_options(opts)?)),
        ),
    );
    registry.register_builtin(
        "resolution",
        BuiltinFilter::new(
            "Groups images and video by pixel dimensions",
            ResolutionFilter::config_shape(),
            |opts| Ok(Box::new(ResolutionFilter::new(opts.order()?))),
        ),
    );
    registry.register_builtin(
        "date_created",
        BuiltinFilter::new(
            "Groups files by creation date using a strftime pattern",
            DateCreatedFilter::config_shape(),
            |opts| Ok(Box::new(DateCreatedFilter::from_options(opts)?)),
        ),
    );
}

/// Groups files by extension
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    order: i32,
}

impl ExtensionFilter {
    #[must_use]
    pub const fn new(order: i32) -> Self {
        Self { order }
    }

    #[must_use]
    pub fn config_shape() -> ConfigShape {
        ConfigShape::new().order(0)
    }
}

impl Filter for ExtensionFilter {
    fn name(&self) -> &str {
        "extension"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        if file.extension.is_empty() {
            return Ok("no_extension".to_string());
        }
        Ok(file.extension.to_lowercase().replace('.', ""))
    }
}

/// Groups files into half-open size buckets of `step_bytes`
#[derive(Debug, Clone)]
pub struct ByteSizeStepFilter {
    step_bytes: u64,
    order: i32,
}

impl ByteSizeStepFilter {
    /// # Errors
    ///
    /// Returns `OptionError` if `step_bytes` is zero.
    pub fn new(step_bytes: u64, order: i32) -> Result<Self, OptionError> {
        if step_bytes == 0 {
            return Err(OptionError::invalid("byte_size", "step_bytes", "must be greater than zero"));
        }
        Ok(Self { step_bytes, order })
    }

    #[must_use]
    pub fn config_shape() -> ConfigShape {
        ConfigShape::new()
            .required("step_bytes", OptionKind::Integer, "Bucket width in bytes")
            .order(1)
    }

    /// # Errors
    ///
    /// Returns `OptionError` for a non-positive step or a bad `order`.
    pub fn from_options(opts: &ResolvedOptions) -> Result<Self, OptionError> {
        Self::new(opts.positive_integer("step_bytes")?, opts.order()?)
    }

    #[must_use]
    pub const fn step_bytes(&self) -> u64 {
        self.step_bytes
    }
}

impl Filter for ByteSizeStepFilter {
    fn name(&self) -> &str {
        "byte_size"
    }

    fn order(&self) -> i32 {
        self.order
    }

    #[allow(clippy::cast_precision_loss)]
    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let lower = (file.size() / self.step_bytes) * self.step_bytes;
        let upper = lower.saturating_add(self.step_bytes);
        Ok(format!(
            "{:.1}-{:.1}_MB",
            lower as f64 / BYTES_PER_MB,
            upper as f64 / BYTES_PER_MB
        ))
    }
}

/// Groups audio and video into duration buckets of `step_seconds`
#[derive(Debug, Clone)]
pub struct DurationFilter {
    step_seconds: f64,
    order: i32,
}

impl DurationFilter {
    /// # Errors
    ///
    /// Returns `OptionError` unless `step_seconds` is finite and positive.
    pub fn new(step_seconds: f64, order: i32) -> Result<Self, OptionError> {
        if !(step_seconds.is_finite() && step_seconds > 0.0) {
            return Err(OptionError::invalid("duration", "step_seconds", "must be a positive number"));
        }
        Ok(Self { step_seconds, order })
    }

    #[must_use]
    pub fn config_shape() -> ConfigShape {
        ConfigShape::new()
            .optional("step_seconds", OptionKind::Float, 60.0, "Bucket width in seconds")
            .order(2)
    }

    /// # Errors
    ///
    /// Returns `OptionError` for a non-positive step or a bad `order`.
    pub fn from_options(opts: &ResolvedOptions) -> Result<Self, OptionError> {
        Self::new(opts.positive_float("step_seconds")?, opts.order()?)
    }
}

impl Filter for DurationFilter {
    fn name(&self) -> &str {
        "duration"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let duration = file
            .metadata
            .duration()
            .ok_or(FilterFault::MissingField("duration"))?;
        let lower = (duration / self.step_seconds).floor() * self.step_seconds;
        let upper = lower + self.step_seconds;
        Ok(format!("{}-{}sec", format_seconds(lower), format_seconds(upper)))
    }

    fn is_applicable(&self, file: &FileRecord) -> Result<bool, FilterFault> {
        Ok(file
            .metadata
            .duration()
            .is_some_and(|d| d.is_finite() && d > 0.0))
    }
}

/// Whole seconds print without a fractional part
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_seconds(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Groups images and video by `WIDTHxHEIGHT`
#[derive(Debug, Clone)]
pub struct ResolutionFilter {
    order: i32,
}

impl ResolutionFilter {
    #[must_use]
    pub const fn new(order: i32) -> Self {
        Self { order }
    }

    #[must_use]
    pub fn config_shape() -> ConfigShape {
        ConfigShape::new().order(0)
    }
}

impl Filter for ResolutionFilter {
    fn name(&self) -> &str {
        "resolution"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let (width, height) = file
            .metadata
            .dimensions()
            .ok_or(FilterFault::MissingField("dimensions"))?;
        Ok(format!("{width}x{height}"))
    }

    fn is_applicable(&self, file: &FileRecord) -> Result<bool, FilterFault> {
        Ok(file.metadata.dimensions().is_some_and(|d| d != (0, 0)))
    }
}

/// Groups files by the date they were created
///
/// Birth time is not recorded by every filesystem. Without it the label is
/// `unknown_date`, unless `fallback_to_modified` is set, in which case the
/// modification time is used instead.
#[derive(Debug, Clone)]
pub struct DateCreatedFilter {
    date_format: String,
    fallback_to_modified: bool,
    order: i32,
}

impl DateCreatedFilter {
    /// # Errors
    ///
    /// Returns `OptionError` if `date_format` is not a valid strftime pattern.
    pub fn new(date_format: &str, fallback_to_modified: bool, order: i32) -> Result<Self, OptionError> {
        validate_date_format("date_created", date_format)?;
        Ok(Self {
            date_format: date_format.to_string(),
            fallback_to_modified,
            order,
        })
    }

    #[must_use]
    pub fn config_shape() -> ConfigShape {
        ConfigShape::new()
            .optional("date_format", OptionKind::Text, "%Y-%m", "strftime pattern for the label")
            .optional(
                "fallback_to_modified",
                OptionKind::Bool,
                false,
                "Use the modification time where birth time is unavailable",
            )
            .order(4)
    }

    /// # Errors
    ///
    /// Returns `OptionError` for an invalid pattern or a bad `order`.
    pub fn from_options(opts: &ResolvedOptions) -> Result<Self, OptionError> {
        Self::new(
            opts.text("date_format")?,
            opts.bool("fallback_to_modified")?,
            opts.order()?,
        )
    }

    fn timestamp(&self, file: &FileRecord) -> Option<SystemTime> {
        let meta = fs::metadata(&file.path).ok()?;
        match meta.created() {
            Ok(t) => Some(t),
            Err(_) if self.fallback_to_modified => meta.modified().ok(),
            Err(_) => None,
        }
    }
}

impl Filter for DateCreatedFilter {
    fn name(&self) -> &str {
        "date_created"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let Some(time) = self.timestamp(file) else {
            return Ok(UNKNOWN_DATE.to_string());
        };
        let date: DateTime<Local> = time.into();
        let mut label = String::new();
        write!(label, "{}", date.format(&self.date_format))
            .map_err(|e| FilterFault::Other(format!("date formatting failed: {e}")))?;
        Ok(label)
    }
}

/// Reject strftime patterns chrono cannot render
///
/// # Errors
///
/// Returns `OptionError::Invalid` naming the `date_format` option.
pub fn validate_date_format(filter: &str, pattern: &str) -> Result<(), OptionError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(OptionError::invalid(
            filter,
            "date_format",
            format!("'{pattern}' is not a valid date pattern"),
        ));
    }
    Ok(())
}
