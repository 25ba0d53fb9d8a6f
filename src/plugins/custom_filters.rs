//! Plugins bundled with tiersort
//!
//! - `custom_size`: size buckets with a step given in KB/MB/GB
//! - `date_range`: buckets by days since last modification
//! - `file_type`: coarse media type (images, videos, audio, documents)

use super::{FilterPlugin, StaticSource};
use crate::domain::FileRecord;
use crate::filters::builtin::UNKNOWN_DATE;
use crate::filters::{
    ByteSizeStepFilter, ConfigShape, Filter, FilterFault, OptionError, OptionKind, ResolvedOptions,
};
use chrono::{DateTime, Local};
use std::fs;
use std::sync::Arc;

/// Location name of the bundled source
pub const CUSTOM_FILTERS_LOCATION: &str = "custom_filters";

/// The bundled plugin table
#[must_use]
pub fn custom_filters() -> StaticSource {
    StaticSource::new(CUSTOM_FILTERS_LOCATION)
        .register(Arc::new(CustomSizePlugin))
        .register(Arc::new(DateRangePlugin))
        .register(Arc::new(FileTypePlugin))
}

/// Size buckets with a human unit; builds a `byte_size` filter
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomSizePlugin;

impl CustomSizePlugin {
    /// Bytes per unit; unrecognised units count as plain bytes
    #[must_use]
    pub fn unit_multiplier(unit: &str) -> u64 {
        match unit.trim().to_uppercase().as_str() {
            "KB" => 1024,
            "MB" => 1024 * 1024,
            "GB" => 1024 * 1024 * 1024,
            _ => 1,
        }
    }
}

impl FilterPlugin for CustomSizePlugin {
    fn name(&self) -> &str {
        "custom_size"
    }

    fn description(&self) -> &str {
        "File size grouping with a configurable unit"
    }

    fn config_shape(&self) -> ConfigShape {
        ConfigShape::new()
            .optional("unit", OptionKind::Text, "MB", "Size unit: KB, MB or GB")
            .optional("custom_step", OptionKind::Float, 5.0, "Step size in the chosen unit")
            .order(0)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn create_filter(&self, options: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> {
        let multiplier = Self::unit_multiplier(options.text("unit")?);
        let step = options.positive_float("custom_step")?;
        let step_bytes = (step * multiplier as f64).floor() as u64;
        let filter = ByteSizeStepFilter::new(step_bytes, options.order()?)
            .map_err(|_| OptionError::invalid(self.name(), "custom_step", "step is smaller than one byte"))?;
        Ok(Box::new(filter))
    }
}

/// Buckets of `range_days` days since last modification
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangePlugin;

impl FilterPlugin for DateRangePlugin {
    fn name(&self) -> &str {
        "date_range"
    }

    fn description(&self) -> &str {
        "Groups files by how many days ago they were modified"
    }

    fn config_shape(&self) -> ConfigShape {
        ConfigShape::new()
            .optional("range_days", OptionKind::Integer, 30_i64, "Days per range")
            .order(0)
    }

    fn create_filter(&self, options: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> {
        Ok(Box::new(DateRangeFilter::new(
            options.positive_integer("range_days")?,
            options.order()?,
        )))
    }
}

#[derive(Debug, Clone)]
pub struct DateRangeFilter {
    range_days: u64,
    order: i32,
}

impl DateRangeFilter {
    /// `range_days` of zero is treated as one
    #[must_use]
    pub fn new(range_days: u64, order: i32) -> Self {
        Self {
            range_days: range_days.max(1),
            order,
        }
    }

    /// Label for a file modified `days_ago` days ago
    #[must_use]
    pub fn label_for_age(&self, days_ago: u64) -> String {
        let bucket = days_ago / self.range_days;
        let start = bucket * self.range_days;
        let end = start + self.range_days;
        if bucket == 0 {
            format!("last_{end}_days")
        } else {
            format!("{start}-{end}_days_ago")
        }
    }
}

impl Filter for DateRangeFilter {
    fn name(&self) -> &str {
        "date_range"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let Ok(modified) = fs::metadata(&file.path).and_then(|m| m.modified()) else {
            return Ok(UNKNOWN_DATE.to_string());
        };
        let modified: DateTime<Local> = modified.into();
        let days_ago = u64::try_from((Local::now() - modified).num_days()).unwrap_or(0);
        Ok(self.label_for_age(days_ago))
    }
}

/// Coarse media type grouping
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTypePlugin;

impl FilterPlugin for FileTypePlugin {
    fn name(&self) -> &str {
        "file_type"
    }

    fn description(&self) -> &str {
        "Groups files by general type (images, videos, audio, documents)"
    }

    fn config_shape(&self) -> ConfigShape {
        ConfigShape::new()
            .optional("group_images", OptionKind::Bool, true, "Group image files")
            .optional("group_videos", OptionKind::Bool, true, "Group video files")
            .optional("group_audio", OptionKind::Bool, true, "Group audio files")
            .optional("group_documents", OptionKind::Bool, true, "Group document files")
            .order(0)
    }

    fn create_filter(&self, options: &ResolvedOptions) -> Result<Box<dyn Filter>, OptionError> {
        Ok(Box::new(FileTypeFilter {
            group_images: options.bool("group_images")?,
            group_videos: options.bool("group_videos")?,
            group_audio: options.bool("group_audio")?,
            group_documents: options.bool("group_documents")?,
            order: options.order()?,
        }))
    }
}

const IMAGE_TYPES: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];
const VIDEO_TYPES: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv"];
const AUDIO_TYPES: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a"];
const DOCUMENT_TYPES: &[&str] = &["pdf", "doc", "docx", "txt"];

#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct FileTypeFilter {
    group_images: bool,
    group_videos: bool,
    group_audio: bool,
    group_documents: bool,
    order: i32,
}

impl Filter for FileTypeFilter {
    fn name(&self) -> &str {
        "file_type"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn category(&self, file: &FileRecord) -> Result<String, FilterFault> {
        let ext = file.extension.to_lowercase();
        let ext = ext.as_str();
        let label = if self.group_images && IMAGE_TYPES.contains(&ext) {
            "images"
        } else if self.group_videos && VIDEO_TYPES.contains(&ext) {
            "videos"
        } else if self.group_audio && AUDIO_TYPES.contains(&ext) {
            "audio"
        } else if self.group_documents && DOCUMENT_TYPES.contains(&ext) {
            "documents"
        } else {
            "other_files"
        };
        Ok(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterOptions, OptionValue};
    use crate::testing::generic;

    fn build(plugin: &dyn FilterPlugin, pairs: &[(&str, OptionValue)]) -> Result<Box<dyn Filter>, OptionError> {
        let options: FilterOptions = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        let resolved = plugin.config_shape().resolve(plugin.name(), &options)?;
        plugin.create_filter(&resolved)
    }

    #[test]
    fn test_custom_size_converts_units() {
        assert_eq!(CustomSizePlugin::unit_multiplier("kb"), 1024);
        assert_eq!(CustomSizePlugin::unit_multiplier("GB"), 1_073_741_824);
        assert_eq!(CustomSizePlugin::unit_multiplier("parsecs"), 1);

        let filter = build(
            &CustomSizePlugin,
            &[("unit", "KB".into()), ("custom_step", OptionValue::Integer(1000)), ("order", 3_i64.into())],
        )
        .unwrap();
        assert_eq!(filter.name(), "byte_size");
        assert_eq!(filter.order(), 3);
        assert_eq!(filter.category(&generic("a.bin", 1_500_000)).unwrap(), "1.0-2.0_MB");
    }

    #[test]
    fn test_custom_size_defaults() {
        let filter = build(&CustomSizePlugin, &[]).unwrap();
        // 5 MiB steps
        assert_eq!(filter.category(&generic("a.bin", 6_000_000)).unwrap(), "5.2-10.5_MB");
    }

    #[test]
    fn test_custom_size_rejects_sub_byte_step() {
        let err = build(&CustomSizePlugin, &[("unit", "B".into()), ("custom_step", 0.5.into())]).err();
        assert!(matches!(err, Some(OptionError::Invalid { .. })));
    }

    #[test]
    fn test_date_range_labels() {
        let filter = DateRangeFilter::new(7, 0);
        assert_eq!(filter.label_for_age(0), "last_7_days");
        assert_eq!(filter.label_for_age(6), "last_7_days");
        assert_eq!(filter.label_for_age(7), "7-14_days_ago");
        assert_eq!(filter.label_for_age(30), "28-35_days_ago");
    }

    #[test]
    fn test_date_range_unreadable_file() {
        let filter = DateRangeFilter::new(30, 0);
        assert_eq!(filter.category(&generic("/no/such/file", 1)).unwrap(), UNKNOWN_DATE);
    }

    #[test]
    fn test_date_range_rejects_zero_days() {
        let err = build(&DateRangePlugin, &[("range_days", 0_i64.into())]).err();
        assert!(matches!(err, Some(OptionError::Invalid { .. })));
    }

    #[test]
    fn test_file_type_groups() {
        let filter = build(&FileTypePlugin, &[]).unwrap();
        assert_eq!(filter.category(&generic("a.JPG", 1)).unwrap(), "images");
        assert_eq!(filter.category(&generic("a.mkv", 1)).unwrap(), "videos");
        assert_eq!(filter.category(&generic("a.flac", 1)).unwrap(), "audio");
        assert_eq!(filter.category(&generic("a.pdf", 1)).unwrap(), "documents");
        assert_eq!(filter.category(&generic("a.py", 1)).unwrap(), "other_files");

        let no_images = build(&FileTypePlugin, &[("group_images", false.into())]).unwrap();
        assert_eq!(no_images.category(&generic("a.png", 1)).unwrap(), "other_files");
    }

    #[test]
    fn test_bundled_source_validates() {
        use super::super::PluginSource;
        let plugins = custom_filters().load().unwrap();
        assert_eq!(plugins.len(), 3);
        for plugin in plugins {
            assert!(super::super::validate_plugin(plugin.as_ref()).is_ok());
        }
    }
}
