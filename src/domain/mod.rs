//! Domain types shared by every stage of a sorting run
//!
//! - `FileRecord`: immutable per-file value read by every filter
//! - `Metadata`: tagged union of the metadata a file type can carry
//! - `Directory`: recursive tree used for both the source and the result side

pub mod metadata;

pub use metadata::{BasicExtractor, MetadataExtractor};

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Metadata attached to a file, keyed by file category
///
/// Every variant carries the size. Optional fields are zeroed or empty when
/// extraction failed; a failure is never reported as an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Metadata {
    Generic {
        size: u64,
    },
    Image {
        size: u64,
        dimensions: (u32, u32),
        format: String,
    },
    Video {
        size: u64,
        duration: f64,
        resolution: (u32, u32),
        codec: String,
    },
    Audio {
        size: u64,
        duration: f64,
        format: String,
    },
    Document {
        size: u64,
        page_count: u32,
        author: Option<String>,
    },
}

impl Metadata {
    /// Size in bytes, available for every variant
    #[must_use]
    pub const fn size(&self) -> u64 {
        match self {
            Self::Generic { size }
            | Self::Image { size, .. }
            | Self::Video { size, .. }
            | Self::Audio { size, .. }
            | Self::Document { size, .. } => *size,
        }
    }

    /// Playback duration in seconds for audio and video files
    #[must_use]
    pub const fn duration(&self) -> Option<f64> {
        match self {
            Self::Video { duration, .. } | Self::Audio { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    /// Pixel dimensions for images and video frames
    #[must_use]
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Image { dimensions, .. } => Some(*dimensions),
            Self::Video { resolution, .. } => Some(*resolution),
            _ => None,
        }
    }

    #[must_use]
    pub const fn page_count(&self) -> Option<u32> {
        match self {
            Self::Document { page_count, .. } => Some(*page_count),
            _ => None,
        }
    }
}

/// A single file discovered in the source tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// File name including the extension
    pub name: String,
    /// Absolute source path
    pub path: PathBuf,
    /// Uppercase extension without the leading dot (`"PNG"`), empty if none
    pub extension: String,
    pub metadata: Metadata,
}

impl FileRecord {
    /// Create a record, normalizing the extension to uppercase without a dot
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, metadata: Metadata) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = normalize_extension(&path);

        Self {
            name,
            path,
            extension,
            metadata,
        }
    }

    /// Size in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.metadata.size()
    }
}

/// Uppercase extension of `path` without the separator
#[must_use]
pub fn normalize_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

/// Normalize a user supplied extension (`"png"`, `".Png"`) to `"PNG"`
#[must_use]
pub fn normalize_extension_str(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_uppercase()
}

/// A directory node
///
/// Source trees carry the eligible files of each directory. Result trees only
/// record the mirrored directory structure and leave `files` empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directory {
    pub name: String,
    pub path: PathBuf,
    pub subdirectories: Vec<Directory>,
    pub files: Vec<FileRecord>,
}

impl Directory {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            subdirectories: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn add_subdirectory(&mut self, directory: Self) {
        self.subdirectories.push(directory);
    }

    pub fn add_file(&mut self, file: FileRecord) {
        self.files.push(file);
    }

    /// Whether this directory or any descendant holds at least one file
    #[must_use]
    pub fn has_files(&self) -> bool {
        !self.files.is_empty() || self.subdirectories.iter().any(Self::has_files)
    }

    /// Total number of files in this subtree
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .subdirectories
                .iter()
                .map(Self::file_count)
                .sum::<usize>()
    }

    /// Find a descendant by its chain of directory names
    #[must_use]
    pub fn find_directory(&self, parts: &[&str]) -> Option<&Self> {
        let Some((first, rest)) = parts.split_first() else {
            return Some(self);
        };
        self.subdirectories
            .iter()
            .find(|d| d.name == *first)
            .and_then(|d| d.find_directory(rest))
    }

    /// All files of the subtree in depth-first order (own files first)
    #[must_use]
    pub fn files_depth_first(&self) -> Vec<&FileRecord> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(dir) = stack.pop() {
            out.extend(dir.files.iter());
            stack.extend(dir.subdirectories.iter().rev());
        }
        out
    }
}
