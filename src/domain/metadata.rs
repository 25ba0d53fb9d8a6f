//! Metadata extraction
//!
//! Extraction never fails past this boundary: any I/O or decoding problem
//! degrades to a record with zeroed optional fields.

use super::{FileRecord, Metadata, normalize_extension};
use lofty::file::AudioFile;
use std::fs;
use std::path::Path;
use tracing::debug;

const IMAGE_EXTENSIONS: &[&str] = &[
    "JPG", "JPEG", "PNG", "GIF", "WEBP", "BMP", "TIFF", "ICO", "SVG", "RAW", "EPS",
];
const VIDEO_EXTENSIONS: &[&str] = &["MP4", "AVI", "MKV", "MOV", "WMV", "FLV", "WEBM"];
const AUDIO_EXTENSIONS: &[&str] = &["MP3", "WAV", "OGG", "FLAC", "AAC", "M4A"];
const DOCUMENT_EXTENSIONS: &[&str] = &["PDF", "DOC", "DOCX", "TXT"];

/// Rough number of characters on one text page
const CHARS_PER_PAGE: usize = 3000;

/// Builds a `FileRecord` for a path
pub trait MetadataExtractor: Send + Sync {
    /// Produce the record for `path`, using the extension as the type hint
    fn extract(&self, path: &Path) -> FileRecord;
}

/// Extractor that reads file headers, never whole media streams
///
/// - size from `stat`
/// - image dimensions from the image header
/// - audio durations, and video durations for containers the tag reader
///   understands
/// - PDF page counts from the page tree; plain text pages estimated from
///   the character count
///
/// Video resolution and codec are not probed and stay zeroed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicExtractor;

impl MetadataExtractor for BasicExtractor {
    fn extract(&self, path: &Path) -> FileRecord {
        let extension = normalize_extension(path);
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "could not stat file; using zero size");
                0
            }
        };

        let ext = extension.as_str();
        let metadata = if IMAGE_EXTENSIONS.contains(&ext) {
            Metadata::Image {
                size,
                dimensions: read_dimensions(path),
                format: extension.clone(),
            }
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Metadata::Video {
                size,
                duration: read_duration(path),
                resolution: (0, 0),
                codec: "unknown".to_string(),
            }
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Metadata::Audio {
                size,
                duration: read_duration(path),
                format: extension.clone(),
            }
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Metadata::Document {
                size,
                page_count: estimate_pages(path, ext),
                author: None,
            }
        } else {
            Metadata::Generic { size }
        };

        FileRecord::new(path, metadata)
    }
}

/// `(width, height)` from the image header, `(0, 0)` if unreadable
fn read_dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "could not read image dimensions");
        (0, 0)
    })
}

/// Playback length in seconds, 0.0 if unreadable
fn read_duration(path: &Path) -> f64 {
    match lofty::read_from_path(path) {
        Ok(tagged) => tagged.properties().duration().as_secs_f64(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read duration");
            0.0
        }
    }
}

fn pdf_pages(path: &Path) -> u32 {
    match lopdf::Document::load(path) {
        Ok(doc) => u32::try_from(doc.get_pages().len()).unwrap_or(u32::MAX),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read pdf page tree");
            0
        }
    }
}

fn estimate_pages(path: &Path, ext: &str) -> u32 {
    match ext {
        "PDF" => return pdf_pages(path),
        "TXT" => {}
        _ => return 0,
    }
    match fs::read(path) {
        Ok(bytes) => {
            let chars = String::from_utf8_lossy(&bytes).chars().count();
            u32::try_from((chars / CHARS_PER_PAGE).max(1)).unwrap_or(u32::MAX)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read text file");
            0
        }
    }
}
