//! Turning category labels into destination paths

use crate::filters::UNKNOWN_LABEL;
use std::path::{Path, PathBuf};

/// Longest label kept, in characters
pub const MAX_LABEL_LEN: usize = 255;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a category label safe to use as one directory name
///
/// Surrounding whitespace is removed, then invalid characters and control
/// characters become `_` and the result is cut to 255 characters. Labels
/// left empty or made only of dots become `unknown`.
///
/// ```
/// use tiersort::sorter::paths::sanitize_label;
///
/// assert_eq!(sanitize_label(" a/b:c "), "a_b_c");
/// assert_eq!(sanitize_label(".."), "unknown");
/// ```
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    let replaced: String = label
        .trim()
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let truncated: String = replaced.chars().take(MAX_LABEL_LEN).collect();
    let cleaned = truncated.trim_end();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNKNOWN_LABEL.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Directory a file with `category_path` is placed in
#[must_use]
pub fn build_target_dir(root: &Path, category_path: &[String]) -> PathBuf {
    let mut dir = root.to_path_buf();
    for label in category_path {
        dir.push(sanitize_label(label));
    }
    dir
}

/// Default destination for `source`: a `<name>_sorted` sibling
#[must_use]
pub fn default_destination(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_string_lossy();
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    Some(parent.join(format!("{name}_sorted")))
}
