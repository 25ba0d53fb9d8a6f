//! Output formatting for CLI display
//!
//! Rendering of run summaries, result trees and filter listings.

use crate::domain::{Directory, Metadata};
use crate::registry::{FilterInfo, FilterSource};
use crate::sorter::StatsReport;
use colored::Colorize;
use std::path::Path;

/// Join rendered lines, ending with a newline
fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Render the statistics of a run
#[must_use]
pub fn format_summary(report: &StatsReport, destination: &Path) -> String {
    let skipped = format!("Skipped files: {}", report.skipped_files);
    let skipped = if report.skipped_files > 0 {
        skipped.yellow().to_string()
    } else {
        skipped
    };

    let mut lines = vec![
        "RESULT:".bold().to_string(),
        format!("   Destination: {}", destination.display()),
        format!("   Total files processed: {}", report.total_files),
        format!("   {skipped}"),
    ];

    if report.total_files > 0 && !report.filters.is_empty() {
        lines.push(String::new());
        lines.push("   Files applicable to each filter:".to_string());
        lines.extend(report.filters.iter().map(|stat| {
            format!(
                "     {}: {} files ({:.1}%)",
                stat.name.cyan(),
                stat.applicable_files,
                stat.percentage
            )
        }));
    }
    join_lines(&lines)
}

/// Render a directory tree, two spaces of indent per level
#[must_use]
pub fn format_tree(directory: &Directory) -> String {
    let mut lines = Vec::new();
    let mut stack = vec![(directory, 0_usize)];

    while let Some((dir, level)) = stack.pop() {
        let indent = "  ".repeat(level);
        lines.push(format!("{indent}{}/", dir.name.blue().bold()));

        let file_indent = "  ".repeat(level + 1);
        lines.extend(
            dir.files
                .iter()
                .map(|file| format!("{file_indent}{}{}", file.name, metadata_hint(&file.metadata))),
        );

        for sub in dir.subdirectories.iter().rev() {
            stack.push((sub, level + 1));
        }
    }
    join_lines(&lines)
}

fn metadata_hint(metadata: &Metadata) -> String {
    match metadata {
        Metadata::Image { dimensions, .. } => format!(" - {}x{}", dimensions.0, dimensions.1),
        Metadata::Video { resolution, .. } => format!(" - {}x{}", resolution.0, resolution.1),
        Metadata::Document { page_count, .. } => format!(" - {page_count} pages"),
        Metadata::Audio { size, .. } | Metadata::Generic { size } => format!(" - {size} bytes"),
    }
}

/// Render the available filters with their options
#[must_use]
pub fn format_filters(filters: &[FilterInfo]) -> String {
    let mut lines = Vec::new();
    for info in filters {
        let source = match info.source {
            FilterSource::Builtin => "built-in",
            FilterSource::Plugin => "plugin",
        };
        lines.push(format!("{} ({source})", info.name.green().bold()));
        if !info.description.is_empty() {
            lines.push(format!("  {}", info.description));
        }
        for field in &info.fields {
            let default = field
                .default
                .as_ref()
                .map_or_else(|| "required".red().to_string(), |d| format!("default {d}"));
            lines.push(format!(
                "    {} <{}> [{default}] {}",
                field.name, field.kind, field.description
            ));
        }
    }
    join_lines(&lines)
}
