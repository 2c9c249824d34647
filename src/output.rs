//! CLI output formatting for the build pipeline.
//!
//! # Output Format
//!
//! ```text
//! ==> Building /home/me/site → public
//! Cleared public (2 removed)
//!     Removed: about.html
//!     Removed: blog
//! Synced static/ (3 copied, 1 removed, 5 unchanged)
//! Thumbnails static/img/gallery (from src)
//!     static/img/gallery/.thumbs/a.jpg (200x200)
//! src/index.html → index.html
//!     Template: home.template
//! src/notes.txt (skipped)
//! ==> Generated 1 page, 0 directories, 1 thumbnail (1 skipped)
//! ```
//!
//! # Architecture
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability; the CLI prints the lines from its event thread. Format
//! functions are pure: no I/O, no side effects.

use crate::config::DEFAULT_TEMPLATE_NAME;
use crate::pipeline::{BuildEvent, BuildSummary};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn display(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}

/// Display lines for one pipeline event.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::OutputCleared { output, removed } => {
            let mut lines = vec![format!("Cleared {} ({} removed)", display(output), removed.len())];
            lines.extend(
                removed
                    .iter()
                    .map(|p| format!("{}Removed: {}", indent(1), display(p))),
            );
            lines
        }
        BuildEvent::StaticSynced {
            copied,
            removed,
            unchanged,
        } => vec![format!(
            "Synced static/ ({copied} copied, {removed} removed, {unchanged} unchanged)"
        )],
        BuildEvent::ThumbnailsStarted { directory, subpath } => vec![format!(
            "Thumbnails static/{subpath} (from {})",
            display(directory)
        )],
        BuildEvent::ThumbnailWritten { output, dimensions } => vec![format!(
            "{}{} ({}x{})",
            indent(1),
            display(output),
            dimensions.width,
            dimensions.height
        )],
        BuildEvent::PageRendered {
            source,
            output,
            template,
        } => {
            let mut lines = vec![format!("{} → {}", display(source), display(output))];
            if template != DEFAULT_TEMPLATE_NAME {
                lines.push(format!("{}Template: {template}", indent(1)));
            }
            lines
        }
        BuildEvent::FileSkipped { source } => vec![format!("{} (skipped)", display(source))],
    }
}

/// Closing line for a finished build.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let stats = &summary.generate;
    let mut line = format!(
        "==> Generated {}, {}, {}",
        count(stats.pages, "page", "pages"),
        count(stats.directories, "directory", "directories"),
        count(stats.thumbnails, "thumbnail", "thumbnails"),
    );
    if stats.skipped > 0 {
        line.push_str(&format!(" ({} skipped)", stats.skipped));
    }
    vec![line]
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}
