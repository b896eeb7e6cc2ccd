//! Console rendering of scan results.

use crate::node::{Entry, ScanResult};
use crate::scanner::{ProgressCallback, ProgressSnapshot};
use crate::size::format_size;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream::Stdout, Style};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DIR_TAG: &str = "[DIR] ";
const FILE_TAG: &str = "[FILE]";

fn tag_for(entry: &Entry) -> &'static str {
    if entry.is_dir { DIR_TAG } else { FILE_TAG }
}

/// Layout shared by plain and coloured lines.
fn format_line(tag: impl fmt::Display, name: &str, size: impl fmt::Display) -> String {
    format!("{} {} ({})", tag, name, size)
}

/// Render one entry as `"[DIR]  name (size)"` or `"[FILE] name (size)"`.
pub fn render_line(entry: &Entry) -> String {
    format_line(tag_for(entry), &entry.name(), format_size(entry.size))
}

/// Same as [`render_line`], with colour on the tag and size when stdout
/// supports it.
fn styled_line(entry: &Entry) -> String {
    let style = if entry.is_dir {
        Style::new().blue().bold()
    } else {
        Style::new().white()
    };
    let size = format_size(entry.size);
    format_line(
        tag_for(entry).if_supports_color(Stdout, |t| t.style(style)),
        &entry.name(),
        size.if_supports_color(Stdout, |t| t.green()),
    )
}

/// Console report printer
#[derive(Default)]
pub struct Display {
    /// Skip the header and footer, printing entry lines only
    pub quiet: bool,
}

impl Display {
    /// Create a new Display with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Print entry lines only
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print the scan results to stdout
    pub fn print_results(&self, result: &ScanResult, root: &Path, elapsed: Duration) {
        if !self.quiet {
            let header = format!("Directory: {}", root.display());
            println!("{}", header.if_supports_color(Stdout, |t| t.bold()));
            println!();
        }

        if result.is_empty() && !self.quiet {
            println!("{}", "No entries found.".if_supports_color(Stdout, |t| t.dimmed()));
        }

        for entry in &result.entries {
            println!("{}", styled_line(entry));
        }

        if self.quiet {
            return;
        }

        println!();
        println!(
            "Total: {} in {} entries",
            format_size(result.total_size).if_supports_color(Stdout, |t| t.green()),
            result.len()
        );
        if result.error_count > 0 {
            println!(
                "Skipped: {} unreadable paths",
                result.error_count.if_supports_color(Stdout, |t| t.red())
            );
        }
        println!("Scanned in {}", format_duration(elapsed));
    }
}

/// Spinner shown on stderr while a scan runs. Hidden when stderr is not a
/// terminal.
pub fn progress_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting scan...");
    pb
}

/// Progress callback that updates `pb` as children finish.
pub fn spinner_callback(pb: &ProgressBar) -> ProgressCallback {
    let pb = pb.clone();
    Arc::new(move |snapshot: ProgressSnapshot| {
        pb.set_message(format!(
            "Scanning: {}/{} entries | {}",
            snapshot.finished,
            snapshot.total,
            format_size(snapshot.bytes)
        ));
    })
}

/// Format a duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    match secs {
        60.. => format!("{}m {}s", secs / 60, secs % 60),
        1.. => format!("{}.{:02}s", secs, millis / 10),
        0 => format!("{}ms", millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_line() {
        let file = Entry::new(PathBuf::from("/root/a.txt"), 500, false);
        let dir = Entry::new(PathBuf::from("/root/sub"), 1500, true);
        assert_eq!(render_line(&file), "[FILE] a.txt (500 B)");
        assert_eq!(render_line(&dir), "[DIR]  sub (1.5 KB)");
    }

    #[test]
    fn test_printed_line_matches_plain_line() {
        owo_colors::set_override(false);
        let entries = [
            Entry::new(PathBuf::from("/r/big"), 2_500_000_000, true),
            Entry::new(PathBuf::from("/r/small"), 999, false),
        ];
        for entry in &entries {
            assert_eq!(styled_line(entry), render_line(entry));
        }
        assert_eq!(styled_line(&entries[0]), "[DIR]  big (2.5 GB)");
        owo_colors::unset_override();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(12)), "12ms");
        assert_eq!(format_duration(Duration::from_millis(1_250)), "1.25s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
