//! Data structures representing top-level entries with their sizes.

use std::path::PathBuf;

use serde::Serialize;

use crate::size::format_size;

/// One immediate child of a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path to the entry (the root joined with the child's name)
    pub path: PathBuf,
    /// Own length for files, recursive total for directories
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
}

impl Entry {
    /// Create a new Entry
    pub fn new(path: PathBuf, size: u64, is_dir: bool) -> Self {
        Self { path, size, is_dir }
    }

    /// Final path component, for display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Direction for [`ScanResult::sort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse a sort token. Only exactly `"asc"` selects ascending; every
    /// other value, including garbage, falls back to descending.
    pub fn parse(token: &str) -> Self {
        if token == "asc" {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Entries of one scan plus aggregate statistics.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// One entry per immediate child of the root
    pub entries: Vec<Entry>,
    /// Sum of all entry sizes
    pub total_size: u64,
    /// Number of paths skipped because they could not be read
    pub error_count: u64,
}

impl ScanResult {
    /// Build a result from collected entries, computing the total.
    pub fn from_entries(entries: Vec<Entry>, error_count: u64) -> Self {
        let total_size = entries.iter().map(|e| e.size).sum();
        Self {
            entries,
            total_size,
            error_count,
        }
    }

    /// Sort entries by size in place. Equal sizes are ordered by path so the
    /// output does not depend on which worker finished first.
    pub fn sort(&mut self, order: SortOrder) {
        self.entries.sort_unstable_by(|a, b| {
            let by_size = match order {
                SortOrder::Ascending => a.size.cmp(&b.size),
                SortOrder::Descending => b.size.cmp(&a.size),
            };
            by_size.then_with(|| a.path.cmp(&b.path))
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into the wire shape served over HTTP, keeping the current order.
    pub fn into_report(self) -> Vec<ReportEntry> {
        self.entries.into_iter().map(ReportEntry::from).collect()
    }
}

/// A formatted entry as served by `/api/files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub path: String,
    pub size: String,
    pub is_dir: bool,
}

impl From<Entry> for ReportEntry {
    fn from(entry: Entry) -> Self {
        Self {
            path: entry.path.display().to_string(),
            size: format_size(entry.size),
            is_dir: entry.is_dir,
        }
    }
}
