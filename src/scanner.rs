//! Top-level scanning: one bounded-parallel unit per immediate child of the
//! root, directories summed with a serial jwalk traversal.

use crate::error::ScanError;
use crate::node::{Entry, ScanResult};
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Point-in-time view of a running scan, handed to progress callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Children whose size is known
    pub finished: u64,
    /// Children found in the root
    pub total: u64,
    /// Bytes accounted so far
    pub bytes: u64,
}

/// Called after every finished child. Runs on worker threads.
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Shared counters updated by the workers.
#[derive(Default)]
struct ScanProgress {
    finished: AtomicU64,
    total: AtomicU64,
    bytes: AtomicU64,
}

impl ScanProgress {
    fn record(&self, size: u64) -> ProgressSnapshot {
        let bytes = self.bytes.fetch_add(size, Ordering::Relaxed) + size;
        let finished = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
        ProgressSnapshot {
            finished,
            total: self.total.load(Ordering::Relaxed),
            bytes,
        }
    }
}

/// Size totals for one subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeSize {
    /// Sum of the apparent sizes of all regular files
    pub bytes: u64,
    /// Number of regular files counted
    pub files: u64,
    /// Number of paths skipped because they could not be read
    pub errors: u64,
}

impl SubtreeSize {
    /// Account one item of a walk rooted at `root`.
    fn record(&mut self, root: &Path, entry_result: jwalk::Result<jwalk::DirEntry<((), ())>>) {
        match entry_result {
            Ok(entry) => {
                // jwalk reports a failed read_dir on the directory's own entry
                if let Some(err) = &entry.read_children_error {
                    warn!(path = %entry.path().display(), error = %err, "skipping unreadable directory");
                    self.errors += 1;
                }
                if !entry.file_type().is_file() {
                    return;
                }
                match entry.metadata() {
                    Ok(metadata) => {
                        self.bytes += metadata.len();
                        self.files += 1;
                    }
                    Err(err) => {
                        warn!(path = %entry.path().display(), error = %err, "skipping unreadable file");
                        self.errors += 1;
                    }
                }
            }
            Err(err) => {
                let failed = err.path().unwrap_or(root).display().to_string();
                warn!(path = %failed, error = %err, "skipping unreadable path");
                self.errors += 1;
            }
        }
    }
}

/// Sum the apparent size of every regular file below `path`.
///
/// Directories and symlinks contribute nothing themselves and links are not
/// followed. Anything unreadable is logged, counted and skipped. The walk is
/// iterative, so deep trees cannot exhaust the stack.
pub fn subtree_size(path: &Path) -> SubtreeSize {
    let mut total = SubtreeSize::default();

    let walker = WalkDir::new(path)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false);

    for entry_result in walker {
        total.record(path, entry_result);
    }

    total
}

/// An immediate child of the root as found by the listing.
struct Child {
    path: PathBuf,
    /// File type reported by the listing, used when stat fails later
    listed_as_dir: bool,
}

/// Bounded set of worker threads that measure children.
///
/// Cloning shares the same threads, so every scan handed a clone competes for
/// the same `max_in_flight` workers.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Start a pool of `max_in_flight` threads
    pub fn new(max_in_flight: NonZeroUsize) -> Result<Self, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_in_flight.get())
            .thread_name(|i| format!("dirsum-scan-{i}"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn max_in_flight(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Scanner configuration
#[derive(Clone)]
pub struct Scanner {
    /// Upper bound on children measured at the same time
    pub max_in_flight: NonZeroUsize,
    /// Shared workers; when unset each scan starts its own pool
    pool: Option<WorkerPool>,
    progress: Option<ProgressCallback>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            max_in_flight: crate::config::default_max_in_flight(),
            pool: None,
            progress: None,
        }
    }
}

impl Scanner {
    /// Create a new Scanner with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of children measured concurrently
    pub fn with_max_in_flight(mut self, max_in_flight: NonZeroUsize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Run every scan on `pool` instead of starting a pool per scan
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        if let Some(max_in_flight) = NonZeroUsize::new(pool.max_in_flight()) {
            self.max_in_flight = max_in_flight;
        }
        self.pool = Some(pool);
        self
    }

    /// Report progress after each finished child
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Scan the immediate children of `root`.
    ///
    /// Fails only when the root itself is unusable. The returned entries are
    /// in no particular order.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        let root = resolve_root(root)?;
        let (children, listing_errors) = list_children(&root)?;

        debug!(
            root = %root.display(),
            children = children.len(),
            max_in_flight = self.max_in_flight.get(),
            "starting scan"
        );

        let progress = ScanProgress::default();
        progress
            .total
            .store(children.len() as u64, Ordering::Relaxed);

        let pool = match &self.pool {
            Some(pool) => pool.clone(),
            None => WorkerPool::new(self.max_in_flight)?,
        };

        // Each worker builds its own part of the list; rayon merges them
        // once every child is done.
        let measured: Vec<(Entry, u64)> = pool.pool.install(|| {
            children
                .into_par_iter()
                .map(|child| {
                    let (entry, errors) = measure_child(child);
                    let snapshot = progress.record(entry.size);
                    if let Some(callback) = &self.progress {
                        callback(snapshot);
                    }
                    (entry, errors)
                })
                .collect()
        });

        let child_errors: u64 = measured.iter().map(|(_, errors)| errors).sum();
        let entries = measured.into_iter().map(|(entry, _)| entry).collect();
        let result = ScanResult::from_entries(entries, listing_errors + child_errors);

        debug!(
            root = %root.display(),
            entries = result.len(),
            total_size = result.total_size,
            errors = result.error_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );

        Ok(result)
    }
}

/// Canonicalize the root and make sure it is a directory.
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved = root.canonicalize().map_err(|_| ScanError::RootNotFound {
        path: root.to_path_buf(),
    })?;

    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory { path: resolved });
    }

    Ok(resolved)
}

/// List the immediate children of `root`, counting entries the listing
/// itself could not produce.
fn list_children(root: &Path) -> Result<(Vec<Child>, u64), ScanError> {
    let read_dir = fs::read_dir(root).map_err(|source| ScanError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut children = Vec::new();
    let mut errors = 0;

    for dir_entry in read_dir {
        match dir_entry {
            Ok(dir_entry) => children.push(Child {
                path: dir_entry.path(),
                listed_as_dir: dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
            }),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable directory entry");
                errors += 1;
            }
        }
    }

    Ok((children, errors))
}

/// Compute the size of one child. Returns the entry and the number of paths
/// skipped while measuring it.
fn measure_child(child: Child) -> (Entry, u64) {
    let metadata = match fs::symlink_metadata(&child.path) {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!(path = %child.path.display(), error = %err, "cannot stat entry, reporting size 0");
            return (Entry::new(child.path, 0, child.listed_as_dir), 1);
        }
    };

    if metadata.is_dir() {
        let subtree = subtree_size(&child.path);
        (Entry::new(child.path, subtree.bytes, true), subtree.errors)
    } else {
        (Entry::new(child.path, metadata.len(), false), 0)
    }
}
