//! Error types for scanning operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole scan.
///
/// Problems with individual children never show up here: they are logged,
/// counted in [`ScanResult::error_count`](crate::node::ScanResult) and the
/// child contributes zero bytes.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root does not exist or is not a directory.
    #[error("Cannot access path '{}': No such file or directory", path.display())]
    RootNotFound { path: PathBuf },

    /// The root exists but is not a directory.
    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// The root exists but its listing could not be read.
    #[error("Failed to read directory '{}': {source}", path.display())]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bounded worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ScanError {
    /// Whether this error means the requested root is unusable, as opposed to
    /// an internal failure while scanning it.
    pub fn is_root_not_found(&self) -> bool {
        matches!(self, Self::RootNotFound { .. } | Self::NotADirectory { .. })
    }
}
