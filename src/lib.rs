//! dirsum: report the immediate entries of a directory by total size.
//!
//! The core measures every top-level entry of a root concurrently, summing
//! whole subtrees for directories, and sorts the result. It is exposed on
//! the console by the `dirsum` binary and as JSON over HTTP by [`server`].

pub mod config;
pub mod display;
pub mod error;
pub mod node;
pub mod scanner;
pub mod server;
pub mod size;

pub use config::{ScanOptions, ServerConfig};
pub use error::ScanError;
pub use node::{Entry, ReportEntry, ScanResult, SortOrder};
pub use scanner::{Scanner, SubtreeSize, WorkerPool, subtree_size};
pub use size::format_size;
