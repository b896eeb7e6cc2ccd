//! Command-line argument parsing using clap derive macros.
//!
//! Every setting can also come from the environment, which is how the
//! server is usually configured.

use clap::{Parser, Subcommand};
use dirsum::{ScanOptions, ServerConfig, SortOrder};
use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Report the entries of a directory sorted by their total size.
#[derive(Parser, Debug)]
#[command(name = "dirsum")]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Sort order used when none is requested: `asc`, anything else sorts
    /// largest first
    #[arg(
        short,
        long,
        value_name = "asc|desc",
        env = "DIRSUM_SORT",
        default_value = "desc",
        value_parser = parse_sort,
        global = true
    )]
    pub sort: SortOrder,

    /// Maximum number of entries measured at the same time
    /// (defaults to number of CPU cores)
    #[arg(short = 'j', long = "jobs", env = "DIRSUM_MAX_IN_FLIGHT", global = true)]
    pub jobs: Option<NonZeroUsize>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

fn parse_sort(token: &str) -> Result<SortOrder, Infallible> {
    Ok(SortOrder::parse(token))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory and print its entries by size
    Scan {
        /// Target directory to scan (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Print entry lines only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Serve the JSON API and the web front-end
    Serve {
        /// Directory listed when a request names none
        #[arg(long, env = "DIRSUM_ROOT", default_value = ".")]
        root: PathBuf,

        /// Address to listen on
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn scan_options(&self) -> ScanOptions {
        self.jobs
            .map(|max_in_flight| ScanOptions { max_in_flight })
            .unwrap_or_default()
    }

    /// Combine the `serve` arguments with the global settings
    pub fn server_config(&self, root: &Path, host: &str, port: u16) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
            root: root.to_path_buf(),
            default_sort: self.sort,
            scan: self.scan_options(),
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match (&self.command, self.verbose) {
            (_, true) => "debug",
            (Command::Serve { .. }, false) => "info",
            (Command::Scan { .. }, false) => "warn",
        }
    }
}
