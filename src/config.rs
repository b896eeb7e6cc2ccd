//! Runtime configuration shared by the CLI and the HTTP server.

use crate::node::SortOrder;
use crate::scanner::Scanner;
use std::num::NonZeroUsize;
use std::path::PathBuf;

const FALLBACK_PARALLELISM: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Default bound on concurrently measured children: the number of CPU cores.
pub fn default_max_in_flight() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(FALLBACK_PARALLELISM)
}

/// Settings the scan core consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_in_flight: NonZeroUsize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl ScanOptions {
    /// Build a scanner configured with these options
    pub fn scanner(&self) -> Scanner {
        Scanner::new().with_max_in_flight(self.max_in_flight)
    }
}

/// Settings for `dirsum serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory scanned when a request has no `path`
    pub root: PathBuf,
    /// Order used when a request has no `sort`
    pub default_sort: SortOrder,
    pub scan: ScanOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            root: PathBuf::from("."),
            default_sort: SortOrder::default(),
            scan: ScanOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Address to bind, as `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.default_sort, SortOrder::Descending);
        assert!(config.scan.max_in_flight.get() >= 1);
    }

    #[test]
    fn test_scanner_uses_options() {
        let options = ScanOptions {
            max_in_flight: NonZeroUsize::new(3).unwrap(),
        };
        assert_eq!(options.scanner().max_in_flight.get(), 3);
    }
}
