//! dirsum: list a directory's entries by total size, on the console or over HTTP.

mod cli;

use anyhow::{Context, Result};
use cli::{Args, Command};
use dirsum::display::{self, Display};
use dirsum::{ServerConfig, server};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse_args();

    // Logging setup
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Command::Scan { path, quiet } => run_scan(&args, path, *quiet),
        Command::Serve { root, host, port } => run_serve(args.server_config(root, host, *port)),
    }
}

fn run_serve(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime
        .block_on(server::serve(config))
        .context("HTTP server failed")
}

fn run_scan(args: &Args, path: &Path, quiet: bool) -> Result<()> {
    let started = Instant::now();

    let spinner = display::progress_spinner();
    let scanner = args
        .scan_options()
        .scanner()
        .with_progress(display::spinner_callback(&spinner));

    let scanned = scanner.scan(path);
    spinner.finish_and_clear();
    let mut result = scanned?;

    result.sort(args.sort);

    let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Display::new()
        .quiet(quiet)
        .print_results(&result, &root, started.elapsed());

    Ok(())
}
