mod console;

use anyhow::{Context, Result};
use clap::Parser;
use dircheck_core::{ScanError, ScanSettings, Scanner, SetupError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleProgress;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan a directory tree for structurally corrupt files", long_about = None)]
struct Cli {
    /// Directory to scan (prompted for when omitted)
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Output JSON file (default: file_check_log_<timestamp>.json inside the directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of files evaluated in parallel
    #[arg(long)]
    threads: Option<usize>,

    /// Do not compute SHA-256 digests
    #[arg(long)]
    skip_hashes: bool,

    /// JSON settings file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = resolve_settings(&cli)?;
    debug!(?settings, "resolved settings");

    println!("Scanning {}...", settings.directory.display());
    let scanner = Scanner::new(settings);
    let summary = match scanner.scan(&ConsoleProgress) {
        Ok(summary) => summary,
        Err(ScanError::Setup(SetupError::InvalidDirectory(path))) => {
            eprintln!("Invalid directory path: {}", path.display());
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("scan aborted"),
    };

    println!();
    println!("Scan completed in {:.2}s", summary.elapsed.as_secs_f64());
    println!("Results saved to: {}", summary.output.display());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// defaults < --config file < DIRCHECK_THREADS < flags
fn resolve_settings(cli: &Cli) -> Result<ScanSettings> {
    let mut settings = match &cli.config {
        Some(path) => ScanSettings::load(path)?,
        None => ScanSettings::default(),
    }
    .apply_env();

    if let Some(directory) = &cli.directory {
        settings.directory = directory.clone();
    }
    if let Some(output) = &cli.output {
        settings.output = Some(output.clone());
    }
    if let Some(threads) = cli.threads {
        settings.threads = threads;
    }
    if cli.skip_hashes {
        settings.skip_hashes = true;
    }
    if settings.directory.as_os_str().is_empty() {
        settings.directory = prompt_directory()?;
    }
    Ok(settings)
}

fn prompt_directory() -> Result<PathBuf> {
    print!("Enter the directory path to scan: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading directory from stdin")?;
    Ok(PathBuf::from(line.trim()))
}
