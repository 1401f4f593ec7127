//! Error types for dircheck.
//!
//! Only run-level failures live here. Anything that goes wrong with a single
//! file is folded into that file's record instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions detected before any file is dispatched.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid directory path: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("cannot write output file {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("thread count must be at least 1 (got {0})")]
    InvalidThreads(usize),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("cannot load settings from {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The shared output stream failed while records were being written.
    #[error("output stream error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
