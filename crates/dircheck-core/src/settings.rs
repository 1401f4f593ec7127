use crate::error::SetupError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_THREADS: &str = "DIRCHECK_THREADS";

/// Available parallelism minus one, never below one.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// `file_check_log_<yyyyMMdd_HHmmss>.json` inside `directory`.
pub fn default_output_path(directory: &Path, now: DateTime<Utc>) -> PathBuf {
    directory.join(format!(
        "file_check_log_{}.json",
        now.format("%Y%m%d_%H%M%S")
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanSettings {
    pub directory: PathBuf,
    /// `None` means "derive from the directory at scan time".
    pub output: Option<PathBuf>,
    pub threads: usize,
    pub skip_hashes: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            output: None,
            threads: default_threads(),
            skip_hashes: false,
        }
    }
}

impl ScanSettings {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_skip_hashes(mut self, skip: bool) -> Self {
        self.skip_hashes = skip;
        self
    }

    /// Load settings from a JSON file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let file = std::fs::File::open(path).map_err(|e| SetupError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_reader(file).map_err(|e| SetupError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply `DIRCHECK_THREADS` if it is set to a number.
    pub fn apply_env(mut self) -> Self {
        if let Some(threads) = std::env::var(ENV_THREADS)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.threads = threads;
        }
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.threads == 0 {
            return Err(SetupError::InvalidThreads(self.threads));
        }
        Ok(())
    }

    pub fn resolved_output(&self, now: DateTime<Utc>) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.directory, now))
    }
}
