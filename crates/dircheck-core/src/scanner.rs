//! Concurrent scan coordinator.
//!
//! The tree is walked lazily with `walkdir` and fed through `par_bridge` into
//! a dedicated rayon pool sized by `ScanSettings::threads`, so at most that
//! many files are evaluated at once and the full file list is never held in
//! memory. Workers hand finished records to the shared [`JsonArraySink`] and
//! bump the run's [`RunCounters`].

use crate::error::{Result, ScanError, SetupError};
use crate::evaluator::evaluate;
use crate::progress::{ProgressObserver, ScanProgress};
use crate::settings::ScanSettings;
use crate::sink::JsonArraySink;
use chrono::Utc;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Observers are notified every this many completed files.
pub const PROGRESS_INTERVAL: u64 = 10;

/// Counters for a single run. Owned by the coordinator and shared by
/// reference with the workers.
#[derive(Debug, Default)]
pub struct RunCounters {
    processed: AtomicU64,
    corrupt: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed file and return the counters as seen right after.
    pub fn record(&self, corrupt: bool) -> ScanProgress {
        // corrupt goes first so a snapshot never shows more corrupt than processed
        let corrupt = if corrupt {
            self.corrupt.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.corrupt.load(Ordering::SeqCst)
        };
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        ScanProgress { processed, corrupt }
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            processed: self.processed.load(Ordering::SeqCst),
            corrupt: self.corrupt.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub processed: u64,
    pub corrupt: u64,
    pub output: PathBuf,
    pub elapsed: Duration,
}

pub struct Scanner {
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Check the root and return its canonical form.
    fn prepare_root(&self) -> std::result::Result<PathBuf, SetupError> {
        let dir = &self.settings.directory;
        if !dir.is_dir() {
            return Err(SetupError::InvalidDirectory(dir.clone()));
        }
        dir.canonicalize()
            .map_err(|_| SetupError::InvalidDirectory(dir.clone()))
    }

    /// Run a full scan. Only setup problems and failures of the output stream
    /// itself are returned as errors; per-file problems end up in the records.
    pub fn scan(&self, observer: &dyn ProgressObserver) -> Result<ScanSummary> {
        let started = Instant::now();
        self.settings.validate()?;
        let root = self.prepare_root()?;
        let output = self.settings.resolved_output(Utc::now());

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .thread_name(|i| format!("dircheck-worker-{i}"))
            .build()
            .map_err(|e| SetupError::ThreadPool(e.to_string()))?;

        let unwritable = |source: io::Error| SetupError::OutputUnwritable {
            path: output.clone(),
            source,
        };
        let file = File::create(&output).map_err(unwritable)?;
        let sink = JsonArraySink::open(BufWriter::new(file)).map_err(unwritable)?;
        // keep our own output out of the scan when it lives under the root
        let exclude = output.canonicalize().ok();

        info!(
            root = %root.display(),
            output = %output.display(),
            threads = self.settings.threads,
            skip_hashes = self.settings.skip_hashes,
            "scan started"
        );

        let counters = RunCounters::new();
        let output_error: Mutex<Option<io::Error>> = Mutex::new(None);
        let compute_digest = !self.settings.skip_hashes;

        pool.install(|| {
            discover_files(&root, exclude)
                .par_bridge()
                .for_each(|path| {
                    let record = evaluate(&path, compute_digest);
                    if let Err(e) = sink.append(&record) {
                        error!(path = %path.display(), error = %e, "failed to write record");
                        output_error.lock().get_or_insert(e);
                    }
                    let progress = counters.record(record.is_corrupt);
                    if progress.processed % PROGRESS_INTERVAL == 0 {
                        observer.on_progress(progress);
                    }
                });
        });

        sink.close().map_err(ScanError::Output)?;
        if let Some(e) = output_error.into_inner() {
            return Err(ScanError::Output(e));
        }

        let totals = counters.snapshot();
        let summary = ScanSummary {
            processed: totals.processed,
            corrupt: totals.corrupt,
            output,
            elapsed: started.elapsed(),
        };
        info!(
            processed = summary.processed,
            corrupt = summary.corrupt,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "scan completed"
        );
        observer.on_complete(&summary);
        Ok(summary)
    }
}

/// Lazily yield every file under `root`. Directory symlinks are not
/// descended into. A symlink to a file is yielded, and so is a dangling one
/// so that it ends up as a corrupt record. Entries that cannot be read are
/// logged and skipped.
pub fn discover_files(
    root: &Path,
    exclude: Option<PathBuf>,
) -> impl Iterator<Item = PathBuf> + Send {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                if entry.path_is_symlink() {
                    if !link_counts_as_file(entry.path()) {
                        debug!(path = %entry.path().display(), "skipping directory symlink");
                        return None;
                    }
                } else if !entry.file_type().is_file() {
                    return None;
                }
                let path = entry.into_path();
                if exclude.as_deref() == Some(path.as_path()) {
                    return None;
                }
                Some(path)
            }
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                None
            }
        })
}

fn link_counts_as_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "dangling symlink");
            true
        }
    }
}
