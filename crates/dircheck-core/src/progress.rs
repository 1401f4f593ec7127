use crate::scanner::ScanSummary;

/// Counter snapshot handed to observers while a scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: u64,
    pub corrupt: u64,
}

/// Side channel for progress reporting. Called from worker threads.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: ScanProgress);

    fn on_complete(&self, _summary: &ScanSummary) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: ScanProgress) {}
}
