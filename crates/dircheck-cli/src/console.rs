use dircheck_core::{ProgressObserver, ScanProgress, ScanSummary};
use std::io::{self, Write};

/// Single-line progress on stdout, redrawn with `\r`.
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, progress: ScanProgress) {
        let mut out = io::stdout().lock();
        let _ = write!(
            out,
            "\rScanning... {} files | {} corrupt",
            progress.processed, progress.corrupt
        );
        let _ = out.flush();
    }

    fn on_complete(&self, summary: &ScanSummary) {
        println!(
            "\nTotal: {} files | Corrupt: {}",
            summary.processed, summary.corrupt
        );
    }
}
