//! Concurrent directory integrity checker.
//!
//! Walks a directory tree, checks every file's header against a static
//! magic-byte table, optionally computes a SHA-256 digest, and streams one
//! JSON record per file into a single array document.

pub mod digest;
pub mod error;
pub mod evaluator;
pub mod progress;
pub mod record;
pub mod scanner;
pub mod settings;
pub mod signature;
pub mod sink;

pub use error::{ScanError, SetupError};
pub use evaluator::evaluate;
pub use progress::{NoopObserver, ProgressObserver, ScanProgress};
pub use record::FileRecord;
pub use scanner::{RunCounters, ScanSummary, Scanner};
pub use settings::ScanSettings;
pub use signature::Verdict;
pub use sink::JsonArraySink;
