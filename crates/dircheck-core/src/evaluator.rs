//! Per-file evaluation: metadata, signature check, digest and filename check
//! combined into one [`FileRecord`].
//!
//! Each step captures its own failure, so a file that vanishes or cannot be
//! read still yields a complete record.

use crate::digest::digest_file;
use crate::record::{FileFacts, FileRecord};
use crate::signature::{check_file, has_invalid_chars, Verdict};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub fn evaluate(path: &Path, compute_digest: bool) -> FileRecord {
    let revision_date = Utc::now();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let (size, last_modified, metadata_error) = match fs::metadata(path) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .ok()
                .map(DateTime::<Utc>::from)
                .unwrap_or(revision_date);
            (meta.len(), modified, None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file metadata");
            (0, revision_date, Some(e.to_string()))
        }
    };

    let mut verdict = check_file(path);
    if let Some(err) = metadata_error {
        if !verdict.is_corrupt() {
            verdict = Verdict::Corrupt(err);
        }
    }

    let hash = if compute_digest { digest_file(path) } else { None };

    let facts = FileFacts {
        has_invalid_chars: has_invalid_chars(&name),
        name,
        path: path.display().to_string(),
        size,
        last_modified,
        revision_date,
        file_extension,
    };

    debug!(path = %facts.path, verdict = ?verdict, "evaluated file");
    FileRecord::new(facts, verdict, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn valid_png_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Image.PNG");
        let mut f = File::create(&path).unwrap();
        f.write_all(&PNG).unwrap();
        f.write_all(b"rest of the image").unwrap();
        drop(f);

        let record = evaluate(&path, true);
        assert_eq!(record.name, "Image.PNG");
        assert_eq!(record.file_extension, ".png");
        assert_eq!(record.size, 25);
        assert!(!record.is_corrupt);
        assert!(record.error_message.is_none());
        assert_eq!(record.hash.as_ref().map(String::len), Some(64));
        assert!(!record.has_invalid_chars);
        assert!(record.last_modified <= record.revision_date);
    }

    #[test]
    fn skip_digest_leaves_hash_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "anything").unwrap();
        let record = evaluate(&path, false);
        assert!(record.hash.is_none());
        assert!(!record.is_corrupt);
    }

    #[test]
    fn digest_independent_of_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "not a pdf").unwrap();
        let record = evaluate(&path, true);
        assert!(record.is_corrupt);
        assert_eq!(record.error_message.as_deref(), Some("Invalid PDF header"));
        assert!(record.hash.is_some());
    }

    #[test]
    fn vanished_file_is_corrupt_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vanished.bin");
        let record = evaluate(&path, true);
        assert!(record.is_corrupt);
        assert!(record.error_message.is_some());
        assert!(record.hash.is_none());
        assert_eq!(record.size, 0);
        assert_eq!(record.name, "vanished.bin");
        assert_eq!(record.file_extension, ".bin");
    }

    #[test]
    fn no_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Makefile");
        fs::write(&path, "all:").unwrap();
        let record = evaluate(&path, false);
        assert_eq!(record.file_extension, "");
        assert!(!record.is_corrupt);
    }
}
