use crate::signature::Verdict;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// One scanned file, as written to the output document.
///
/// `hash` and `error_message` serialize as `null` rather than being omitted,
/// so every record carries the same ten fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub size: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_modified: DateTime<Utc>,
    /// When this file was scanned.
    #[serde(serialize_with = "serialize_timestamp")]
    pub revision_date: DateTime<Utc>,
    pub file_extension: String,
    pub hash: Option<String>,
    pub is_corrupt: bool,
    pub error_message: Option<String>,
    pub has_invalid_chars: bool,
}

/// Filesystem facts gathered before the verdict is known.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
    pub file_extension: String,
    pub has_invalid_chars: bool,
}

impl FileRecord {
    /// `error_message` is derived from the verdict, so it is present exactly
    /// when the record is corrupt.
    pub fn new(facts: FileFacts, verdict: Verdict, hash: Option<String>) -> Self {
        let (is_corrupt, error_message) = match verdict {
            Verdict::Corrupt(reason) => (true, Some(reason)),
            Verdict::Intact | Verdict::Unsupported => (false, None),
        };
        Self {
            name: facts.name,
            path: facts.path,
            size: facts.size,
            last_modified: facts.last_modified,
            revision_date: facts.revision_date,
            file_extension: facts.file_extension,
            hash,
            is_corrupt,
            error_message,
            has_invalid_chars: facts.has_invalid_chars,
        }
    }
}

// ISO-8601 UTC with a `Z` suffix, e.g. 2024-03-09T07:05:01.123456Z
fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}
