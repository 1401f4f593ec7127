//! Magic-byte signature table and header classification.
//!
//! Every supported format is described as data: a set of extensions and the
//! byte pattern its first [`HEADER_LEN`] bytes must satisfy. Classification is
//! a table lookup followed by a single pattern match, so adding a format means
//! adding a row to [`RULES`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes read from each file. Enough for every rule below.
pub const HEADER_LEN: usize = 8;

pub const UNSUPPORTED_REASON: &str = "unsupported extension";

/// Expected byte pattern for a format.
#[derive(Debug, Clone, Copy)]
pub enum Magic {
    /// Text-like formats carry no signature.
    None,
    /// The whole header must equal these bytes.
    Exact(&'static [u8; HEADER_LEN]),
    /// The header must start with these bytes.
    Prefix(&'static [u8]),
    /// Each `(offset, allowed)` slot must hold one of the allowed bytes;
    /// offsets not listed are unconstrained.
    Positional(&'static [(usize, &'static [u8])]),
}

impl Magic {
    pub fn matches(&self, header: &[u8; HEADER_LEN]) -> bool {
        match self {
            Magic::None => true,
            Magic::Exact(expected) => header == *expected,
            Magic::Prefix(prefix) => header.starts_with(prefix),
            Magic::Positional(slots) => slots.iter().all(|(offset, allowed)| {
                header
                    .get(*offset)
                    .is_some_and(|byte| allowed.contains(byte))
            }),
        }
    }
}

#[derive(Debug)]
pub struct SignatureRule {
    /// Name used in the "Invalid <FORMAT> header" reason.
    pub format: &'static str,
    /// Lowercase extensions without the leading dot.
    pub extensions: &'static [&'static str],
    pub magic: Magic,
}

const PNG_SIGNATURE: [u8; HEADER_LEN] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

// GIF87a / GIF89a
const GIF_SLOTS: &[(usize, &[u8])] = &[
    (0, b"G"),
    (1, b"I"),
    (2, b"F"),
    (3, b"8"),
    (4, b"79"),
    (5, b"a"),
];

pub static RULES: &[SignatureRule] = &[
    SignatureRule {
        format: "TEXT",
        extensions: &["txt", "csv", "html", "json", "js", "css", "scss", "map"],
        magic: Magic::None,
    },
    SignatureRule {
        format: "PDF",
        extensions: &["pdf"],
        magic: Magic::Prefix(b"%PDF-"),
    },
    SignatureRule {
        format: "JPEG",
        extensions: &["jpg", "jpeg"],
        magic: Magic::Prefix(&[0xFF, 0xD8]),
    },
    SignatureRule {
        format: "PNG",
        extensions: &["png"],
        magic: Magic::Exact(&PNG_SIGNATURE),
    },
    SignatureRule {
        format: "GIF",
        extensions: &["gif"],
        magic: Magic::Positional(GIF_SLOTS),
    },
    // Office Open XML documents are ZIP containers.
    SignatureRule {
        format: "ZIP",
        extensions: &["zip", "docx", "xlsx", "pptx"],
        magic: Magic::Prefix(b"PK"),
    },
    SignatureRule {
        format: "RAR",
        extensions: &["rar"],
        magic: Magic::Prefix(b"Rar!"),
    },
    // OLE compound document
    SignatureRule {
        format: "PPT",
        extensions: &["ppt"],
        magic: Magic::Prefix(&[0xD0, 0xCF, 0x11, 0xE0]),
    },
];

/// Outcome of checking one file's structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Intact,
    /// The extension is not in the table; unknown formats are not judged.
    Unsupported,
    Corrupt(String),
}

impl Verdict {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Verdict::Corrupt(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            Verdict::Intact => "",
            Verdict::Unsupported => UNSUPPORTED_REASON,
            Verdict::Corrupt(reason) => reason,
        }
    }
}

/// Lowercase, dot-less form of an extension tag (".PNG" -> "png").
pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

pub fn lookup(extension: &str) -> Option<&'static SignatureRule> {
    let ext = normalize_extension(extension);
    if ext.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|rule| rule.extensions.contains(&ext.as_str()))
}

/// Pure classification of a header against the rule for `extension`.
pub fn classify(extension: &str, header: &[u8; HEADER_LEN]) -> Verdict {
    match lookup(extension) {
        None => Verdict::Unsupported,
        Some(rule) if rule.magic.matches(header) => Verdict::Intact,
        Some(rule) => Verdict::Corrupt(format!("Invalid {} header", rule.format)),
    }
}

/// Read the first [`HEADER_LEN`] bytes. Shorter files are zero-padded.
pub fn read_header(path: &Path) -> io::Result<[u8; HEADER_LEN]> {
    let mut file = File::open(path)?;
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(header)
}

/// Classify a file on disk. Never fails: read errors become a corrupt verdict
/// carrying the error text.
pub fn check_file(path: &Path) -> Verdict {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    if lookup(&extension).is_none() {
        return Verdict::Unsupported;
    }

    match read_header(path) {
        Ok(header) => classify(&extension, &header),
        Err(e) => Verdict::Corrupt(e.to_string()),
    }
}

/// True if `name` contains a character the host filesystem forbids in names.
pub fn has_invalid_chars(name: &str) -> bool {
    name.chars().any(is_forbidden_char)
}

#[cfg(windows)]
fn is_forbidden_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 32
}

#[cfg(not(windows))]
fn is_forbidden_char(c: char) -> bool {
    matches!(c, '/' | '\0')
}
