use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::warn;

/// Streaming read size (64KB)
const BUFFER_SIZE: usize = 64 * 1024;

/// SHA-256 of the file content as lowercase hex.
pub fn try_digest_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Best-effort digest: any I/O failure yields `None`.
pub fn digest_file(path: &Path) -> Option<String> {
    match try_digest_file(path) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot hash file");
            None
        }
    }
}
