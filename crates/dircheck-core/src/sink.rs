//! Streaming JSON array writer shared by all scan workers.
//!
//! Records are serialized outside the lock; only the separator decision and
//! the write itself happen inside the critical section. The lock guards a
//! two-state machine ([`Framing::Empty`] / [`Framing::Populated`]) so exactly
//! one record is written bare and every later one is preceded by `,\n`.
//! The separator and the record go out in a single write, so a failed append
//! leaves the framing state as it was.

use crate::record::FileRecord;
use parking_lot::Mutex;
use std::io::{self, Write};

const SEPARATOR: &[u8] = b",\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Empty,
    /// Number of records written so far (>= 1).
    Populated(u64),
}

struct SinkState<W> {
    writer: W,
    framing: Framing,
}

pub struct JsonArraySink<W: Write + Send> {
    inner: Mutex<SinkState<W>>,
}

impl<W: Write + Send> JsonArraySink<W> {
    /// Write the opening delimiter.
    pub fn open(mut writer: W) -> io::Result<Self> {
        writer.write_all(b"[\n")?;
        Ok(Self {
            inner: Mutex::new(SinkState {
                writer,
                framing: Framing::Empty,
            }),
        })
    }

    /// Append one record. Returns its 1-based position in the document.
    pub fn append(&self, record: &FileRecord) -> io::Result<u64> {
        let mut entry = SEPARATOR.to_vec();
        serde_json::to_writer(&mut entry, record)?;
        self.append_entry(&entry)
    }

    fn append_entry(&self, entry: &[u8]) -> io::Result<u64> {
        let mut state = self.inner.lock();
        let (bytes, position) = match state.framing {
            Framing::Empty => (&entry[SEPARATOR.len()..], 1),
            Framing::Populated(n) => (entry, n + 1),
        };
        state.writer.write_all(bytes)?;
        state.framing = Framing::Populated(position);
        Ok(position)
    }

    pub fn len(&self) -> u64 {
        match self.inner.lock().framing {
            Framing::Empty => 0,
            Framing::Populated(n) => n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the closing delimiter, flush, and hand back the writer.
    pub fn close(self) -> io::Result<W> {
        let SinkState { mut writer, framing } = self.inner.into_inner();
        match framing {
            Framing::Empty => writer.write_all(b"]")?,
            Framing::Populated(_) => writer.write_all(b"\n]")?,
        }
        writer.flush()?;
        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FileFacts;
    use crate::signature::Verdict;
    use chrono::Utc;

    fn record(name: &str) -> FileRecord {
        let now = Utc::now();
        FileRecord::new(
            FileFacts {
                name: name.into(),
                path: format!("/x/{name}"),
                size: 1,
                last_modified: now,
                revision_date: now,
                file_extension: ".txt".into(),
                has_invalid_chars: false,
            },
            Verdict::Intact,
            None,
        )
    }

    #[test]
    fn empty_document() {
        let sink = JsonArraySink::open(Vec::new()).unwrap();
        assert!(sink.is_empty());
        let out = sink.close().unwrap();
        assert_eq!(out, b"[\n]");
    }

    #[test]
    fn separators() {
        let sink = JsonArraySink::open(Vec::new()).unwrap();
        assert_eq!(sink.append(&record("a.txt")).unwrap(), 1);
        assert_eq!(sink.append(&record("b.txt")).unwrap(), 2);
        assert_eq!(sink.len(), 2);
        let out = String::from_utf8(sink.close().unwrap()).unwrap();

        assert!(out.starts_with("[\n{"));
        assert!(out.ends_with("}\n]"));
        assert_eq!(out.matches("},\n{").count(), 1);

        let parsed: Vec<FileRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "a.txt");
    }

    /// Buffers everything except the `fail_on`-th write call (1-based).
    struct FailingWriter {
        buf: Vec<u8>,
        calls: usize,
        fail_on: usize,
    }

    impl FailingWriter {
        fn new(fail_on: usize) -> Self {
            Self {
                buf: Vec::new(),
                calls: 0,
                fail_on,
            }
        }
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.buf.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_surface() {
        assert!(JsonArraySink::open(FailingWriter::new(1)).is_err());
    }

    #[test]
    fn failed_append_keeps_document_valid() {
        // open, a.txt, then b.txt fails
        let sink = JsonArraySink::open(FailingWriter::new(3)).unwrap();
        assert_eq!(sink.append(&record("a.txt")).unwrap(), 1);
        assert!(sink.append(&record("b.txt")).is_err());
        assert_eq!(sink.append(&record("c.txt")).unwrap(), 2);
        assert_eq!(sink.len(), 2);

        let out = String::from_utf8(sink.close().unwrap().buf).unwrap();
        assert!(!out.contains(",\n,\n"));
        let parsed: Vec<FileRecord> = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = parsed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "c.txt"]);
    }

    #[test]
    fn failure_on_first_append_keeps_it_bare() {
        let sink = JsonArraySink::open(FailingWriter::new(2)).unwrap();
        assert!(sink.append(&record("a.txt")).is_err());
        assert!(sink.is_empty());
        assert_eq!(sink.append(&record("b.txt")).unwrap(), 1);

        let out = String::from_utf8(sink.close().unwrap().buf).unwrap();
        assert!(out.starts_with("[\n{"));
        let parsed: Vec<FileRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
