//! File-based frame source.
//!
//! Replays a JSON-lines telemetry recording, one frame per line. Each line is
//! a JSON array with one element per channel; `null` marks a channel that
//! was not observed in that frame.
//!
//! ```text
//! [0.0, 27.1, "SCIENCE"]
//! [1.0, null, null]
//! # comments and blank lines are skipped
//! [2.0, 26.8, "SAFE"]
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use tracing::warn;
use vitals_types::Frame;

use super::FrameSource;

/// Replays frames from a JSON-lines file.
///
/// The file is opened lazily on the first poll. Lines that fail to parse are
/// skipped and recorded as the source's error; the replay carries on.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    lines: Option<Lines<BufReader<File>>>,
    line_number: usize,
    exhausted: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            lines: None,
            line_number: 0,
            exhausted: false,
        }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn open(&mut self) -> bool {
        if self.lines.is_some() {
            return true;
        }
        match File::open(&self.path) {
            Ok(file) => {
                self.lines = Some(BufReader::new(file).lines());
                true
            }
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                self.exhausted = true;
                false
            }
        }
    }
}

impl FrameSource for FileSource {
    fn poll(&mut self) -> Option<Frame> {
        if self.exhausted || !self.open() {
            return None;
        }
        let lines = self.lines.as_mut()?;

        for line in lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.last_error = Some(format!("Read error: {}", e));
                    self.exhausted = true;
                    return None;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match serde_json::from_str::<Frame>(trimmed) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    warn!(line = self.line_number, error = %e, "Skipping unparseable frame");
                    self.last_error = Some(format!("Parse error on line {}: {}", self.line_number, e));
                }
            }
        }

        self.exhausted = true;
        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use vitals_types::{Reading, Value};

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/frames.jsonl");
        assert_eq!(source.path(), Path::new("/tmp/frames.jsonl"));
        assert_eq!(source.description(), "file: /tmp/frames.jsonl");
        assert!(source.error().is_none());
        assert!(!source.exhausted());
    }

    #[test]
    fn test_replays_frames_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[0.0, 27.1, \"SCIENCE\"]").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "# gap in telemetry").unwrap();
        writeln!(file, "[1.0, null, null]").unwrap();

        let mut source = FileSource::new(file.path());

        let first = source.poll().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first.get(2), Some(&Reading::Observed(Value::from("SCIENCE"))));

        let second = source.poll().unwrap();
        assert_eq!(second.observed_count(), 1);
        assert_eq!(second.get(1), Some(&Reading::Unobserved));

        assert!(source.poll().is_none());
        assert!(source.exhausted());
        assert!(source.error().is_none());
        assert_eq!(source.line_number(), 4);
    }

    #[test]
    fn test_bad_line_is_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[0.0]").unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, "[2.0]").unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_some());

        let frame = source.poll().unwrap();
        assert_eq!(frame.get(0), Some(&Reading::observed(2.0)));
        assert!(source.error().unwrap().contains("line 2"));
    }

    #[test]
    fn test_missing_file_is_exhausted() {
        let mut source = FileSource::new("/nonexistent/path/frames.jsonl");
        assert!(source.poll().is_none());
        assert!(source.exhausted());
        assert!(source.error().unwrap().starts_with("Read error"));
    }
}
