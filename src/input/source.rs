use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{RciError, Result};
use crate::recording::Event;

/// Supplier of inbound events in arrival order
pub trait EventSource: Send {
    /// Next event, or `None` at end of input
    fn next_event(&mut self) -> Result<Option<Event>>;
}

/// Reads one JSON event per line
///
/// Blank lines and lines starting with `#` are skipped. A line that does
/// not parse yields `RciError::MalformedEvent`; the source stays usable and
/// continues with the following line.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line_number: usize,
    line: String,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            line: String::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead + Send> EventSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| RciError::MalformedEvent {
                    line: self.line_number,
                    message: e.to_string(),
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{ControlCommand, MotionEvent};
    use std::io::{Cursor, Write};

    #[test]
    fn test_reads_events_skipping_comments() {
        let input = "# recorded on the A12\n\
                     {\"type\":\"control\",\"command\":\"start\"}\n\
                     \n\
                     {\"type\":\"motion\",\"value\":0.5,\"captured_at\":20}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(
            source.next_event().unwrap(),
            Some(Event::from(ControlCommand::Start))
        );
        assert_eq!(
            source.next_event().unwrap(),
            Some(Event::Motion(MotionEvent {
                value: 0.5,
                captured_at: 20
            }))
        );
        assert_eq!(source.next_event().unwrap(), None);
        assert_eq!(source.line_number(), 4);
    }

    #[test]
    fn test_malformed_line_reports_line_number_and_continues() {
        let input = "{\"type\":\"motion\",\"value\":0.5,\"captured_at\":20}\n\
                     {\"type\":\"motion\",\"value\":\n\
                     {\"type\":\"motion\",\"value\":0.7,\"captured_at\":40}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert!(source.next_event().unwrap().is_some());
        assert!(matches!(
            source.next_event(),
            Err(RciError::MalformedEvent { line: 2, .. })
        ));
        assert!(matches!(
            source.next_event().unwrap(),
            Some(Event::Motion(MotionEvent { captured_at: 40, .. }))
        ));
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"type\":\"control\",\"command\":\"stop\"}}").unwrap();

        let mut source = JsonLinesSource::open(file.path()).unwrap();
        assert_eq!(
            source.next_event().unwrap(),
            Some(Event::from(ControlCommand::Stop))
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = JsonLinesSource::open("/nonexistent/drive.jsonl");
        assert!(matches!(result, Err(RciError::Io(_))));
    }
}
