use std::io::Write;

use super::{Formatter, RecordSink};
use crate::error::{RciError, Result};
use crate::recording::MeasurementRecord;

/// Writes each record as one formatted line, preceded once by the header
pub struct FormatterSink<W: Write> {
    formatter: Box<dyn Formatter>,
    writer: W,
    header_written: bool,
}

impl<W: Write> FormatterSink<W> {
    pub fn new(formatter: Box<dyn Formatter>, writer: W) -> Self {
        Self {
            formatter,
            writer,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for FormatterSink<W> {
    fn submit(&mut self, record: &MeasurementRecord) -> Result<()> {
        if !self.header_written {
            if let Some(header) = self.formatter.header() {
                writeln!(self.writer, "{}", header)?;
            }
            self.header_written = true;
        }

        let line = self.formatter.format(record)?;
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<MeasurementRecord>,
}

impl MemorySink {
    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MeasurementRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn submit(&mut self, record: &MeasurementRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Hands every record to each inner sink, even after one of them fails
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn collect_failures<F>(&mut self, mut op: F) -> Result<()>
    where
        F: FnMut(&mut dyn RecordSink) -> Result<()>,
    {
        let failures: Vec<String> = self
            .sinks
            .iter_mut()
            .filter_map(|sink| op(sink.as_mut()).err().map(|e| e.to_string()))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RciError::Delivery(format!(
                "{} of {} sinks failed: {}",
                failures.len(),
                self.sinks.len(),
                failures.join("; ")
            )))
        }
    }
}

impl RecordSink for FanoutSink {
    fn submit(&mut self, record: &MeasurementRecord) -> Result<()> {
        self.collect_failures(|sink| sink.submit(record))
    }

    fn flush(&mut self) -> Result<()> {
        self.collect_failures(|sink| sink.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_records::sample_record;
    use crate::output::{CsvFormatter, JsonFormatter};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSink {
        count: Rc<Cell<usize>>,
        fail: bool,
    }

    impl RecordSink for CountingSink {
        fn submit(&mut self, _record: &MeasurementRecord) -> Result<()> {
            self.count.set(self.count.get() + 1);
            if self.fail {
                Err(RciError::Delivery("HTTP 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_header_written_once() {
        let mut sink = FormatterSink::new(Box::new(CsvFormatter), Vec::new());
        sink.submit(&sample_record()).unwrap();
        sink.submit(&sample_record()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,device_id"));
    }

    #[test]
    fn test_json_lines_round_trip() {
        let mut sink = FormatterSink::new(Box::new(JsonFormatter), Vec::new());
        sink.submit(&sample_record()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: MeasurementRecord = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed.device_id, "dev-1");
        assert_eq!(parsed.z_values.len(), 2);
    }

    #[test]
    fn test_fanout_reaches_every_sink_despite_failure() {
        let failing = Rc::new(Cell::new(0));
        let healthy = Rc::new(Cell::new(0));

        let mut fanout = FanoutSink::new();
        fanout.push(Box::new(CountingSink {
            count: failing.clone(),
            fail: true,
        }));
        fanout.push(Box::new(CountingSink {
            count: healthy.clone(),
            fail: false,
        }));

        let result = fanout.submit(&sample_record());
        assert!(matches!(result, Err(RciError::Delivery(msg)) if msg.starts_with("1 of 2")));
        assert_eq!(failing.get(), 1);
        assert_eq!(healthy.get(), 1);
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::default();
        sink.submit(&sample_record()).unwrap();
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.into_records()[0].roughness, 0.4321);
    }
}
