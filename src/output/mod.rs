mod csv;
mod json;
mod sink;
mod text;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::recording::MeasurementRecord;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::sink::{FanoutSink, FormatterSink, MemorySink};
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Renders one record as a single line
pub trait Formatter: Send {
    fn format(&self, record: &MeasurementRecord) -> Result<String>;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

/// Receiver of finished records: the upload/persistence collaborator.
///
/// `Ok` means the record was accepted. Retrying a failed submit is the
/// sink's own business; callers log the error and move on.
pub trait RecordSink {
    fn submit(&mut self, record: &MeasurementRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) mod test_records {
    use chrono::{DateTime, Utc};

    use crate::recording::MeasurementRecord;

    pub fn sample_record() -> MeasurementRecord {
        MeasurementRecord {
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_250).unwrap_or_else(Utc::now),
            device_id: "dev-1".to_string(),
            latitude: Some(52.1),
            longitude: Some(5.1),
            speed: 13.5,
            direction: 270.0,
            distance_m: 1234.5,
            roughness: 0.4321,
            vdv: 0.5,
            crest_factor: Some(2.25),
            z_values: vec![0.1, -0.2],
            avg_speed: 13.0,
            interval_s: 1.0,
            algorithm_version: "1.0".to_string(),
        }
    }
}
