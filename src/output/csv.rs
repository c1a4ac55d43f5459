use super::{Formatter, iso8601_timestamp};
use crate::error::Result;
use crate::recording::MeasurementRecord;

/// Comma-separated output; `z_values` are joined with `;`
pub struct CsvFormatter;

fn optional(value: Option<f64>) -> String {
    value.map_or(String::new(), |v| v.to_string())
}

fn quoted(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, record: &MeasurementRecord) -> Result<String> {
        let z_values = record
            .z_values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(";");

        Ok(format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            iso8601_timestamp(&record.timestamp),
            quoted(&record.device_id),
            optional(record.latitude),
            optional(record.longitude),
            record.speed,
            record.direction,
            record.distance_m,
            record.roughness,
            record.vdv,
            optional(record.crest_factor),
            record.avg_speed,
            record.interval_s,
            quoted(&record.algorithm_version),
            z_values
        ))
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "timestamp,device_id,latitude,longitude,speed,direction,distance_m,roughness,vdv,crest_factor,avg_speed,interval_s,algorithm_version,z_values",
        )
    }
}
