use super::Formatter;
use crate::error::Result;
use crate::recording::MeasurementRecord;

/// One JSON object per line, in the upload payload layout
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &MeasurementRecord) -> Result<String> {
        Ok(serde_json::to_string(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_records::sample_record;

    #[test]
    fn test_json_uses_payload_field_names() {
        let line = JsonFormatter.format(&sample_record()).unwrap();
        for key in [
            "timestamp",
            "device_id",
            "latitude",
            "longitude",
            "speed",
            "direction",
            "distance_m",
            "roughness",
            "vdv",
            "crest_factor",
            "z_values",
            "avg_speed",
            "interval_s",
            "algorithm_version",
        ] {
            assert!(line.contains(&format!("\"{}\":", key)), "missing {}", key);
        }
        assert!(!line.contains('\n'));
    }
}
