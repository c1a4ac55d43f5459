use super::{Formatter, iso8601_timestamp};
use crate::error::Result;
use crate::recording::MeasurementRecord;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &MeasurementRecord) -> Result<String> {
        let crest = record
            .crest_factor
            .map_or("-".to_string(), |c| format!("{:.2}", c));

        if self.verbose {
            let position = match (record.latitude, record.longitude) {
                (Some(lat), Some(lon)) => format!("{:.6},{:.6}", lat, lon),
                _ => "-".to_string(),
            };
            Ok(format!(
                "{} rough: {:.4} vdv: {:.4} crest: {} dist: {:>8.1} m [pos: {}, speed: {:.1} m/s, dir: {:.0}°, avg: {:.1} m/s over {:.1} s, n: {}]",
                iso8601_timestamp(&record.timestamp),
                record.roughness,
                record.vdv,
                crest,
                record.distance_m,
                position,
                record.speed,
                record.direction,
                record.avg_speed,
                record.interval_s,
                record.z_values.len()
            ))
        } else {
            Ok(format!(
                "{} rough: {:.4} vdv: {:.4} crest: {} dist: {:>8.1} m",
                iso8601_timestamp(&record.timestamp),
                record.roughness,
                record.vdv,
                crest,
                record.distance_m
            ))
        }
    }
}
