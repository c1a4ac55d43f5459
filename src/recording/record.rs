use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MotionEvent, PositionEvent};
use crate::config::{RecordConfig, TimestampSource};
use crate::geo::{GeoTracker, WindowAverages};
use crate::signal_processing::WindowMetrics;

/// Everything known about one completed window
///
/// Field names match the upload payload consumed by the collection server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    /// `None` until the first GPS fix of the session
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Instantaneous speed of the latest fix in m/s
    pub speed: f64,
    /// Heading of the latest fix in degrees
    pub direction: f64,
    /// Distance travelled in the session so far, meters
    pub distance_m: f64,
    /// RMS of the filtered window
    pub roughness: f64,
    pub vdv: f64,
    /// Peak over RMS; `None` (JSON `null`) for an all-zero window
    pub crest_factor: Option<f64>,
    /// The filtered window itself
    pub z_values: Vec<f64>,
    /// Mean fix speed over the window in m/s
    pub avg_speed: f64,
    /// Time spanned by the window's fixes in seconds
    pub interval_s: f64,
    pub algorithm_version: String,
}

/// Stamps window results with identity, position and time
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    device_id: String,
    algorithm_version: String,
    timestamp_source: TimestampSource,
}

impl RecordAssembler {
    pub fn new(config: &RecordConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            algorithm_version: config.algorithm_version.clone(),
            timestamp_source: config.timestamp_source,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Record time for a window completed by `sample`
    pub fn timestamp_for(&self, sample: &MotionEvent) -> DateTime<Utc> {
        match self.timestamp_source {
            TimestampSource::WallClock => Utc::now(),
            TimestampSource::EventTime => {
                DateTime::from_timestamp_millis(sample.captured_at).unwrap_or_else(Utc::now)
            }
        }
    }

    pub fn assemble(
        &self,
        timestamp: DateTime<Utc>,
        values: Vec<f64>,
        metrics: &WindowMetrics,
        fix: Option<&PositionEvent>,
        geo: &GeoTracker,
        averages: WindowAverages,
    ) -> MeasurementRecord {
        MeasurementRecord {
            timestamp,
            device_id: self.device_id.clone(),
            latitude: fix.map(|f| f.latitude),
            longitude: fix.map(|f| f.longitude),
            speed: fix.and_then(|f| f.speed).unwrap_or(0.0),
            direction: fix.and_then(|f| f.heading).unwrap_or(0.0),
            distance_m: geo.distance_m(),
            roughness: metrics.roughness,
            vdv: metrics.vdv,
            crest_factor: metrics.crest_factor,
            z_values: values,
            avg_speed: averages.avg_speed,
            interval_s: averages.interval_s,
            algorithm_version: self.algorithm_version.clone(),
        }
    }
}
