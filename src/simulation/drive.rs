use super::road::{RoadProfile, generate_motion, sample_time_ms};
use crate::constants::EARTH_RADIUS_M;
use crate::error::{RciError, Result};
use crate::geo::{GeoPoint, destination_point};
use crate::recording::{ControlCommand, Event, PositionEvent};

/// A straight drive at constant speed
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    /// Degrees clockwise from north
    pub bearing_deg: f64,
    pub speed_mps: f64,
    pub gps_rate_hz: f64,
    /// Include speed in the generated fixes
    pub report_speed: bool,
    /// Include heading in the generated fixes
    pub report_heading: bool,
    pub earth_radius_m: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            origin_latitude: 52.0907,
            origin_longitude: 5.1214,
            bearing_deg: 90.0,
            speed_mps: 13.9,
            gps_rate_hz: 1.0,
            report_speed: true,
            report_heading: true,
            earth_radius_m: EARTH_RADIUS_M,
        }
    }
}

impl DriveConfig {
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.origin_latitude, self.origin_longitude)
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = speed_mps;
        self
    }

    pub fn with_bearing(mut self, bearing_deg: f64) -> Self {
        self.bearing_deg = bearing_deg;
        self
    }

    pub fn with_gps_rate(mut self, gps_rate_hz: f64) -> Self {
        self.gps_rate_hz = gps_rate_hz;
        self
    }
}

/// GPS fixes along the drive, the first one at `start_ms` on the origin
pub fn generate_route(
    duration_secs: f64,
    start_ms: i64,
    config: &DriveConfig,
) -> Result<Vec<PositionEvent>> {
    if !(config.gps_rate_hz > 0.0 && config.gps_rate_hz.is_finite()) {
        return Err(RciError::Config(format!(
            "gps rate must be positive, got {}",
            config.gps_rate_hz
        )));
    }
    if !config.origin().is_valid() {
        return Err(RciError::Config("drive origin is not a valid coordinate".into()));
    }

    let num_fixes = (duration_secs.max(0.0) * config.gps_rate_hz) as usize;
    let origin = config.origin();

    Ok((0..num_fixes)
        .map(|i| {
            let elapsed_s = i as f64 / config.gps_rate_hz;
            let point = destination_point(
                origin,
                config.bearing_deg,
                config.speed_mps * elapsed_s,
                config.earth_radius_m,
            );
            PositionEvent {
                latitude: point.latitude,
                longitude: point.longitude,
                speed: config.report_speed.then_some(config.speed_mps),
                heading: config.report_heading.then_some(config.bearing_deg),
                captured_at: sample_time_ms(start_ms, i, config.gps_rate_hz),
            }
        })
        .collect())
}

/// Interleaved motion and position events for one recording session,
/// framed by start and stop commands
pub fn generate_drive(
    duration_secs: f64,
    sample_rate: f64,
    start_ms: i64,
    road: &RoadProfile,
    drive: &DriveConfig,
) -> Result<Vec<Event>> {
    let motion = generate_motion(duration_secs, sample_rate, start_ms, road)?;
    let route = generate_route(duration_secs, start_ms, drive)?;

    let mut data: Vec<Event> = route
        .into_iter()
        .map(Event::from)
        .chain(motion.into_iter().map(Event::from))
        .collect();
    // Stable: on equal timestamps the fix stays ahead of the motion sample
    data.sort_by_key(|e| e.captured_at().unwrap_or(start_ms));

    let mut events = Vec::with_capacity(data.len() + 2);
    events.push(Event::from(ControlCommand::Start));
    events.extend(data);
    events.push(Event::from(ControlCommand::Stop));
    Ok(events)
}
