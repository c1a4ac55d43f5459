use crate::constants::MILLIS_PER_SECOND;
use crate::recording::PositionEvent;

use super::{GeoPoint, haversine_distance};

/// Speed reading buffered between window boundaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Capture time in milliseconds since the Unix epoch
    pub captured_at: i64,
    /// Speed in m/s (0 when the fix carried none)
    pub speed: f64,
}

/// Speed summary for one motion window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowAverages {
    /// Mean of the buffered speeds in m/s
    pub avg_speed: f64,
    /// Time between first and last buffered fix in seconds
    pub interval_s: f64,
}

/// Cumulative distance and per-window speed tracking from GPS fixes.
///
/// Fixes arrive on their own cadence; the motion pipeline drains the speed
/// buffer once per completed window. Distance only ever grows. The latest
/// fix itself is kept by the caller.
#[derive(Debug, Clone)]
pub struct GeoTracker {
    earth_radius_m: f64,
    distance_m: f64,
    last_point: Option<GeoPoint>,
    samples: Vec<PositionSample>,
}

impl GeoTracker {
    pub fn new(earth_radius_m: f64) -> Self {
        Self {
            earth_radius_m,
            distance_m: 0.0,
            last_point: None,
            samples: Vec::new(),
        }
    }

    /// Account for a new fix: extend the distance, buffer its speed
    pub fn observe_position(&mut self, fix: &PositionEvent) {
        let point = fix.point();

        if let Some(last) = self.last_point {
            let step = haversine_distance(last, point, self.earth_radius_m);
            if step.is_finite() {
                self.distance_m += step;
            }
        }

        self.last_point = Some(point);
        self.samples.push(PositionSample {
            captured_at: fix.captured_at,
            speed: fix.speed.unwrap_or(0.0),
        });
    }

    /// Summarise and clear the speed buffer
    pub fn drain_window_averages(&mut self) -> WindowAverages {
        let averages = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                // Running mean: finite for any finite speeds
                let avg_speed = self
                    .samples
                    .iter()
                    .enumerate()
                    .fold(0.0, |mean, (i, s)| mean + (s.speed - mean) / (i + 1) as f64);
                let interval_s = if self.samples.len() > 1 {
                    let elapsed_ms = last.captured_at.saturating_sub(first.captured_at);
                    (elapsed_ms as f64 / MILLIS_PER_SECOND).max(0.0)
                } else {
                    0.0
                };
                WindowAverages {
                    avg_speed,
                    interval_s,
                }
            }
            _ => WindowAverages::default(),
        };

        self.samples.clear();
        averages
    }

    /// Distance travelled since the tracker was created, in meters
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Number of speed samples waiting for the next window
    pub fn pending_samples(&self) -> usize {
        self.samples.len()
    }
}
