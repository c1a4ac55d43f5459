#![allow(dead_code)]

use rci::recording::{Event, MotionEvent, PositionEvent};

/// Motion samples with values from `value_fn(i)`, spaced at `sample_rate`
pub fn motion_events<F>(count: usize, sample_rate: f64, start_ms: i64, value_fn: F) -> Vec<MotionEvent>
where
    F: Fn(usize) -> f64,
{
    (0..count)
        .map(|i| MotionEvent {
            value: value_fn(i),
            captured_at: start_ms + (i as f64 * 1000.0 / sample_rate).round() as i64,
        })
        .collect()
}

pub fn constant_motion(count: usize, value: f64) -> Vec<MotionEvent> {
    motion_events(count, 50.0, 0, |_| value)
}

pub fn fix(latitude: f64, longitude: f64, speed: Option<f64>, captured_at: i64) -> PositionEvent {
    PositionEvent {
        latitude,
        longitude,
        speed,
        heading: None,
        captured_at,
    }
}

/// Straightforward cascade of the two recursive stages, for cross-checking
pub struct ReferenceCascade {
    alpha_hp: f64,
    alpha_lp: f64,
    hp_prev: f64,
    lp_prev: f64,
}

impl ReferenceCascade {
    pub fn new(sample_rate: f64, highpass_hz: f64, lowpass_hz: f64) -> Self {
        let alpha = |fc: f64| {
            let dt = 1.0 / sample_rate;
            let rc = 1.0 / (2.0 * std::f64::consts::PI * fc);
            dt / (rc + dt)
        };
        Self {
            alpha_hp: alpha(highpass_hz),
            alpha_lp: alpha(lowpass_hz),
            hp_prev: 0.0,
            lp_prev: 0.0,
        }
    }

    pub fn step(&mut self, x: f64) -> f64 {
        self.hp_prev += self.alpha_hp * (x - self.hp_prev);
        self.lp_prev += self.alpha_lp * (self.hp_prev - self.lp_prev);
        self.lp_prev
    }
}

pub fn rms(values: &[f64]) -> f64 {
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn as_events<I, T>(items: I) -> Vec<Event>
where
    I: IntoIterator<Item = T>,
    T: Into<Event>,
{
    items.into_iter().map(Into::into).collect()
}
