use super::Filter;

/// Single-pole recursive smoothing stage.
///
/// Each call moves the held output a fraction `alpha` of the way towards the
/// input: `y[n] = y[n-1] + alpha * (x[n] - y[n-1])`. The held output is the
/// only state and is never cleared after construction.
#[derive(Debug, Clone)]
pub struct SinglePole {
    alpha: f64,
    prev: f64,
}

impl SinglePole {
    /// Create a stage with an explicit smoothing factor in `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        Self { alpha, prev: 0.0 }
    }

    /// Create a stage from an RC cutoff frequency.
    ///
    /// `alpha = dt / (rc + dt)` with `dt = 1 / sample_rate` and
    /// `rc = 1 / (2 * pi * cutoff_hz)`.
    pub fn with_cutoff(sample_rate: f64, cutoff_hz: f64) -> Self {
        Self::new(Self::alpha_for(sample_rate, cutoff_hz))
    }

    /// Smoothing factor for the given sample rate and cutoff.
    pub fn alpha_for(sample_rate: f64, cutoff_hz: f64) -> f64 {
        let dt = 1.0 / sample_rate;
        let rc = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz);
        dt / (rc + dt)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Most recent output.
    pub fn prev(&self) -> f64 {
        self.prev
    }
}

impl Filter for SinglePole {
    fn process(&mut self, sample: f64) -> f64 {
        self.prev += self.alpha * (sample - self.prev);
        self.prev
    }
}
