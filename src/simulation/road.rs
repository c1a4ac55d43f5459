use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{RciError, Result};
use crate::recording::MotionEvent;

/// Statistical description of a road surface as seen by the accelerometer
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct RoadProfile {
    pub seed: Option<u64>,
    /// Standard deviation of the surface vibration in m/s²
    pub roughness_std: f64,
    /// Constant offset added to every sample (e.g. a gravity component)
    pub bias: f64,
    pub potholes: Option<PotholeConfig>,
}

/// Short rectangular shocks at random positions
#[derive(Clone, Debug, serde::Deserialize)]
pub struct PotholeConfig {
    /// Mean number of potholes per second
    pub rate_hz: f64,
    /// Shock amplitude in m/s²
    pub amplitude: f64,
    pub duration_samples: usize,
}

impl Default for RoadProfile {
    fn default() -> Self {
        Self {
            seed: None,
            roughness_std: 0.3,
            bias: 0.0,
            potholes: None,
        }
    }
}

impl RoadProfile {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_roughness(mut self, roughness_std: f64) -> Self {
        self.roughness_std = roughness_std;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_potholes(mut self, rate_hz: f64, amplitude: f64, duration_samples: usize) -> Self {
        self.potholes = Some(PotholeConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Millisecond timestamp of sample `index` at `sample_rate`
pub(crate) fn sample_time_ms(start_ms: i64, index: usize, sample_rate: f64) -> i64 {
    start_ms + (index as f64 * 1000.0 / sample_rate).round() as i64
}

fn apply_potholes(signal: &mut [f64], config: &PotholeConfig, sample_rate: f64, rng: &mut ChaCha8Rng) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f64>() * 2.0 * avg_samples_between) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples.max(1)).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

/// Generate accelerometer samples for `duration_secs` of driving
pub fn generate_motion(
    duration_secs: f64,
    sample_rate: f64,
    start_ms: i64,
    profile: &RoadProfile,
) -> Result<Vec<MotionEvent>> {
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(RciError::Config(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }

    let num_samples = (duration_secs.max(0.0) * sample_rate) as usize;
    let mut rng = create_rng(profile.seed);

    let normal = Normal::new(0.0, profile.roughness_std)
        .map_err(|e| RciError::Config(format!("roughness_std: {:?}", e)))?;
    let mut signal: Vec<f64> = (0..num_samples).map(|_| normal.sample(&mut rng)).collect();

    if let Some(potholes) = &profile.potholes {
        apply_potholes(&mut signal, potholes, sample_rate, &mut rng);
    }

    Ok(signal
        .into_iter()
        .enumerate()
        .map(|(i, value)| MotionEvent {
            value: value + profile.bias,
            captured_at: sample_time_ms(start_ms, i, sample_rate),
        })
        .collect())
}
