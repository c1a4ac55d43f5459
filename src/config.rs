//! Configuration for the rci roughness pipeline.
//!
//! Every value has a design default (see [`crate::constants`]), so an empty
//! TOML file is a valid configuration. Sections may be given partially:
//!
//! ```toml
//! [sampling]
//! sample_rate_hz = 100.0
//! window_size = 100
//!
//! [record]
//! device_id = "van-07"
//! timestamp_source = "event_time"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{
    ALGORITHM_VERSION, DEFAULT_HIGHPASS_CUTOFF_HZ, DEFAULT_LOWPASS_CUTOFF_HZ,
    DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WINDOW_SIZE, EARTH_RADIUS_M,
};
use crate::error::{RciError, Result};

/// Sensor sample rate, given as a frequency or a period
///
/// Can be given either as a frequency in Hz or as a sample period in
/// milliseconds, whichever the sensor bridge reports.
///
/// # Parsing formats
/// - `50` - frequency in Hz (no suffix)
/// - `50hz` or `50Hz` - frequency in Hz (explicit)
/// - `20ms` - sample period in milliseconds
///
/// # Example
/// ```
/// use rci::config::SampleRate;
///
/// let rate: SampleRate = "20ms".parse().unwrap();
/// assert!((rate.as_hz() - 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate(f64);

impl SampleRate {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    /// Create from sample period in milliseconds
    pub fn from_interval_ms(ms: f64) -> Self {
        Self(1000.0 / ms)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f64 {
        self.0
    }

    /// Get sample period in milliseconds
    pub fn as_interval_ms(&self) -> f64 {
        1000.0 / self.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::from_hz(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}hz", self.0)
    }
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s.strip_suffix("ms") {
            let ms: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid sample period: {}", s))?;
            if !(ms > 0.0 && ms.is_finite()) {
                return Err("sample period must be positive".to_string());
            }
            return Ok(Self::from_interval_ms(ms));
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid sample rate: {}", s))?;
        if !(hz > 0.0 && hz.is_finite()) {
            return Err("sample rate must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Where a record's `timestamp` comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Wall clock at the moment the record is assembled
    #[default]
    WallClock,
    /// Capture time of the motion sample that completed the window
    EventTime,
}

/// System-wide configuration
///
/// # Example
/// ```
/// use rci::config::RciConfig;
///
/// let mut config = RciConfig::default();
/// config.record.device_id = "bike-3".to_string();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RciConfig {
    /// Sensor rate and window size
    pub sampling: SamplingConfig,
    /// Two-stage motion filter
    pub filter: FilterConfig,
    /// Distance computation
    pub geo: GeoConfig,
    /// Record stamping
    pub record: RecordConfig,
}

/// Accelerometer sampling and window aggregation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Nominal sample rate in Hz; sets the filter time step
    pub sample_rate_hz: f64,
    /// Samples per window (typically equal to the sample rate for ~1 s)
    pub window_size: usize,
}

/// Motion filter cutoffs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// First stage cutoff in Hz
    pub highpass_cutoff_hz: f64,
    /// Second stage cutoff in Hz
    pub lowpass_cutoff_hz: f64,
}

/// Geographic constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Sphere radius for haversine distance in meters
    pub earth_radius_m: f64,
}

/// Identity and versioning stamped on each record
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Opaque device identifier
    pub device_id: String,
    /// Algorithm version tag
    pub algorithm_version: String,
    /// Source of the record timestamp
    pub timestamp_source: TimestampSource,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            highpass_cutoff_hz: DEFAULT_HIGHPASS_CUTOFF_HZ,
            lowpass_cutoff_hz: DEFAULT_LOWPASS_CUTOFF_HZ,
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            earth_radius_m: EARTH_RADIUS_M,
        }
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            device_id: "unregistered".to_string(),
            algorithm_version: ALGORITHM_VERSION.to_string(),
            timestamp_source: TimestampSource::WallClock,
        }
    }
}

impl RciConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Check that every value is usable by the pipeline
    pub fn validate(&self) -> Result<()> {
        positive("sampling.sample_rate_hz", self.sampling.sample_rate_hz)?;
        if self.sampling.window_size == 0 {
            return Err(RciError::Config(
                "sampling.window_size must be at least 1".to_string(),
            ));
        }
        positive("filter.highpass_cutoff_hz", self.filter.highpass_cutoff_hz)?;
        positive("filter.lowpass_cutoff_hz", self.filter.lowpass_cutoff_hz)?;
        positive("geo.earth_radius_m", self.geo.earth_radius_m)?;
        if self.record.algorithm_version.trim().is_empty() {
            return Err(RciError::Config(
                "record.algorithm_version must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RciError::Config(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}
