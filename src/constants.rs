//! Design-default constants for the roughness pipeline
//!
//! These values reproduce the calibration that published roughness figures
//! were produced with. Changing any of them changes the meaning of the
//! numbers in a `MeasurementRecord`, so bump `ALGORITHM_VERSION` alongside.

/// Nominal accelerometer sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 50.0;

/// Samples per aggregation window (one second at the nominal rate).
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Cutoff of the first (high-pass designed) filter stage in Hz.
pub const DEFAULT_HIGHPASS_CUTOFF_HZ: f64 = 0.5;

/// Cutoff of the second (low-pass) filter stage in Hz.
pub const DEFAULT_LOWPASS_CUTOFF_HZ: f64 = 50.0;

/// Mean Earth radius used by the haversine distance, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Version tag stamped on every record.
pub const ALGORITHM_VERSION: &str = "1.0";

/// Milliseconds per second, for converting event timestamps.
pub const MILLIS_PER_SECOND: f64 = 1000.0;
