pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod input;
pub mod output;
pub mod recording;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::RciConfig;
pub use error::{RciError, Result};
pub use recording::{MeasurementRecord, Recorder};
