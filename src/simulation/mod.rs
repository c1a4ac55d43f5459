mod drive;
mod road;

pub use drive::{DriveConfig, generate_drive, generate_route};
pub use road::{PotholeConfig, RoadProfile, generate_motion, signal_rms};
