pub mod haversine;
pub mod tracker;

pub use haversine::{GeoPoint, destination_point, haversine_distance};
pub use tracker::{GeoTracker, PositionSample, WindowAverages};
