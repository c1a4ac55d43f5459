pub mod filter;
pub mod metrics;
pub mod roughness_filter;
pub mod single_pole;
pub mod window;

pub use filter::Filter;
pub use metrics::WindowMetrics;
pub use roughness_filter::{FilterState, RoughnessFilter};
pub use single_pole::SinglePole;
pub use window::WindowAccumulator;
