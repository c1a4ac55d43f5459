pub mod source;
pub mod writer;

pub use source::{EventSource, JsonLinesSource};
pub use writer::{save_events, write_events};
