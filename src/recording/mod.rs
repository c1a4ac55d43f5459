pub mod dispatcher;
pub mod event;
pub mod record;
pub mod session;

pub use dispatcher::{DispatchStats, Dispatcher, EventSenders, channels};
pub use event::{ControlCommand, Event, MotionEvent, PositionEvent};
pub use record::{MeasurementRecord, RecordAssembler};
pub use session::{Recorder, RecordingSession, SessionState};
