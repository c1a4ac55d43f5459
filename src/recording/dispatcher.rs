use crossbeam_channel::{Receiver, Sender, bounded, never, select};

use super::{ControlCommand, Event, MeasurementRecord, MotionEvent, PositionEvent, Recorder};
use crate::error::{RciError, Result};
use crate::output::RecordSink;

/// Counters reported when a dispatcher finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub motion_events: u64,
    pub position_events: u64,
    pub control_commands: u64,
    pub records_emitted: u64,
    pub delivery_failures: u64,
}

/// Producer side of the dispatcher queues
#[derive(Debug, Clone)]
pub struct EventSenders {
    pub motion: Sender<MotionEvent>,
    pub position: Sender<PositionEvent>,
    pub control: Sender<ControlCommand>,
}

impl EventSenders {
    /// Route an event to its queue
    pub fn send(&self, event: Event) -> Result<()> {
        match event {
            Event::Motion(m) => self
                .motion
                .send(m)
                .map_err(|_| RciError::Disconnected("motion")),
            Event::Position(p) => self
                .position
                .send(p)
                .map_err(|_| RciError::Disconnected("position")),
            Event::Control { command } => self
                .control
                .send(command)
                .map_err(|_| RciError::Disconnected("control")),
        }
    }
}

/// Single-threaded consumer of the motion, position and control queues
pub struct Dispatcher {
    motion_rx: Receiver<MotionEvent>,
    position_rx: Receiver<PositionEvent>,
    control_rx: Receiver<ControlCommand>,
}

/// Create bounded queues and the dispatcher that drains them
///
/// Ordering is preserved within each queue but not across queues.
pub fn channels(capacity: usize) -> (EventSenders, Dispatcher) {
    let (motion_tx, motion_rx) = bounded(capacity);
    let (position_tx, position_rx) = bounded(capacity);
    let (control_tx, control_rx) = bounded(capacity);

    (
        EventSenders {
            motion: motion_tx,
            position: position_tx,
            control: control_tx,
        },
        Dispatcher {
            motion_rx,
            position_rx,
            control_rx,
        },
    )
}

impl Dispatcher {
    /// Handle events on the calling thread until both data queues close.
    ///
    /// Each event is processed to completion before the next is taken.
    /// Records go to `sink`; a failed submit is logged and counted. When the
    /// data queues close the recorder is stopped, dropping any partial window.
    pub fn run(self, recorder: &mut Recorder, sink: &mut dyn RecordSink) -> DispatchStats {
        let mut stats = DispatchStats::default();

        let closed_motion = never::<MotionEvent>();
        let closed_position = never::<PositionEvent>();
        let closed_control = never::<ControlCommand>();
        let mut motion_open = true;
        let mut position_open = true;
        let mut control_open = true;

        while motion_open || position_open {
            let motion_rx = if motion_open { &self.motion_rx } else { &closed_motion };
            let position_rx = if position_open { &self.position_rx } else { &closed_position };
            let control_rx = if control_open { &self.control_rx } else { &closed_control };

            select! {
                recv(motion_rx) -> msg => match msg {
                    Ok(event) => {
                        stats.motion_events += 1;
                        if let Some(record) = recorder.handle_motion(&event) {
                            deliver(&record, sink, &mut stats);
                        }
                    }
                    Err(_) => motion_open = false,
                },
                recv(position_rx) -> msg => match msg {
                    Ok(event) => {
                        stats.position_events += 1;
                        recorder.handle_position(&event);
                    }
                    Err(_) => position_open = false,
                },
                recv(control_rx) -> msg => match msg {
                    Ok(command) => {
                        stats.control_commands += 1;
                        recorder.apply(command);
                    }
                    Err(_) => control_open = false,
                },
            }
        }

        recorder.stop();
        if let Err(e) = sink.flush() {
            log::warn!("Flushing record sink failed: {}", e);
        }

        log::debug!("Dispatcher finished: {:?}", stats);
        stats
    }
}

fn deliver(record: &MeasurementRecord, sink: &mut dyn RecordSink, stats: &mut DispatchStats) {
    stats.records_emitted += 1;
    if let Err(e) = sink.submit(record) {
        stats.delivery_failures += 1;
        log::warn!("Record delivery failed: {}", e);
    }
}
