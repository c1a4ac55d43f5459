use std::fmt;

use super::{ControlCommand, Event, MeasurementRecord, MotionEvent, PositionEvent, RecordAssembler};
use crate::config::RciConfig;
use crate::error::Result;
use crate::geo::GeoTracker;
use crate::signal_processing::{FilterState, RoughnessFilter, WindowAccumulator, WindowMetrics};

/// Recording state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Recording => write!(f, "recording"),
        }
    }
}

/// State that lives exactly as long as one recording
#[derive(Debug, Clone)]
pub struct RecordingSession {
    bias: f64,
    window: WindowAccumulator,
    geo: GeoTracker,
    windows_emitted: u64,
}

impl RecordingSession {
    fn new(config: &RciConfig) -> Self {
        Self {
            bias: 0.0,
            window: WindowAccumulator::new(config.sampling.window_size),
            geo: GeoTracker::new(config.geo.earth_radius_m),
            windows_emitted: 0,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn window(&self) -> &WindowAccumulator {
        &self.window
    }

    pub fn geo(&self) -> &GeoTracker {
        &self.geo
    }

    pub fn windows_emitted(&self) -> u64 {
        self.windows_emitted
    }
}

/// Turns motion and position events into one [`MeasurementRecord`] per
/// completed window.
///
/// The filter and the latest GPS fix belong to the recorder and outlive
/// sessions; everything else is rebuilt by [`start`](Self::start). Events
/// that arrive while idle are ignored.
pub struct Recorder {
    config: RciConfig,
    filter: RoughnessFilter,
    assembler: RecordAssembler,
    current_fix: Option<PositionEvent>,
    session: Option<RecordingSession>,
}

impl Recorder {
    pub fn new(config: &RciConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: config.clone(),
            filter: RoughnessFilter::new(&config.filter, config.sampling.sample_rate_hz),
            assembler: RecordAssembler::new(&config.record),
            current_fix: None,
            session: None,
        })
    }

    /// Idle → Recording. Resets bias, window, distance and speed buffer; keeps
    /// filter state and the latest fix.
    pub fn start(&mut self) {
        if self.session.is_some() {
            log::debug!("start ignored: already recording");
            return;
        }
        log::info!("Starting recording session");
        self.session = Some(RecordingSession::new(&self.config));
    }

    /// Recording → Idle. Any partial window is dropped without a record.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            log::debug!("stop ignored: not recording");
            return;
        };

        let dropped = session.window.discard();
        if dropped > 0 {
            log::debug!("Discarded partial window of {} samples", dropped);
        }
        log::info!(
            "Recording session stopped after {} windows, {:.1} m",
            session.windows_emitted,
            session.geo.distance_m()
        );
    }

    pub fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Start => self.start(),
            ControlCommand::Stop => self.stop(),
        }
    }

    /// Set the constant offset subtracted from raw samples until the next start
    pub fn set_bias(&mut self, bias: f64) {
        match self.session.as_mut() {
            Some(session) => session.bias = bias,
            None => log::debug!("bias ignored: not recording"),
        }
    }

    /// Filter one motion sample; returns a record when it completes a window
    pub fn handle_motion(&mut self, event: &MotionEvent) -> Option<MeasurementRecord> {
        let session = self.session.as_mut()?;

        if !event.value.is_finite() {
            log::warn!(
                "Dropping non-finite motion sample at {}: {}",
                event.captured_at,
                event.value
            );
            return None;
        }

        let Some(filtered) = self.filter.try_process_with_bias(event.value, session.bias) else {
            log::warn!(
                "Dropping motion sample at {}: {} overflows the filter",
                event.captured_at,
                event.value
            );
            return None;
        };
        let values = session.window.push(filtered)?;

        let metrics = match WindowMetrics::compute(&values) {
            Ok(metrics) => metrics,
            Err(e) => {
                log::warn!("Skipping window: {}", e);
                return None;
            }
        };

        let averages = session.geo.drain_window_averages();
        let timestamp = self.assembler.timestamp_for(event);
        let record = self.assembler.assemble(
            timestamp,
            values,
            &metrics,
            self.current_fix.as_ref(),
            &session.geo,
            averages,
        );
        session.windows_emitted += 1;

        log::trace!(
            "Window {}: roughness {:.4}, vdv {:.4}, distance {:.1} m",
            session.windows_emitted,
            record.roughness,
            record.vdv,
            record.distance_m
        );

        Some(record)
    }

    /// Feed one GPS fix to the session's geo tracker and remember it as the
    /// current position. Unusable speed or heading readings are cleared.
    pub fn handle_position(&mut self, event: &PositionEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if !event.point().is_valid() {
            log::warn!(
                "Dropping invalid position fix at {}: ({}, {})",
                event.captured_at,
                event.latitude,
                event.longitude
            );
            return;
        }

        let fix = event.sanitized();
        if fix.speed.is_some() != event.speed.is_some()
            || fix.heading.is_some() != event.heading.is_some()
        {
            log::warn!(
                "Ignoring unusable speed/heading in fix at {}: {:?}/{:?}",
                event.captured_at,
                event.speed,
                event.heading
            );
        }

        session.geo.observe_position(&fix);
        self.current_fix = Some(fix);
    }

    /// Route any event; returns a record when a window completes
    pub fn handle(&mut self, event: &Event) -> Option<MeasurementRecord> {
        match event {
            Event::Motion(motion) => self.handle_motion(motion),
            Event::Position(position) => {
                self.handle_position(position);
                None
            }
            Event::Control { command } => {
                self.apply(*command);
                None
            }
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Latest accepted fix, kept across sessions
    pub fn current_fix(&self) -> Option<&PositionEvent> {
        self.current_fix.as_ref()
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }

    /// Distance of the current session, if recording
    pub fn distance_m(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.geo.distance_m())
    }

    pub fn windows_emitted(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.windows_emitted)
    }

    pub fn config(&self) -> &RciConfig {
        &self.config
    }
}
