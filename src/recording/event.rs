//! Inbound events at the boundary of the roughness pipeline.
//!
//! Serialized as JSON objects tagged by `"type"`:
//!
//! ```text
//! {"type":"motion","value":0.12,"captured_at":1718000000000}
//! {"type":"position","latitude":52.1,"longitude":5.1,"speed":13.4,"captured_at":1718000000250}
//! {"type":"control","command":"start"}
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// One accelerometer reading on the measured axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Raw axis value in m/s²
    pub value: f64,
    /// Capture time in milliseconds since the Unix epoch
    pub captured_at: i64,
}

/// One GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEvent {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in m/s, when the receiver reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Heading in degrees clockwise from north, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Capture time in milliseconds since the Unix epoch
    pub captured_at: i64,
}

impl PositionEvent {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Copy with unusable optional readings cleared: speed must be finite and
    /// non-negative, heading finite
    pub fn sanitized(&self) -> Self {
        Self {
            speed: self.speed.filter(|s| s.is_finite() && *s >= 0.0),
            heading: self.heading.filter(|h| h.is_finite()),
            ..*self
        }
    }
}

/// Recording control from the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Motion(MotionEvent),
    Position(PositionEvent),
    Control { command: ControlCommand },
}

impl Event {
    /// Capture time of data events; control commands carry none
    pub fn captured_at(&self) -> Option<i64> {
        match self {
            Event::Motion(m) => Some(m.captured_at),
            Event::Position(p) => Some(p.captured_at),
            Event::Control { .. } => None,
        }
    }
}

impl From<MotionEvent> for Event {
    fn from(event: MotionEvent) -> Self {
        Event::Motion(event)
    }
}

impl From<PositionEvent> for Event {
    fn from(event: PositionEvent) -> Self {
        Event::Position(event)
    }
}

impl From<ControlCommand> for Event {
    fn from(command: ControlCommand) -> Self {
        Event::Control { command }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_events() {
        let motion: Event =
            serde_json::from_str(r#"{"type":"motion","value":0.25,"captured_at":1000}"#).unwrap();
        assert_eq!(
            motion,
            Event::Motion(MotionEvent {
                value: 0.25,
                captured_at: 1000
            })
        );

        let control: Event =
            serde_json::from_str(r#"{"type":"control","command":"stop"}"#).unwrap();
        assert_eq!(control, Event::from(ControlCommand::Stop));
        assert_eq!(control.captured_at(), None);
    }

    #[test]
    fn test_position_optional_fields_default_to_none() {
        let event: Event = serde_json::from_str(
            r#"{"type":"position","latitude":52.1,"longitude":5.1,"captured_at":42}"#,
        )
        .unwrap();

        let Event::Position(fix) = event else {
            panic!("expected a position event, got {:?}", event);
        };
        assert_eq!(fix.speed, None);
        assert_eq!(fix.heading, None);
        assert_eq!(fix.captured_at, 42);
    }

    #[test]
    fn test_absent_options_are_not_serialized() {
        let fix = PositionEvent {
            latitude: 1.0,
            longitude: 2.0,
            speed: None,
            heading: Some(90.0),
            captured_at: 7,
        };
        let json = serde_json::to_string(&Event::from(fix)).unwrap();
        assert!(json.contains(r#""type":"position""#));
        assert!(json.contains(r#""heading":90.0"#));
        assert!(!json.contains("speed"));
    }

    #[test]
    fn test_sanitized_clears_bad_readings() {
        let fix = PositionEvent {
            latitude: 52.0,
            longitude: 5.0,
            speed: Some(f64::NAN),
            heading: Some(f64::INFINITY),
            captured_at: 0,
        };
        let clean = fix.sanitized();
        assert_eq!(clean.speed, None);
        assert_eq!(clean.heading, None);
        assert_eq!(clean.point(), fix.point());

        let reversing = PositionEvent {
            speed: Some(-1.0),
            heading: Some(180.0),
            ..fix
        };
        assert_eq!(reversing.sanitized().speed, None);
        assert_eq!(reversing.sanitized().heading, Some(180.0));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"type":"orientation","alpha":1.0}"#).is_err());
    }
}
