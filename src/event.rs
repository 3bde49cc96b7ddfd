//! # Canonical Events
//!
//! Notifications delivered to consumers of the [`Dispatcher`](crate::registry::Dispatcher).
//!
//! Events for one device arrive in the order its raw events were processed.
//! No ordering is implied across devices.
//!
//! ## JSON form
//!
//! Events serialize with an internal `type` tag, one object per line in the
//! monitor's `jsonl` output:
//!
//! ```text
//! {"type":"connection","device":0,"connected":true}
//! {"type":"button","device":0,"button":0,"pressed":true}
//! {"type":"axis","device":0,"axis":4,"value":0.5}
//! ```

use serde::Serialize;
use std::fmt;

use crate::mapping::{JoyAxis, JoyButton};

/// A canonical input notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    /// A device slot was connected or disconnected.
    Connection { device: usize, connected: bool },
    /// A canonical button changed state.
    Button {
        device: usize,
        button: JoyButton,
        pressed: bool,
    },
    /// A canonical axis changed value.
    Axis {
        device: usize,
        axis: JoyAxis,
        value: f32,
    },
}

impl InputEvent {
    /// Device slot the event belongs to.
    #[must_use]
    pub fn device(&self) -> usize {
        match *self {
            Self::Connection { device, .. }
            | Self::Button { device, .. }
            | Self::Axis { device, .. } => device,
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Connection { device, connected } => write!(
                f,
                "device {} {}",
                device,
                if connected { "connected" } else { "disconnected" }
            ),
            Self::Button {
                device,
                button,
                pressed,
            } => write!(
                f,
                "device {} button {} {}",
                device,
                button,
                if pressed { "pressed" } else { "released" }
            ),
            Self::Axis {
                device,
                axis,
                value,
            } => write!(f, "device {} axis {} = {:.3}", device, axis, value),
        }
    }
}

/// Receiving half of the canonical event channel.
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<InputEvent>;

/// Sending half of the canonical event channel.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<InputEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_accessor() {
        let event = InputEvent::Axis {
            device: 3,
            axis: JoyAxis::LEFT_X,
            value: 0.0,
        };
        assert_eq!(event.device(), 3);
    }

    #[test]
    fn test_display() {
        let event = InputEvent::Button {
            device: 1,
            button: JoyButton::START,
            pressed: true,
        };
        assert_eq!(event.to_string(), "device 1 button start pressed");

        let event = InputEvent::Connection {
            device: 0,
            connected: false,
        };
        assert_eq!(event.to_string(), "device 0 disconnected");

        let event = InputEvent::Axis {
            device: 2,
            axis: JoyAxis::TRIGGER_LEFT,
            value: 0.5,
        };
        assert_eq!(event.to_string(), "device 2 axis lefttrigger = 0.500");
    }

    #[test]
    fn test_json_serialization() {
        let event = InputEvent::Button {
            device: 0,
            button: JoyButton::A,
            pressed: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"button","device":0,"button":0,"pressed":true}"#);

        let event = InputEvent::Connection {
            device: 4,
            connected: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"connection","device":4,"connected":true}"#);
    }
}
