//! Per-event translation through a [`DeviceMapping`].
//!
//! ## Axis ranges
//!
//! Every axis binding side declares a range. An input value is first
//! filtered by the input range, then remapped onto `[0, 1]`:
//!
//! | Input range | Accepts | `[0, 1]` value |
//! |-------------|---------|----------------|
//! | Positive half | `v >= 0` | `v` |
//! | Negative half | `v < 0` | `v + 1` |
//! | Full | all | `(v + 1) / 2` |
//!
//! An axis output with the same range as its input receives the value
//! unchanged; otherwise the `[0, 1]` value is expanded into the output range.
//!
//! ## Usage
//!
//! ```
//! use padmap::engine::{map_axis, MappedEvent};
//! use padmap::mapping::{JoyAxis, MappingParser};
//!
//! let line = "uid,Pad,a2:+a0,platform:Linux";
//! let mapping = MappingParser::new(line.as_bytes()).next().unwrap();
//!
//! match map_axis(&mapping, JoyAxis::LEFT_X, 0.6) {
//!     Some(MappedEvent::Axis { axis, value }) => {
//!         assert_eq!(axis, JoyAxis::RIGHT_X);
//!         assert!((value - 0.2).abs() < 1e-5);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert!(map_axis(&mapping, JoyAxis::LEFT_X, -0.3).is_none());
//! ```

use crate::mapping::{BindingInput, BindingOutput, DeviceMapping, HatDirection, JoyAxis, JoyButton};

/// Canonical result of translating one raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedEvent {
    /// A canonical button.
    ///
    /// `value` is the press magnitude in `[0, 1]` when driven by an axis,
    /// and `1.0` when driven by a digital input.
    Button { button: JoyButton, value: f32 },
    /// A canonical axis. For digital sources `value` is the value to send
    /// while the source is held.
    Axis { axis: JoyAxis, value: f32 },
}

/// Event produced by a digital source (button or hat direction) held down.
fn digital_target(output: BindingOutput) -> Option<MappedEvent> {
    match output {
        BindingOutput::Button(button) => Some(MappedEvent::Button { button, value: 1.0 }),
        BindingOutput::Axis { axis, range } => Some(MappedEvent::Axis {
            axis,
            value: range.digital_value(),
        }),
        BindingOutput::Unknown => None,
    }
}

/// Translates a raw button through `mapping`.
///
/// The first binding whose input is this button and whose output decoded
/// decides the result. `None` means the mapping assigns nothing to the button.
#[must_use]
pub fn map_button(mapping: &DeviceMapping, button: JoyButton) -> Option<MappedEvent> {
    mapping
        .bindings
        .iter()
        .filter(|binding| binding.input == BindingInput::Button(button))
        .find_map(|binding| digital_target(binding.output))
}

/// Translates a raw axis value through `mapping`.
///
/// Scans the axis bindings for `axis` in order; a binding matches when the
/// (possibly inverted) value falls within its input range. The first match
/// with a decoded output decides the result.
#[must_use]
pub fn map_axis(mapping: &DeviceMapping, axis: JoyAxis, value: f32) -> Option<MappedEvent> {
    for binding in &mapping.bindings {
        let BindingInput::Axis {
            axis: input_axis,
            range,
            invert,
        } = binding.input
        else {
            continue;
        };

        if input_axis != axis {
            continue;
        }

        let value = if invert { -value } else { value };
        if !range.accepts(value) {
            continue;
        }

        let unit = range.to_unit(value);
        match binding.output {
            BindingOutput::Button(button) => {
                return Some(MappedEvent::Button {
                    button,
                    value: range.press_magnitude(unit),
                });
            }
            BindingOutput::Axis {
                axis: output_axis,
                range: output_range,
            } => {
                let value = if output_range == range {
                    value
                } else {
                    output_range.from_unit(unit)
                };
                return Some(MappedEvent::Axis {
                    axis: output_axis,
                    value,
                });
            }
            BindingOutput::Unknown => continue,
        }
    }
    None
}

/// Builds the per-direction output table for one hat.
///
/// Every direction starts as its D-pad button. Directions the mapping binds
/// explicitly (first binding per direction wins) take that binding's output.
/// Bindings with an undecodable output are skipped.
///
/// Slots are indexed by [`HatDirection::index`].
#[must_use]
pub fn map_hat(mapping: Option<&DeviceMapping>, hat: u8) -> [Option<MappedEvent>; 4] {
    let mut events = HatDirection::ALL.map(|direction| {
        Some(MappedEvent::Button {
            button: direction.dpad_button(),
            value: 1.0,
        })
    });

    let Some(mapping) = mapping else {
        return events;
    };

    let mut assigned = [false; 4];
    for binding in &mapping.bindings {
        let BindingInput::Hat {
            hat: input_hat,
            direction,
        } = binding.input
        else {
            continue;
        };

        let slot = direction.index();
        if input_hat != hat || assigned[slot] {
            continue;
        }

        let Some(target) = digital_target(binding.output) else {
            continue;
        };
        assigned[slot] = true;
        events[slot] = Some(target);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{parse_binding, MappingParser};

    fn mapping(tokens: &str) -> DeviceMapping {
        let line = format!("uid,Test Pad,{},platform:Linux,", tokens);
        MappingParser::new(line.as_bytes()).next().unwrap()
    }

    fn axis_value(event: Option<MappedEvent>) -> (JoyAxis, f32) {
        match event {
            Some(MappedEvent::Axis { axis, value }) => (axis, value),
            other => panic!("expected axis event, got {:?}", other),
        }
    }

    fn button_value(event: Option<MappedEvent>) -> (JoyButton, f32) {
        match event {
            Some(MappedEvent::Button { button, value }) => (button, value),
            other => panic!("expected button event, got {:?}", other),
        }
    }

    // ==================== map_button Tests ====================

    #[test]
    fn test_map_button_to_button() {
        let m = mapping("a:b1,b:b0");
        assert_eq!(button_value(map_button(&m, JoyButton::B)), (JoyButton::A, 1.0));
        assert_eq!(button_value(map_button(&m, JoyButton::A)), (JoyButton::B, 1.0));
    }

    #[test]
    fn test_map_button_to_axis_ranges() {
        let m = mapping("+lefttrigger:b6,-leftx:b7,righttrigger:b8");
        let b = |i| JoyButton::from_index(i).unwrap();

        assert_eq!(axis_value(map_button(&m, b(6))), (JoyAxis::TRIGGER_LEFT, 1.0));
        assert_eq!(axis_value(map_button(&m, b(7))), (JoyAxis::LEFT_X, -1.0));
        assert_eq!(axis_value(map_button(&m, b(8))), (JoyAxis::TRIGGER_RIGHT, 1.0));
    }

    #[test]
    fn test_map_button_unmatched() {
        let m = mapping("a:b0");
        assert!(map_button(&m, JoyButton::X).is_none());
    }

    #[test]
    fn test_map_button_first_match_wins() {
        let m = mapping("x:b0,y:b0");
        assert_eq!(button_value(map_button(&m, JoyButton::A)).0, JoyButton::X);
    }

    #[test]
    fn test_map_button_skips_unknown_output() {
        let mut m = mapping("a:b0");
        m.bindings.insert(0, parse_binding("bogus:b0"));
        assert_eq!(button_value(map_button(&m, JoyButton::A)), (JoyButton::A, 1.0));

        // Hat tokens are not valid outputs
        let m = mapping("h0.1:b3,y:b3");
        assert_eq!(button_value(map_button(&m, JoyButton::Y)).0, JoyButton::Y);
    }

    #[test]
    fn test_map_button_only_unknown_output_yields_nothing() {
        let m = mapping("misc9:b0");
        assert!(map_button(&m, JoyButton::A).is_none());
    }

    // ==================== map_axis Tests ====================

    #[test]
    fn test_map_axis_identity_full_range() {
        let m = mapping("leftx:a0");
        let (axis, value) = axis_value(map_axis(&m, JoyAxis::LEFT_X, 0.5));
        assert_eq!(axis, JoyAxis::LEFT_X);
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_map_axis_half_to_full() {
        let m = mapping("a2:+a0");
        let (axis, value) = axis_value(map_axis(&m, JoyAxis::LEFT_X, 0.6));
        assert_eq!(axis, JoyAxis::RIGHT_X);
        assert!((value - 0.2).abs() < 1e-5);

        assert!(map_axis(&m, JoyAxis::LEFT_X, -0.3).is_none());
    }

    #[test]
    fn test_map_axis_full_to_half() {
        let m = mapping("+righttrigger:a5");
        let (_, value) = axis_value(map_axis(&m, JoyAxis::TRIGGER_RIGHT, -1.0));
        assert_eq!(value, 0.0);
        let (_, value) = axis_value(map_axis(&m, JoyAxis::TRIGGER_RIGHT, 1.0));
        assert_eq!(value, 1.0);
        let (_, value) = axis_value(map_axis(&m, JoyAxis::TRIGGER_RIGHT, 0.0));
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_map_axis_negative_half_to_negative_half_passes_value() {
        let m = mapping("-lefty:-a1");
        let (_, value) = axis_value(map_axis(&m, JoyAxis::LEFT_Y, -0.4));
        assert_eq!(value, -0.4);
    }

    #[test]
    fn test_map_axis_split_halves() {
        let m = mapping("-leftx:-a0,+rightx:+a0");
        assert_eq!(axis_value(map_axis(&m, JoyAxis::LEFT_X, -0.25)).0, JoyAxis::LEFT_X);
        assert_eq!(axis_value(map_axis(&m, JoyAxis::LEFT_X, 0.25)).0, JoyAxis::RIGHT_X);
    }

    #[test]
    fn test_map_axis_invert() {
        let m = mapping("lefty:a1~");
        let (_, value) = axis_value(map_axis(&m, JoyAxis::LEFT_Y, 0.75));
        assert_eq!(value, -0.75);
    }

    #[test]
    fn test_map_axis_invert_applies_before_range_filter() {
        let m = mapping("+lefttrigger:+a2~");
        assert!(map_axis(&m, JoyAxis::RIGHT_X, 0.5).is_none());
        let (_, value) = axis_value(map_axis(&m, JoyAxis::RIGHT_X, -0.5));
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_map_axis_to_button_magnitudes() {
        let m = mapping("dpleft:-a0,dpright:+a0");

        let (button, value) = button_value(map_axis(&m, JoyAxis::LEFT_X, -1.0));
        assert_eq!(button, JoyButton::DPAD_LEFT);
        assert_eq!(value, 1.0);

        let (button, value) = button_value(map_axis(&m, JoyAxis::LEFT_X, 0.8));
        assert_eq!(button, JoyButton::DPAD_RIGHT);
        assert!((value - 0.8).abs() < 1e-6);

        let (button, value) = button_value(map_axis(&m, JoyAxis::LEFT_X, 0.0));
        assert_eq!(button, JoyButton::DPAD_RIGHT);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_map_axis_full_to_button() {
        let m = mapping("a:a3");
        let (_, value) = button_value(map_axis(&m, JoyAxis::RIGHT_Y, 1.0));
        assert_eq!(value, 1.0);
        let (_, value) = button_value(map_axis(&m, JoyAxis::RIGHT_Y, -1.0));
        assert_eq!(value, -1.0);
    }

    #[test]
    fn test_map_axis_skips_unknown_output() {
        let m = mapping("misc9:b0,a:b0,misc9:a1,leftx:a1");
        let (axis, value) = axis_value(map_axis(&m, JoyAxis::LEFT_Y, 0.5));
        assert_eq!(axis, JoyAxis::LEFT_X);
        assert_eq!(value, 0.5);
        assert_eq!(button_value(map_button(&m, JoyButton::A)).0, JoyButton::A);

        let m = mapping("misc9:a1");
        assert!(map_axis(&m, JoyAxis::LEFT_Y, 0.5).is_none());
    }

    #[test]
    fn test_map_axis_other_axis_ignored() {
        let m = mapping("leftx:a0");
        assert!(map_axis(&m, JoyAxis::LEFT_Y, 0.5).is_none());
    }

    // ==================== map_hat Tests ====================

    #[test]
    fn test_map_hat_identity_without_mapping() {
        let events = map_hat(None, 0);
        for direction in HatDirection::ALL {
            assert_eq!(
                events[direction.index()],
                Some(MappedEvent::Button {
                    button: direction.dpad_button(),
                    value: 1.0
                })
            );
        }
    }

    #[test]
    fn test_map_hat_overrides_bound_directions() {
        let m = mapping("y:h0.1,-lefty:h0.4");
        let events = map_hat(Some(&m), 0);

        assert_eq!(button_value(events[HatDirection::Up.index()]), (JoyButton::Y, 1.0));
        assert_eq!(axis_value(events[HatDirection::Down.index()]), (JoyAxis::LEFT_Y, -1.0));
        // Unbound directions keep their D-pad default
        assert_eq!(
            button_value(events[HatDirection::Left.index()]).0,
            JoyButton::DPAD_LEFT
        );
    }

    #[test]
    fn test_map_hat_ignores_other_hats() {
        let m = mapping("y:h1.1");
        let events = map_hat(Some(&m), 0);
        assert_eq!(button_value(events[HatDirection::Up.index()]).0, JoyButton::DPAD_UP);
    }

    #[test]
    fn test_map_hat_first_binding_per_direction_wins() {
        let m = mapping("x:h0.2,y:h0.2");
        let events = map_hat(Some(&m), 0);
        assert_eq!(button_value(events[HatDirection::Right.index()]).0, JoyButton::X);
    }

    #[test]
    fn test_map_hat_skips_unknown_output() {
        let m = mapping("bogus:h0.8");
        let events = map_hat(Some(&m), 0);
        assert_eq!(
            button_value(events[HatDirection::Left.index()]).0,
            JoyButton::DPAD_LEFT
        );

        let m = mapping("bogus:h0.8,x:h0.8");
        let events = map_hat(Some(&m), 0);
        assert_eq!(button_value(events[HatDirection::Left.index()]).0, JoyButton::X);
    }
}
