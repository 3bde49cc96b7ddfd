//! # Linux evdev Backend
//!
//! Discovers joysticks under `/dev/input` and feeds their raw input into a
//! [`Dispatcher`].
//!
//! ## Raw ordinals
//!
//! | Source | Ordinal assignment |
//! |--------|--------------------|
//! | Keys `BTN_JOYSTICK..KEY_MAX` | sequential from 0, ascending code |
//! | Keys `BTN_MISC..BTN_JOYSTICK` | continue after the above |
//! | Absolute axes below `ABS_MISC`, hats excluded | sequential from 0 |
//! | `ABS_HAT0X` / `ABS_HAT0Y` | hat mask (left/right, up/down) |
//!
//! This matches the numbering used by SDL's Linux joystick driver, so `b<n>`
//! and `a<n>` tokens in `gamecontrollerdb.txt` line up with these ordinals.
//!
//! ## Device uid
//!
//! Bus type, vendor, product and version are byte-swapped and interleaved with
//! zero words, giving the 32-hex-digit uid used as the database key.

use evdev::{AbsoluteAxisType, AttributeSetRef, Device, EventType, InputEventKind};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{PadmapError, Result};
use crate::mapping::{HatMask, JoyAxis, JoyButton};
use crate::registry::Dispatcher;

/// Directory scanned for event devices
pub const INPUT_DIR: &str = "/dev/input";

/// First generic button code (`BTN_MISC`)
const BTN_MISC: u16 = 0x100;

/// First joystick button code (`BTN_JOYSTICK`)
const BTN_JOYSTICK: u16 = 0x120;

/// Highest key code (`KEY_MAX`)
const KEY_MAX: u16 = 0x2ff;

/// First axis code that is never reported as a raw axis (`ABS_MISC`)
const ABS_MISC: u16 = 0x28;

/// Raw input decoded from one evdev event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    Button { ordinal: usize, pressed: bool },
    Axis { ordinal: usize, value: f32 },
    Hat(HatMask),
}

/// Absolute axis calibration
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisSlot {
    ordinal: usize,
    minimum: i32,
    maximum: i32,
}

/// Raw ordinal tables for one device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputLayout {
    buttons: HashMap<u16, usize>,
    axes: HashMap<u16, AxisSlot>,
}

impl InputLayout {
    /// Builds ordinal tables from supported key codes and `(code, min, max)` axes.
    pub fn new<K, A>(keys: K, axes: A) -> Self
    where
        K: IntoIterator<Item = u16>,
        A: IntoIterator<Item = (u16, i32, i32)>,
    {
        let mut keys: Vec<u16> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let ordered = keys
            .iter()
            .filter(|code| (BTN_JOYSTICK..KEY_MAX).contains(*code))
            .chain(keys.iter().filter(|code| (BTN_MISC..BTN_JOYSTICK).contains(*code)));

        let buttons = ordered
            .take(JoyButton::COUNT)
            .enumerate()
            .map(|(ordinal, code)| (*code, ordinal))
            .collect();

        let mut axes: Vec<(u16, i32, i32)> = axes
            .into_iter()
            .filter(|(code, _, _)| *code < ABS_MISC && !is_hat(*code))
            .collect();
        axes.sort_unstable_by_key(|(code, _, _)| *code);
        axes.dedup_by_key(|(code, _, _)| *code);

        let axes = axes
            .into_iter()
            .take(JoyAxis::COUNT)
            .enumerate()
            .map(|(ordinal, (code, minimum, maximum))| {
                (
                    code,
                    AxisSlot {
                        ordinal,
                        minimum,
                        maximum,
                    },
                )
            })
            .collect();

        Self { buttons, axes }
    }

    /// Reads the layout of an open device
    pub fn from_device(device: &Device) -> Self {
        let keys = device
            .supported_keys()
            .map(|keys| keys.iter().map(|key| key.code()).collect::<Vec<_>>())
            .unwrap_or_default();

        let axes = match (device.supported_absolute_axes(), device.get_abs_state()) {
            (Some(supported), Ok(state)) => supported
                .iter()
                .filter_map(|axis| {
                    state
                        .get(usize::from(axis.0))
                        .map(|info| (axis.0, info.minimum, info.maximum))
                })
                .collect(),
            (Some(_), Err(e)) => {
                warn!("Could not read axis ranges: {}", e);
                Vec::new()
            }
            (None, _) => Vec::new(),
        };

        Self::new(keys, axes)
    }

    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    #[must_use]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

fn is_hat(code: u16) -> bool {
    (AbsoluteAxisType::ABS_HAT0X.0..=AbsoluteAxisType::ABS_HAT3Y.0).contains(&code)
}

/// Maps `value` from `[minimum, maximum]` onto `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use padmap::backend::evdev::normalize;
///
/// assert_eq!(normalize(0, 0, 255), -1.0);
/// assert_eq!(normalize(255, 0, 255), 1.0);
/// assert_eq!(normalize(0, -32768, 32767).abs() < 1e-4, true);
/// ```
#[must_use]
pub fn normalize(value: i32, minimum: i32, maximum: i32) -> f32 {
    let span = i64::from(maximum) - i64::from(minimum);
    if span <= 0 {
        return 0.0;
    }
    let offset = i64::from(value) - i64::from(minimum);
    let value = 2.0 * offset as f64 / span as f64 - 1.0;
    value.clamp(-1.0, 1.0) as f32
}

/// SDL-style device uid, or `None` when vendor, product or version is unknown.
///
/// # Examples
///
/// ```
/// use padmap::backend::evdev::device_uid;
///
/// assert_eq!(
///     device_uid(0x0003, 0x045e, 0x028e, 0x0114).as_deref(),
///     Some("030000005e0400008e02000014010000")
/// );
/// assert_eq!(device_uid(0x0003, 0, 0x028e, 0x0114), None);
/// ```
#[must_use]
pub fn device_uid(bus: u16, vendor: u16, product: u16, version: u16) -> Option<String> {
    if vendor == 0 || product == 0 || version == 0 {
        return None;
    }
    Some(format!(
        "{:04x}0000{:04x}0000{:04x}0000{:04x}0000",
        bus.swap_bytes(),
        vendor.swap_bytes(),
        product.swap_bytes(),
        version.swap_bytes()
    ))
}

/// Whether the device reports keys and at least one analog stick
pub fn is_gamepad(device: &Device) -> bool {
    let events = device.supported_events();
    if !events.contains(EventType::KEY) || !events.contains(EventType::ABSOLUTE) {
        return false;
    }
    device.supported_absolute_axes().is_some_and(has_stick)
}

fn has_stick(axes: &AttributeSetRef<AbsoluteAxisType>) -> bool {
    (axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y))
        || (axes.contains(AbsoluteAxisType::ABS_RX) && axes.contains(AbsoluteAxisType::ABS_RY))
}

/// An opened evdev joystick bound to a dispatcher slot
pub struct EvdevJoypad {
    device: Device,
    path: PathBuf,
    id: usize,
    layout: InputLayout,
    hat: HatMask,
}

impl EvdevJoypad {
    /// Opens `path` if it is a gamepad, without registering it.
    ///
    /// # Errors
    ///
    /// - `Io`: the device cannot be opened
    /// - `Controller`: the device is not a gamepad
    pub fn open<P: AsRef<Path>>(path: P, id: usize) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path)?;
        if !is_gamepad(&device) {
            return Err(PadmapError::Controller(format!(
                "{} is not a gamepad",
                path.display()
            )));
        }

        let layout = InputLayout::from_device(&device);
        Ok(Self {
            device,
            path: path.to_path_buf(),
            id,
            layout,
            hat: HatMask::CENTER,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dispatcher slot of this device
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unknown Joystick")
    }

    /// Database uid, empty when the device does not report full ids
    #[must_use]
    pub fn uid(&self) -> String {
        let input_id = self.device.input_id();
        device_uid(
            input_id.bus_type().0,
            input_id.vendor(),
            input_id.product(),
            input_id.version(),
        )
        .unwrap_or_default()
    }

    #[must_use]
    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// Decodes one evdev event, updating the held hat mask.
    pub fn process_event(&mut self, event: &evdev::InputEvent) -> Option<RawInput> {
        decode_event(&self.layout, &mut self.hat, event)
    }

    /// Blocks for the next batch of events and forwards them to `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error when reading fails, typically on unplug.
    pub fn pump(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        let events: Vec<evdev::InputEvent> = self
            .device
            .fetch_events()
            .map_err(|e| PadmapError::Controller(format!("Failed to fetch events: {}", e)))?
            .collect();

        for event in &events {
            let Some(input) = self.process_event(event) else {
                continue;
            };
            let result = match input {
                RawInput::Button { ordinal, pressed } => {
                    dispatcher.raw_button(self.id, ordinal, pressed)
                }
                RawInput::Axis { ordinal, value } => dispatcher.raw_axis(self.id, ordinal, value),
                RawInput::Hat(mask) => dispatcher.raw_hat(self.id, mask),
            };
            if let Err(e) = result {
                debug!("Device {} input dropped: {}", self.id, e);
            }
        }
        Ok(())
    }

    /// Pumps events until the device fails, then frees its slot.
    pub fn run(mut self, dispatcher: &Dispatcher) {
        loop {
            if let Err(e) = self.pump(dispatcher) {
                warn!("Device {} ({}) lost: {}", self.id, self.path.display(), e);
                break;
            }
        }
        if let Err(e) = dispatcher.update_connection(self.id, false, "", "") {
            warn!("Could not release device {}: {}", self.id, e);
        }
    }
}

fn decode_event(
    layout: &InputLayout,
    hat: &mut HatMask,
    event: &evdev::InputEvent,
) -> Option<RawInput> {
    match event.kind() {
        InputEventKind::Key(key) => layout.buttons.get(&key.code()).map(|ordinal| RawInput::Button {
            ordinal: *ordinal,
            pressed: event.value() != 0,
        }),
        InputEventKind::AbsAxis(axis) if axis == AbsoluteAxisType::ABS_HAT0X => {
            hat.remove(HatMask::LEFT | HatMask::RIGHT);
            if event.value() < 0 {
                hat.insert(HatMask::LEFT);
            } else if event.value() > 0 {
                hat.insert(HatMask::RIGHT);
            }
            Some(RawInput::Hat(*hat))
        }
        InputEventKind::AbsAxis(axis) if axis == AbsoluteAxisType::ABS_HAT0Y => {
            hat.remove(HatMask::UP | HatMask::DOWN);
            if event.value() < 0 {
                hat.insert(HatMask::UP);
            } else if event.value() > 0 {
                hat.insert(HatMask::DOWN);
            }
            Some(RawInput::Hat(*hat))
        }
        InputEventKind::AbsAxis(axis) => layout.axes.get(&axis.0).map(|slot| RawInput::Axis {
            ordinal: slot.ordinal,
            value: normalize(event.value(), slot.minimum, slot.maximum),
        }),
        _ => None,
    }
}

/// Lists `event*` nodes under `dir` in sorted order
pub fn event_nodes<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("event"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Opens and registers every gamepad not already in `known`.
///
/// Each new device takes the lowest free dispatcher slot; scanning stops
/// once the pool is full.
pub fn probe(dispatcher: &Dispatcher, known: &HashSet<PathBuf>) -> Result<Vec<EvdevJoypad>> {
    let mut found = Vec::new();

    for path in event_nodes(INPUT_DIR)? {
        if known.contains(&path) {
            continue;
        }

        let Some(id) = dispatcher.unused_device_id() else {
            warn!(
                "All {} device slots in use, skipping {}",
                dispatcher.max_devices(),
                path.display()
            );
            break;
        };

        let joypad = match EvdevJoypad::open(&path, id) {
            Ok(joypad) => joypad,
            Err(e) => {
                // Permission denied, or not a joystick
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let uid = joypad.uid();
        dispatcher.update_connection(id, true, joypad.name(), &uid)?;
        info!(
            "Opened {} as device {} ({} buttons, {} axes)",
            path.display(),
            id,
            joypad.layout().button_count(),
            joypad.layout().axis_count()
        );
        found.push(joypad);
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{AttributeSet, Key};

    fn make_axis_event(axis: AbsoluteAxisType, value: i32) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn make_key_event(key: Key, pressed: bool) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::KEY, key.code(), if pressed { 1 } else { 0 })
    }

    fn gamepad_layout() -> InputLayout {
        InputLayout::new(
            [
                Key::BTN_SOUTH.code(),
                Key::BTN_EAST.code(),
                Key::BTN_NORTH.code(),
                Key::BTN_WEST.code(),
                Key::BTN_START.code(),
            ],
            [
                (AbsoluteAxisType::ABS_X.0, -32768, 32767),
                (AbsoluteAxisType::ABS_Y.0, -32768, 32767),
                (AbsoluteAxisType::ABS_Z.0, 0, 255),
                (AbsoluteAxisType::ABS_HAT0X.0, -1, 1),
                (AbsoluteAxisType::ABS_HAT0Y.0, -1, 1),
            ],
        )
    }

    // ==================== uid Tests ====================

    #[test]
    fn test_device_uid_xbox() {
        assert_eq!(
            device_uid(0x0003, 0x045e, 0x028e, 0x0110).as_deref(),
            Some("030000005e0400008e02000010010000")
        );
    }

    #[test]
    fn test_device_uid_dualsense() {
        let uid = device_uid(0x0005, 0x054c, 0x0ce6, 0x8100).unwrap();
        assert_eq!(uid, "050000004c050000e60c000000810000");
        assert_eq!(uid.len(), 32);
    }

    #[test]
    fn test_device_uid_missing_ids() {
        assert!(device_uid(0x0003, 0x045e, 0, 0x0110).is_none());
        assert!(device_uid(0x0003, 0x045e, 0x028e, 0).is_none());
    }

    // ==================== normalize Tests ====================

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(-32768, -32768, 32767), -1.0);
        assert_eq!(normalize(32767, -32768, 32767), 1.0);
        assert_eq!(normalize(128, 0, 256), 0.0);
    }

    #[test]
    fn test_normalize_out_of_range_clamps() {
        assert_eq!(normalize(300, 0, 255), 1.0);
        assert_eq!(normalize(-5, 0, 255), -1.0);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        assert_eq!(normalize(5, 10, 10), 0.0);
        assert_eq!(normalize(5, 10, 0), 0.0);
    }

    #[test]
    fn test_normalize_extreme_range() {
        assert_eq!(normalize(i32::MAX, i32::MIN, i32::MAX), 1.0);
        assert_eq!(normalize(i32::MIN, i32::MIN, i32::MAX), -1.0);
    }

    // ==================== InputLayout Tests ====================

    #[test]
    fn test_layout_gamepad_buttons_in_code_order() {
        let layout = gamepad_layout();
        assert_eq!(layout.button_count(), 5);
        assert_eq!(layout.buttons[&Key::BTN_SOUTH.code()], 0);
        assert_eq!(layout.buttons[&Key::BTN_EAST.code()], 1);
        assert_eq!(layout.buttons[&Key::BTN_NORTH.code()], 2);
        assert_eq!(layout.buttons[&Key::BTN_WEST.code()], 3);
        assert_eq!(layout.buttons[&Key::BTN_START.code()], 4);
    }

    #[test]
    fn test_layout_misc_buttons_come_last() {
        let layout = InputLayout::new(
            [Key::BTN_0.code(), Key::BTN_TRIGGER.code(), Key::KEY_A.code()],
            [],
        );
        assert_eq!(layout.buttons[&Key::BTN_TRIGGER.code()], 0);
        assert_eq!(layout.buttons[&Key::BTN_0.code()], 1);
        // Keyboard keys are below BTN_MISC
        assert!(!layout.buttons.contains_key(&Key::KEY_A.code()));
    }

    #[test]
    fn test_layout_axes_skip_hats() {
        let layout = gamepad_layout();
        assert_eq!(layout.axis_count(), 3);
        assert_eq!(layout.axes[&AbsoluteAxisType::ABS_X.0].ordinal, 0);
        assert_eq!(layout.axes[&AbsoluteAxisType::ABS_Y.0].ordinal, 1);
        assert_eq!(layout.axes[&AbsoluteAxisType::ABS_Z.0].ordinal, 2);
        assert!(!layout.axes.contains_key(&AbsoluteAxisType::ABS_HAT0X.0));
    }

    #[test]
    fn test_layout_ignores_misc_axes() {
        let layout = InputLayout::new([], [(ABS_MISC, 0, 1), (AbsoluteAxisType::ABS_X.0, 0, 1)]);
        assert_eq!(layout.axis_count(), 1);
    }

    #[test]
    fn test_has_stick() {
        let mut axes = AttributeSet::<AbsoluteAxisType>::new();
        axes.insert(AbsoluteAxisType::ABS_X);
        assert!(!has_stick(&axes));
        axes.insert(AbsoluteAxisType::ABS_Y);
        assert!(has_stick(&axes));

        let mut right = AttributeSet::<AbsoluteAxisType>::new();
        right.insert(AbsoluteAxisType::ABS_RX);
        right.insert(AbsoluteAxisType::ABS_RY);
        assert!(has_stick(&right));
    }

    // ==================== decode_event Tests ====================

    #[test]
    fn test_decode_key_events() {
        let layout = gamepad_layout();
        let mut hat = HatMask::CENTER;

        assert_eq!(
            decode_event(&layout, &mut hat, &make_key_event(Key::BTN_START, true)),
            Some(RawInput::Button {
                ordinal: 4,
                pressed: true
            })
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_key_event(Key::BTN_SOUTH, false)),
            Some(RawInput::Button {
                ordinal: 0,
                pressed: false
            })
        );
        // Unsupported key
        assert_eq!(decode_event(&layout, &mut hat, &make_key_event(Key::BTN_TL, true)), None);
    }

    #[test]
    fn test_decode_axis_events() {
        let layout = gamepad_layout();
        let mut hat = HatMask::CENTER;

        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_Z, 255)),
            Some(RawInput::Axis {
                ordinal: 2,
                value: 1.0
            })
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_X, -32768)),
            Some(RawInput::Axis {
                ordinal: 0,
                value: -1.0
            })
        );
        let event = make_axis_event(AbsoluteAxisType::ABS_RZ, 10);
        assert_eq!(decode_event(&layout, &mut hat, &event), None);
    }

    #[test]
    fn test_decode_hat_keeps_diagonals() {
        let layout = gamepad_layout();
        let mut hat = HatMask::CENTER;

        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_HAT0Y, -1)),
            Some(RawInput::Hat(HatMask::UP))
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_HAT0X, 1)),
            Some(RawInput::Hat(HatMask::UP | HatMask::RIGHT))
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_HAT0X, -1)),
            Some(RawInput::Hat(HatMask::UP | HatMask::LEFT))
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_HAT0Y, 0)),
            Some(RawInput::Hat(HatMask::LEFT))
        );
        assert_eq!(
            decode_event(&layout, &mut hat, &make_axis_event(AbsoluteAxisType::ABS_HAT0X, 0)),
            Some(RawInput::Hat(HatMask::CENTER))
        );
    }

    #[test]
    fn test_decode_ignores_sync_events() {
        let layout = gamepad_layout();
        let mut hat = HatMask::CENTER;
        let sync = evdev::InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        assert_eq!(decode_event(&layout, &mut hat, &sync), None);
    }

    // ==================== Hardware Tests ====================

    #[test]
    #[ignore] // Requires input devices
    fn test_event_nodes_sorted() {
        let nodes = event_nodes(INPUT_DIR).unwrap();
        let mut sorted = nodes.clone();
        sorted.sort();
        assert_eq!(nodes, sorted);
    }

    #[test]
    #[ignore] // Requires a connected gamepad
    fn test_probe_registers_gamepads() {
        use crate::mapping::MappingDatabase;
        use crate::registry::DispatcherOptions;

        let (dispatcher, _rx) =
            Dispatcher::new(MappingDatabase::new(), DispatcherOptions::default());
        let joypads = probe(&dispatcher, &HashSet::new()).unwrap();
        assert!(!joypads.is_empty(), "No gamepad found");
        for joypad in &joypads {
            assert!(dispatcher.is_connected(joypad.id()));
            assert!(joypad.layout().button_count() > 0 || joypad.layout().axis_count() > 0);
        }
    }
}
