//! Raw event intake and canonical event emission.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::joypad::{name_uid, Joypad};
use super::vibration::{now_ms, Vibration};
use crate::engine::{map_axis, map_button, map_hat, MappedEvent};
use crate::error::{PadmapError, Result};
use crate::event::{EventReceiver, EventSender, InputEvent};
use crate::mapping::{DeviceMapping, HatDirection, HatMask, JoyAxis, JoyButton, MappingDatabase};

/// Default number of device slots.
pub const DEFAULT_MAX_DEVICES: usize = 16;

/// Default magnitude above which an axis-driven button counts as pressed.
pub const DEFAULT_PRESS_THRESHOLD: f32 = 0.5;

/// Hat routed through mappings. Devices with more hats only report the first.
const PRIMARY_HAT: u8 = 0;

/// Construction options for a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherOptions {
    /// Number of device slots.
    pub max_devices: usize,
    /// Press threshold for axis-to-button bindings.
    pub press_threshold: f32,
    /// Uid of the mapping used for devices with no exact match.
    pub fallback_uid: Option<String>,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            max_devices: DEFAULT_MAX_DEVICES,
            press_threshold: DEFAULT_PRESS_THRESHOLD,
            fallback_uid: None,
        }
    }
}

/// Mutable state shared by every entry point.
struct Registry {
    joypads: Vec<Joypad>,
    pressed: BTreeSet<(usize, JoyButton)>,
    axes: BTreeMap<(usize, JoyAxis), f32>,
    vibrations: BTreeMap<usize, Vibration>,
    events: EventSender,
}

impl Registry {
    fn slot(&self, id: usize) -> Result<&Joypad> {
        self.joypads.get(id).ok_or(PadmapError::InvalidDevice(id))
    }

    fn connected_mut(&mut self, id: usize) -> Result<&mut Joypad> {
        match self.joypads.get_mut(id) {
            None => Err(PadmapError::InvalidDevice(id)),
            Some(joypad) if !joypad.connected => Err(PadmapError::DeviceNotConnected(id)),
            Some(joypad) => Ok(joypad),
        }
    }

    fn is_pressed(&self, id: usize, button: JoyButton) -> bool {
        self.pressed.contains(&(id, button))
    }

    fn emit(&self, event: InputEvent) {
        debug!("{}", event);
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped, discarding {}", event);
        }
    }

    fn send_button(&mut self, device: usize, button: JoyButton, pressed: bool) {
        if pressed {
            self.pressed.insert((device, button));
        } else {
            self.pressed.remove(&(device, button));
        }
        self.emit(InputEvent::Button {
            device,
            button,
            pressed,
        });
    }

    fn send_axis(&mut self, device: usize, axis: JoyAxis, value: f32) {
        self.axes.insert((device, axis), value);
        self.emit(InputEvent::Axis {
            device,
            axis,
            value,
        });
    }

    /// Sends a digital (button or hat) source change through its mapped target.
    fn send_digital(&mut self, device: usize, target: MappedEvent, held: bool) {
        match target {
            MappedEvent::Button { button, .. } => self.send_button(device, button, held),
            MappedEvent::Axis { axis, value } => {
                self.send_axis(device, axis, if held { value } else { 0.0 })
            }
        }
    }

    /// Releases every pressed button and zeroes every non-zero axis of `device`.
    fn release_all(&mut self, device: usize) {
        let pressed: Vec<JoyButton> = self
            .pressed
            .iter()
            .filter(|(id, _)| *id == device)
            .map(|(_, button)| *button)
            .collect();
        for button in pressed {
            self.send_button(device, button, false);
        }

        let active: Vec<JoyAxis> = self
            .axes
            .iter()
            .filter(|((id, _), value)| *id == device && **value != 0.0)
            .map(|((_, axis), _)| *axis)
            .collect();
        for axis in active {
            self.send_axis(device, axis, 0.0);
        }

        self.axes.retain(|(id, _), _| *id != device);
    }
}

/// Device registry and event dispatcher.
///
/// Backends report raw inputs per device slot; the dispatcher translates them
/// through the slot's mapping and sends canonical [`InputEvent`]s to the
/// receiver returned by [`Dispatcher::new`]. All entry points take `&self`
/// and may be called from any thread.
///
/// # Examples
///
/// ```
/// use padmap::event::InputEvent;
/// use padmap::mapping::{JoyButton, MappingDatabase};
/// use padmap::registry::{Dispatcher, DispatcherOptions};
///
/// let (dispatcher, mut events) =
///     Dispatcher::new(MappingDatabase::new(), DispatcherOptions::default());
/// let id = dispatcher.unused_device_id().unwrap();
/// dispatcher.update_connection(id, true, "Generic Pad", "").unwrap();
/// dispatcher.raw_button(id, 6, true).unwrap();
///
/// assert_eq!(events.try_recv().unwrap(), InputEvent::Connection { device: id, connected: true });
/// assert_eq!(
///     events.try_recv().unwrap(),
///     InputEvent::Button { device: id, button: JoyButton::START, pressed: true }
/// );
/// ```
pub struct Dispatcher {
    database: Arc<MappingDatabase>,
    fallback: Option<usize>,
    press_threshold: f32,
    registry: Mutex<Registry>,
}

impl Dispatcher {
    /// Creates a dispatcher with `options.max_devices` empty slots.
    pub fn new(
        database: impl Into<Arc<MappingDatabase>>,
        options: DispatcherOptions,
    ) -> (Self, EventReceiver) {
        let database = database.into();
        let (events, receiver) = mpsc::unbounded_channel();

        let fallback = options.fallback_uid.as_deref().and_then(|uid| {
            let index = database.find(uid);
            if index.is_none() {
                warn!("Fallback mapping {} not found in database", uid);
            }
            index
        });

        let registry = Registry {
            joypads: vec![Joypad::default(); options.max_devices],
            pressed: BTreeSet::new(),
            axes: BTreeMap::new(),
            vibrations: BTreeMap::new(),
            events,
        };

        let dispatcher = Self {
            database,
            fallback,
            press_threshold: options.press_threshold,
            registry: Mutex::new(registry),
        };
        (dispatcher, receiver)
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mapping database shared with this dispatcher.
    #[must_use]
    pub fn database(&self) -> &MappingDatabase {
        &self.database
    }

    /// Number of device slots.
    #[must_use]
    pub fn max_devices(&self) -> usize {
        self.registry().joypads.len()
    }

    /// Lowest free slot, or `None` when every slot is connected.
    #[must_use]
    pub fn unused_device_id(&self) -> Option<usize> {
        self.registry().joypads.iter().position(|joypad| !joypad.connected)
    }

    /// Connects or disconnects a device slot.
    ///
    /// On connect an empty `uid` is replaced by [`name_uid`] of `name`.
    /// `name` and `uid` are ignored on disconnect. Disconnecting a free slot
    /// emits nothing.
    pub fn update_connection(
        &self,
        id: usize,
        connected: bool,
        name: &str,
        uid: &str,
    ) -> Result<()> {
        if connected {
            self.connect(id, name, uid)
        } else {
            self.disconnect(id)
        }
    }

    fn connect(&self, id: usize, name: &str, uid: &str) -> Result<()> {
        let mut registry = self.registry();
        registry.slot(id).map_err(rejected)?;

        let uid = if uid.is_empty() {
            name_uid(name)
        } else {
            uid.to_string()
        };

        let (mapping, name) = match self.database.find(&uid) {
            Some(index) => {
                let name = self
                    .database
                    .get(index)
                    .map_or_else(|| name.to_string(), |mapping| mapping.name.clone());
                (Some(index), name)
            }
            None => (self.fallback, name.to_string()),
        };

        // Reconnecting an occupied slot drops whatever it still held
        registry.release_all(id);

        match mapping {
            Some(index) => {
                info!("Device {} connected: {} ({}), mapping #{}", id, name, uid, index)
            }
            None => info!("Device {} connected: {} ({}), unmapped", id, name, uid),
        }

        registry.joypads[id] = Joypad::connected(name, uid, mapping);
        registry.emit(InputEvent::Connection {
            device: id,
            connected: true,
        });
        Ok(())
    }

    fn disconnect(&self, id: usize) -> Result<()> {
        let mut registry = self.registry();
        registry.slot(id).map_err(rejected)?;

        registry.release_all(id);
        registry.vibrations.remove(&id);

        let joypad = std::mem::take(&mut registry.joypads[id]);
        if joypad.connected {
            info!("Device {} disconnected: {}", id, joypad.name);
            registry.emit(InputEvent::Connection {
                device: id,
                connected: false,
            });
        }
        Ok(())
    }

    fn mapping(&self, index: Option<usize>) -> Option<&DeviceMapping> {
        index.and_then(|index| self.database.get(index))
    }

    /// Reports a raw button change.
    pub fn raw_button(&self, id: usize, ordinal: usize, pressed: bool) -> Result<()> {
        let mut registry = self.registry();
        let joypad = registry.connected_mut(id).map_err(rejected)?;
        let button = JoyButton::from_index(ordinal)
            .ok_or_else(|| rejected(PadmapError::InvalidButton(ordinal)))?;

        let slot = &mut joypad.last_buttons[button.index()];
        if *slot == pressed {
            return Ok(());
        }
        *slot = pressed;

        let Some(mapping) = self.mapping(joypad.mapping) else {
            registry.send_button(id, button, pressed);
            return Ok(());
        };

        match map_button(mapping, button) {
            Some(target) => registry.send_digital(id, target, pressed),
            None => debug!("Device {} raw button {} is not mapped", id, ordinal),
        }
        Ok(())
    }

    /// Reports a raw axis value in `[-1, 1]`.
    pub fn raw_axis(&self, id: usize, ordinal: usize, value: f32) -> Result<()> {
        let mut registry = self.registry();
        let joypad = registry.connected_mut(id).map_err(rejected)?;
        let axis = JoyAxis::from_index(ordinal)
            .ok_or_else(|| rejected(PadmapError::InvalidAxis(ordinal)))?;
        if !value.is_finite() {
            return Err(rejected(PadmapError::InvalidAxisValue(value)));
        }

        let slot = &mut joypad.last_axes[axis.index()];
        if slot.to_bits() == value.to_bits() {
            return Ok(());
        }
        *slot = value;

        let Some(mapping) = self.mapping(joypad.mapping) else {
            registry.send_axis(id, axis, value);
            return Ok(());
        };

        match map_axis(mapping, axis, value) {
            Some(MappedEvent::Button { button, value }) => {
                let pressed = value > self.press_threshold;

                if let Some(opposite) = button.opposite_dpad() {
                    if registry.is_pressed(id, opposite) {
                        registry.send_button(id, opposite, false);
                    }
                }

                if registry.is_pressed(id, button) != pressed {
                    registry.send_button(id, button, pressed);
                }
            }
            Some(MappedEvent::Axis { axis, value }) => {
                let value = if axis.is_trigger() { 0.5 + value / 2.0 } else { value };
                registry.send_axis(id, axis, value);
            }
            None => {}
        }
        Ok(())
    }

    /// Reports the held directions of the device's first hat.
    pub fn raw_hat(&self, id: usize, hat: HatMask) -> Result<()> {
        let mut registry = self.registry();
        let joypad = registry.connected_mut(id).map_err(rejected)?;

        let previous = std::mem::replace(&mut joypad.hat, hat);
        if previous == hat {
            return Ok(());
        }

        let targets = map_hat(self.mapping(joypad.mapping), PRIMARY_HAT);
        for direction in HatDirection::ALL {
            let held = hat.contains(direction.mask());
            if held == previous.contains(direction.mask()) {
                continue;
            }
            if let Some(target) = targets[direction.index()] {
                registry.send_digital(id, target, held);
            }
        }
        Ok(())
    }

    /// Records a vibration request for `id`, replacing any earlier one.
    pub fn set_vibration(
        &self,
        id: usize,
        weak: f32,
        strong: f32,
        duration_secs: f32,
    ) -> Result<()> {
        let mut registry = self.registry();
        registry.slot(id)?;

        let vibration = Vibration::new(weak, strong, duration_secs, now_ms());
        debug!(
            "Device {} vibration weak={:.2} strong={:.2} for {:.2}s",
            id, vibration.weak_magnitude, vibration.strong_magnitude, vibration.duration_secs
        );
        registry.vibrations.insert(id, vibration);
        Ok(())
    }

    /// Last vibration request for `id`; all zeroes when there is none.
    #[must_use]
    pub fn vibration(&self, id: usize) -> Vibration {
        self.registry().vibrations.get(&id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_connected(&self, id: usize) -> bool {
        self.registry().joypads.get(id).is_some_and(|joypad| joypad.connected)
    }

    /// Display name of a connected device.
    #[must_use]
    pub fn device_name(&self, id: usize) -> Option<String> {
        self.connected(id, |joypad| joypad.name.clone())
    }

    /// Uid of a connected device.
    #[must_use]
    pub fn device_uid(&self, id: usize) -> Option<String> {
        self.connected(id, |joypad| joypad.uid.clone())
    }

    /// Whether a connected device resolved to a mapping, exact or fallback.
    #[must_use]
    pub fn is_mapped_gamepad(&self, id: usize) -> bool {
        self.connected(id, |joypad| joypad.mapping.is_some()).unwrap_or(false)
    }

    fn connected<T>(&self, id: usize, read: impl FnOnce(&Joypad) -> T) -> Option<T> {
        self.registry()
            .joypads
            .get(id)
            .filter(|joypad| joypad.connected)
            .map(read)
    }

    /// Whether the canonical `button` is currently pressed on `id`.
    #[must_use]
    pub fn is_button_pressed(&self, id: usize, button: JoyButton) -> bool {
        self.registry().is_pressed(id, button)
    }

    /// Last canonical value sent for `axis` on `id`, zero if none.
    #[must_use]
    pub fn axis_value(&self, id: usize, axis: JoyAxis) -> f32 {
        self.registry().axes.get(&(id, axis)).copied().unwrap_or(0.0)
    }
}

fn rejected(error: PadmapError) -> PadmapError {
    warn!("Rejected raw input: {}", error);
    error
}
