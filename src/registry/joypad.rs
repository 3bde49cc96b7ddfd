//! Per-slot device state.

use crate::mapping::{HatMask, JoyAxis, JoyButton};

/// Number of uid characters taken from a device name when no uid is given.
const NAME_UID_BYTES: usize = 16;

/// State of one device slot.
///
/// The last raw button/axis/hat values are the only source for change
/// suppression; they are reset whenever the slot is (re)connected.
#[derive(Debug, Clone)]
pub struct Joypad {
    /// Display name (the database name when a mapping matched).
    pub name: String,
    /// Identity used for mapping lookup.
    pub uid: String,
    pub connected: bool,
    /// Index into the mapping database, resolved at connection time.
    pub mapping: Option<usize>,
    pub(crate) last_buttons: [bool; JoyButton::COUNT],
    pub(crate) last_axes: [f32; JoyAxis::COUNT],
    pub(crate) hat: HatMask,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            name: String::new(),
            uid: String::new(),
            connected: false,
            mapping: None,
            last_buttons: [false; JoyButton::COUNT],
            last_axes: [0.0; JoyAxis::COUNT],
            hat: HatMask::CENTER,
        }
    }
}

impl Joypad {
    /// Fresh state for a newly connected device.
    #[must_use]
    pub fn connected(name: String, uid: String, mapping: Option<usize>) -> Self {
        Self {
            name,
            uid,
            connected: true,
            mapping,
            ..Self::default()
        }
    }
}

/// Derives a uid from a device name by hex-encoding its first 16 bytes.
///
/// Devices whose names share that prefix get the same uid.
///
/// # Examples
///
/// ```
/// use padmap::registry::name_uid;
///
/// assert_eq!(name_uid("Pad"), "506164");
/// ```
#[must_use]
pub fn name_uid(name: &str) -> String {
    name.bytes()
        .take(NAME_UID_BYTES)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
