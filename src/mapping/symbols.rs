//! # Canonical Symbols
//!
//! The engine's own vocabulary for buttons, axes and hats. Raw hardware
//! ordinals and database tokens are both translated into these types.
//!
//! ## Button ordinals
//!
//! | Ordinal | Name | Database token |
//! |---------|------|----------------|
//! | 0 | A | `a` |
//! | 1 | B | `b` |
//! | 2 | X | `x` |
//! | 3 | Y | `y` |
//! | 4 | Back | `back` |
//! | 5 | Guide | `guide` |
//! | 6 | Start | `start` |
//! | 7 | Left stick | `leftstick` |
//! | 8 | Right stick | `rightstick` |
//! | 9 | Left shoulder | `leftshoulder` |
//! | 10 | Right shoulder | `rightshoulder` |
//! | 11-14 | D-pad up/down/left/right | `dpup` / `dpadup` ... |
//! | 15 | Misc 1 | `misc1` |
//! | 16-19 | Paddles 1-4 | `paddle1` ... |
//! | 20 | Touchpad | `touchpad` |
//!
//! Ordinals 21..128 carry no name and are addressed as `b<N>`.
//!
//! ## Axis ordinals
//!
//! | Ordinal | Name | Database token |
//! |---------|------|----------------|
//! | 0 | Left X | `leftx` |
//! | 1 | Left Y | `lefty` |
//! | 2 | Right X | `rightx` |
//! | 3 | Right Y | `righty` |
//! | 4 | Left trigger | `lefttrigger` |
//! | 5 | Right trigger | `righttrigger` |
//!
//! Ordinals 6..10 carry no name and are addressed as `a<N>`.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

const BUTTON_NAMES: [&str; 21] = [
    "a",
    "b",
    "x",
    "y",
    "back",
    "guide",
    "start",
    "leftstick",
    "rightstick",
    "leftshoulder",
    "rightshoulder",
    "dpup",
    "dpdown",
    "dpleft",
    "dpright",
    "misc1",
    "paddle1",
    "paddle2",
    "paddle3",
    "paddle4",
    "touchpad",
];

const AXIS_NAMES: [&str; 6] = [
    "leftx",
    "lefty",
    "rightx",
    "righty",
    "lefttrigger",
    "righttrigger",
];

/// A canonical button, addressed by ordinal in `0..JoyButton::COUNT`.
///
/// # Examples
///
/// ```
/// use padmap::mapping::JoyButton;
///
/// assert_eq!(JoyButton::from_name("start"), Some(JoyButton::START));
/// assert_eq!(JoyButton::from_index(0), Some(JoyButton::A));
/// assert_eq!(JoyButton::from_index(128), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JoyButton(u8);

impl JoyButton {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const X: Self = Self(2);
    pub const Y: Self = Self(3);
    pub const BACK: Self = Self(4);
    pub const GUIDE: Self = Self(5);
    pub const START: Self = Self(6);
    pub const LEFT_STICK: Self = Self(7);
    pub const RIGHT_STICK: Self = Self(8);
    pub const LEFT_SHOULDER: Self = Self(9);
    pub const RIGHT_SHOULDER: Self = Self(10);
    pub const DPAD_UP: Self = Self(11);
    pub const DPAD_DOWN: Self = Self(12);
    pub const DPAD_LEFT: Self = Self(13);
    pub const DPAD_RIGHT: Self = Self(14);
    pub const MISC1: Self = Self(15);
    pub const PADDLE1: Self = Self(16);
    pub const PADDLE2: Self = Self(17);
    pub const PADDLE3: Self = Self(18);
    pub const PADDLE4: Self = Self(19);
    pub const TOUCHPAD: Self = Self(20);

    /// Number of addressable button ordinals.
    pub const COUNT: usize = 128;

    /// Returns the button at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Ordinal of this button.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Resolves a database button name.
    ///
    /// Accepts both the short (`dpup`) and long (`dpadup`) D-pad spellings.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dpadup" => Some(Self::DPAD_UP),
            "dpaddown" => Some(Self::DPAD_DOWN),
            "dpadleft" => Some(Self::DPAD_LEFT),
            "dpadright" => Some(Self::DPAD_RIGHT),
            _ => BUTTON_NAMES
                .iter()
                .position(|candidate| *candidate == name)
                .map(|index| Self(index as u8)),
        }
    }

    /// Database name of a named button.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        BUTTON_NAMES.get(self.index()).copied()
    }

    /// Whether this is one of the four D-pad buttons.
    #[must_use]
    pub fn is_dpad(self) -> bool {
        self.opposite_dpad().is_some()
    }

    /// The D-pad button on the opposite side of the same axis.
    #[must_use]
    pub fn opposite_dpad(self) -> Option<Self> {
        match self {
            Self::DPAD_UP => Some(Self::DPAD_DOWN),
            Self::DPAD_DOWN => Some(Self::DPAD_UP),
            Self::DPAD_LEFT => Some(Self::DPAD_RIGHT),
            Self::DPAD_RIGHT => Some(Self::DPAD_LEFT),
            _ => None,
        }
    }
}

impl fmt::Display for JoyButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "b{}", self.0),
        }
    }
}

/// A canonical axis, addressed by ordinal in `0..JoyAxis::COUNT`.
///
/// Stick axes use `[-1.0, 1.0]`. Trigger axes are delivered in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JoyAxis(u8);

impl JoyAxis {
    pub const LEFT_X: Self = Self(0);
    pub const LEFT_Y: Self = Self(1);
    pub const RIGHT_X: Self = Self(2);
    pub const RIGHT_Y: Self = Self(3);
    pub const TRIGGER_LEFT: Self = Self(4);
    pub const TRIGGER_RIGHT: Self = Self(5);

    /// Number of addressable axis ordinals.
    pub const COUNT: usize = 10;

    /// Returns the axis at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Ordinal of this axis.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Resolves a database axis name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        AXIS_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| Self(index as u8))
    }

    /// Database name of a named axis.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        AXIS_NAMES.get(self.index()).copied()
    }

    /// Whether this axis is one of the two analog triggers.
    #[must_use]
    pub fn is_trigger(self) -> bool {
        self == Self::TRIGGER_LEFT || self == Self::TRIGGER_RIGHT
    }
}

impl fmt::Display for JoyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "a{}", self.0),
        }
    }
}

bitflags! {
    /// Directions currently held on a hat (POV switch).
    ///
    /// Opposing bits are never set together by real hardware, but any
    /// combination is accepted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HatMask: u8 {
        const UP = 1;
        const RIGHT = 2;
        const DOWN = 4;
        const LEFT = 8;
    }
}

impl HatMask {
    /// No direction held.
    pub const CENTER: Self = Self::empty();
}

/// One cardinal direction of a hat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatDirection {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl HatDirection {
    /// All directions in ordinal order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Ordinal of this direction.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The single mask bit for this direction.
    #[must_use]
    pub fn mask(self) -> HatMask {
        HatMask::from_bits_truncate(1 << self.index())
    }

    /// Direction for a mask holding exactly one bit.
    #[must_use]
    pub fn from_mask(mask: HatMask) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.mask() == mask)
    }

    /// D-pad button a hat direction produces when no mapping overrides it.
    #[must_use]
    pub fn dpad_button(self) -> JoyButton {
        match self {
            Self::Up => JoyButton::DPAD_UP,
            Self::Right => JoyButton::DPAD_RIGHT,
            Self::Down => JoyButton::DPAD_DOWN,
            Self::Left => JoyButton::DPAD_LEFT,
        }
    }
}

/// Portion of a physical axis occupied by one side of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisRange {
    /// `[-1.0, 0.0)`
    NegativeHalf,
    /// `[-1.0, 1.0]`
    #[default]
    Full,
    /// `[0.0, 1.0]`
    PositiveHalf,
}

impl AxisRange {
    /// Whether `value` falls inside this range.
    #[must_use]
    pub fn accepts(self, value: f32) -> bool {
        match self {
            Self::Full => true,
            Self::PositiveHalf => value >= 0.0,
            Self::NegativeHalf => value < 0.0,
        }
    }

    /// Remaps a value from this range onto `[0.0, 1.0]`.
    #[must_use]
    pub fn to_unit(self, value: f32) -> f32 {
        match self {
            Self::PositiveHalf => value,
            Self::NegativeHalf => value + 1.0,
            Self::Full => (value + 1.0) / 2.0,
        }
    }

    /// Expands a `[0.0, 1.0]` value into this range's convention.
    #[must_use]
    pub fn from_unit(self, unit: f32) -> f32 {
        match self {
            Self::PositiveHalf => unit,
            Self::NegativeHalf => unit - 1.0,
            Self::Full => unit * 2.0 - 1.0,
        }
    }

    /// Press magnitude of a `[0.0, 1.0]` value read from this range.
    ///
    /// A negative half-axis presses harder the further it travels from zero.
    #[must_use]
    pub fn press_magnitude(self, unit: f32) -> f32 {
        match self {
            Self::PositiveHalf => unit,
            Self::NegativeHalf => 1.0 - unit,
            Self::Full => unit * 2.0 - 1.0,
        }
    }

    /// Value an axis in this range takes when driven by a digital input.
    #[must_use]
    pub fn digital_value(self) -> f32 {
        match self {
            Self::NegativeHalf => -1.0,
            Self::Full | Self::PositiveHalf => 1.0,
        }
    }
}
