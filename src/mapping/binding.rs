//! # Mapping Model
//!
//! Typed form of one mapping-database record: a device identity plus an
//! ordered list of input→output bindings. Each side of a binding is a tagged
//! variant, matched exhaustively by the translation engine.

use super::symbols::{AxisRange, HatDirection, JoyAxis, JoyButton};

/// Physical source of a binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingInput {
    /// Raw button ordinal.
    Button(JoyButton),
    /// Raw axis ordinal, restricted to `range`, optionally inverted first.
    Axis {
        axis: JoyAxis,
        range: AxisRange,
        invert: bool,
    },
    /// One direction of a raw hat.
    Hat { hat: u8, direction: HatDirection },
    /// Token could not be decoded; never matches raw input.
    Unknown,
}

/// Canonical target of a binding. Hats are never targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingOutput {
    Button(JoyButton),
    Axis { axis: JoyAxis, range: AxisRange },
    /// Token could not be decoded; produces no event.
    Unknown,
}

/// One directed `input → output` rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub input: BindingInput,
    pub output: BindingOutput,
}

impl Binding {
    /// Whether either side failed to decode.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self.input, BindingInput::Unknown) || matches!(self.output, BindingOutput::Unknown)
    }
}

/// A device's record in the mapping database.
///
/// Bindings are kept in file order; for any raw input the first matching
/// binding wins.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMapping {
    /// Identity key, matched exactly against runtime device uids.
    pub uid: String,
    /// Human-readable name from the database.
    pub name: String,
    pub bindings: Vec<Binding>,
}

impl DeviceMapping {
    /// Creates a mapping record.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            bindings,
        }
    }

    /// Bindings whose both sides decoded.
    pub fn valid_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|binding| !binding.is_unknown())
    }
}
