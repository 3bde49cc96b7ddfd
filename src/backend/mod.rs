//! # Backend Module
//!
//! Platform adapters that read raw hardware input and report it to a
//! [`Dispatcher`](crate::registry::Dispatcher) as `(device, ordinal, value)`
//! triples.

pub mod evdev;

pub use self::evdev::{probe, EvdevJoypad, InputLayout, RawInput};
