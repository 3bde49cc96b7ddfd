//! # Device Registry
//!
//! Owns a fixed pool of device slots and turns raw backend input into
//! canonical [`InputEvent`](crate::event::InputEvent)s.
//!
//! ## Pipeline
//!
//! | Raw input | Unmapped device | Mapped device |
//! |-----------|-----------------|---------------|
//! | button | same ordinal | [`map_button`](crate::engine::map_button) |
//! | axis | same ordinal and value | [`map_axis`](crate::engine::map_axis), thresholded for buttons, triggers rescaled to `[0, 1]` |
//! | hat | D-pad buttons | [`map_hat`](crate::engine::map_hat) |
//!
//! Repeated raw values are dropped before translation. Axis-driven D-pad
//! buttons never hold both directions of an opposing pair.

pub mod dispatcher;
pub mod joypad;
pub mod vibration;

pub use dispatcher::{Dispatcher, DispatcherOptions, DEFAULT_MAX_DEVICES, DEFAULT_PRESS_THRESHOLD};
pub use joypad::{name_uid, Joypad};
pub use vibration::{now_ms, Vibration};
