//! # Translation Engine
//!
//! Converts one raw physical event into the canonical event a device mapping
//! assigns to it.
//!
//! This module handles:
//! - Button → button / axis translation
//! - Half-axis and full-axis range conversion (with optional inversion)
//! - Hat decomposition into four directional outputs
//!
//! The engine is stateless. Change suppression, D-pad mutual exclusion and
//! trigger renormalization belong to the [`Dispatcher`](crate::registry::Dispatcher).

pub mod translate;

pub use translate::{map_axis, map_button, map_hat, MappedEvent};
