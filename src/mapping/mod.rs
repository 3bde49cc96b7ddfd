//! # Mapping Module
//!
//! Canonical symbols, the mapping model and the mapping-database parser.
//!
//! This module handles:
//! - The canonical button/axis/hat vocabulary
//! - Typed bindings and per-device mapping records
//! - Parsing SDL `gamecontrollerdb.txt` lines
//! - Loading and looking up the mapping database

pub mod binding;
pub mod database;
pub mod parser;
pub mod symbols;

pub use binding::{Binding, BindingInput, BindingOutput, DeviceMapping};
pub use database::{MappingDatabase, SDL_CONFIG_ENV};
pub use parser::{
    classify, decode_axis, decode_button, decode_hat, parse_binding, MappingParser, TokenKind,
};
pub use symbols::{AxisRange, HatDirection, HatMask, JoyAxis, JoyButton};
