//! # padmap
//!
//! Translate raw gamepad input into a canonical button and axis layout using
//! SDL `gamecontrollerdb.txt` mappings.
//!
//! This library provides the mapping-database parser, the per-event
//! translation engine, and a device registry that turns raw backend input into
//! a stream of canonical events.

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod mapping;
pub mod registry;
