//! # Error Types
//!
//! Custom error types for padmap using `thiserror`.

use thiserror::Error;

/// Main error type for padmap
#[derive(Debug, Error)]
pub enum PadmapError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device slot outside of the registry pool
    #[error("Invalid device id: {0}")]
    InvalidDevice(usize),

    /// Raw event for a slot with no connected device
    #[error("Device {0} is not connected")]
    DeviceNotConnected(usize),

    /// Raw button ordinal outside of the canonical button range
    #[error("Invalid button ordinal: {0}")]
    InvalidButton(usize),

    /// Raw axis ordinal outside of the canonical axis range
    #[error("Invalid axis ordinal: {0}")]
    InvalidAxis(usize),

    /// Raw axis value that is not a finite number
    #[error("Invalid axis value: {0}")]
    InvalidAxisValue(f32),

    /// Controller backend errors
    #[error("Controller error: {0}")]
    Controller(String),
}

/// Result type alias for padmap
pub type Result<T> = std::result::Result<T, PadmapError>;
