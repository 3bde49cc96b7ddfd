//! Force-feedback requests.
//!
//! The host writes a request per device; backend poll loops read it back and
//! drive the hardware. A new request replaces the previous one.

use serde::Serialize;

/// Last vibration request for a device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vibration {
    /// High-frequency motor strength, `[0, 1]`.
    pub weak_magnitude: f32,
    /// Low-frequency motor strength, `[0, 1]`.
    pub strong_magnitude: f32,
    /// Requested duration in seconds.
    pub duration_secs: f32,
    /// Wall-clock time of the request in milliseconds since the Unix epoch.
    /// Zero means no request was made.
    pub timestamp_ms: u64,
}

impl Vibration {
    /// Builds a request, clamping magnitudes to `[0, 1]` and the duration to `>= 0`.
    #[must_use]
    pub fn new(weak: f32, strong: f32, duration_secs: f32, timestamp_ms: u64) -> Self {
        Self {
            weak_magnitude: clamp_unit(weak),
            strong_magnitude: clamp_unit(strong),
            duration_secs: if duration_secs.is_finite() { duration_secs.max(0.0) } else { 0.0 },
            timestamp_ms,
        }
    }

    /// Whether the request is still within its duration at `now_ms`.
    #[must_use]
    pub fn is_active(&self, now_ms: u64) -> bool {
        if self.timestamp_ms == 0 {
            return false;
        }
        let elapsed_ms = now_ms.saturating_sub(self.timestamp_ms) as f64;
        elapsed_ms <= f64::from(self.duration_secs) * 1000.0
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
