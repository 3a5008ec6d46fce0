//! Single-line health report emitted in response to `HEALTH` / `STATUS`.

use std::fmt;

use crate::{MOTOR_COUNT, PROTOCOL_VERSION};

/// Device identity fields that never change at runtime.
pub const DEVICE_NAME: &str = "NECK";
pub const DEVICE_ROLE: &str = "STEWART_NECK";
pub const SERIAL_BAUD: u32 = 115_200;
pub const BLUETOOTH_NAME: &str = "NECK_BT";

/// Snapshot of the controller registers rendered as one `|`-separated line.
///
/// ```
/// use neckos_types::HealthReport;
///
/// let report = HealthReport {
///     uptime_ms: 1500,
///     speed_hz: 48_000,
///     accel: 36_000,
///     bypass_clamp: false,
/// };
/// assert!(report.to_string().starts_with("HEALTH|DEVICE=NECK|"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// Milliseconds since the controller booted.
    pub uptime_ms: u64,
    /// Current base stepper speed in Hz.
    pub speed_hz: u32,
    /// Current base stepper acceleration in steps/s².
    pub accel: u32,
    /// Whether the mechanical travel clamp is currently bypassed.
    pub bypass_clamp: bool,
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HEALTH|DEVICE={DEVICE_NAME}|ROLE={DEVICE_ROLE}|PROTO={PROTOCOL_VERSION}\
             |UPTIME_MS={}|BAUD={SERIAL_BAUD}|BT_NAME={BLUETOOTH_NAME}|MOTORS={MOTOR_COUNT}\
             |SPEED_HZ={}|ACCEL={}|BYPASS_CLAMP={}",
            self.uptime_ms,
            self.speed_hz,
            self.accel,
            if self.bypass_clamp { 1 } else { 0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_line_has_expected_fields() {
        let report = HealthReport {
            uptime_ms: 12_345,
            speed_hz: 48_000,
            accel: 36_000,
            bypass_clamp: false,
        };
        let line = report.to_string();
        assert_eq!(
            line,
            "HEALTH|DEVICE=NECK|ROLE=STEWART_NECK|PROTO=1|UPTIME_MS=12345|BAUD=115200\
             |BT_NAME=NECK_BT|MOTORS=6|SPEED_HZ=48000|ACCEL=36000|BYPASS_CLAMP=0"
        );
    }

    #[test]
    fn bypass_clamp_renders_as_one_when_set() {
        let report = HealthReport {
            uptime_ms: 0,
            speed_hz: 1,
            accel: 1,
            bypass_clamp: true,
        };
        assert!(report.to_string().ends_with("BYPASS_CLAMP=1"));
    }
}
