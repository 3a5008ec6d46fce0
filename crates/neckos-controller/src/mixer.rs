//! The fixed linear kinematic mixing matrix and mechanical clamp.
//!
//! Six actuators combine the yaw/lateral/front-back/pitch/roll terms through
//! a fixed sign matrix – platform-specific tuning for this rig, not a
//! Stewart-platform inverse-kinematics solve.  The height offset is added
//! identically to all six, and unless the clamp is bypassed every target is
//! held inside the mechanical travel range.

use neckos_types::{GeneralCommand, MOTOR_COUNT};

use crate::state::ControllerConfig;

/// The result of mixing one movement command: six absolute step targets and
/// the shared speed/acceleration to apply.  Computed fresh per command; no
/// trajectory state persists here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorTarget {
    pub steps: [i64; MOTOR_COUNT],
    pub speed_hz: f32,
    pub accel: f32,
}

/// Mix a general command into per-actuator step targets.
///
/// With `clamp_bypass` false each target is clamped to
/// `[min_clamp_mm, max_clamp_mm] * height_scale`; homing sets the bypass to
/// reach the hard stop beyond the soft range.
pub fn mix(cmd: &GeneralCommand, config: &ControllerConfig, clamp_bypass: bool) -> ActuatorTarget {
    let ax = cmd.angle_x * config.pitch_scale;
    let ay = cmd.angle_y * config.roll_scale;
    let az = cmd.angle_z * config.yaw_scale;
    let p = cmd.pitch * config.pitch_movement_scale;
    let r = cmd.roll * config.roll_movement_scale;
    let h = cmd.height_mm * config.height_scale;

    // Fixed sign matrix: rows are actuators 1..6, columns are
    // (angleX, angleY, angleZ, pitch, roll).
    let raw = [
        -ax + ay + az + p + r,
        ax - ay - az + p + r,
        -ax - ay - az - p + r,
        ax + ay - az - p - r,
        -ax + ay - az + p - r,
        ax - ay + az + p - r,
    ];

    let lo = config.min_clamp_mm * config.height_scale;
    let hi = config.max_clamp_mm * config.height_scale;

    let mut steps = [0i64; MOTOR_COUNT];
    for (slot, term) in steps.iter_mut().zip(raw) {
        let target = term + h;
        let target = if clamp_bypass {
            target
        } else {
            target.clamp(lo, hi)
        };
        *slot = target.round() as i64;
    }

    ActuatorTarget {
        steps,
        speed_hz: config.base_speed_hz * cmd.speed,
        accel: config.base_accel * cmd.accel,
    }
}
