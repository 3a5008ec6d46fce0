//! The controller's explicit register file.
//!
//! Base speed/accel, the clamp bypass and the platform calibration all live
//! in one [`ControllerState`] owned by the control loop – no module-level
//! globals, so the coupling between commands stays visible and testable.

use serde::{Deserialize, Serialize};

/// Platform calibration and base motion registers.
///
/// The scale values are platform-specific tuning for this particular
/// leadscrew rig, not a general kinematic solve – change them only against
/// the physical machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Base step rate in Hz; multiplied by each command's `S` field.
    pub base_speed_hz: f32,
    /// Base acceleration in steps/s²; multiplied by each command's `A` field.
    pub base_accel: f32,
    /// Steps contributed per unit of the `X` (yaw) term.
    pub pitch_scale: f32,
    /// Steps contributed per unit of the `Y` (lateral) term.
    pub roll_scale: f32,
    /// Steps contributed per unit of the `Z` (front/back) term.
    pub yaw_scale: f32,
    /// Steps contributed per unit of the `P` (pitch) term.
    pub pitch_movement_scale: f32,
    /// Steps contributed per unit of the `R` (roll) term.
    pub roll_movement_scale: f32,
    /// Steps per millimetre of neck height (`H` term and travel clamp).
    pub height_scale: f32,
    /// Lower mechanical travel limit in millimetres.
    pub min_clamp_mm: f32,
    /// Upper mechanical travel limit in millimetres.
    pub max_clamp_mm: f32,
    /// Steps per millimetre for direct per-stepper commands.  Coincides with
    /// `height_scale` on this leadscrew geometry but is a separate register.
    pub steps_per_mm: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_speed_hz: 48_000.0,
            base_accel: 36_000.0,
            pitch_scale: 10.0,
            roll_scale: 10.0,
            yaw_scale: 10.0,
            pitch_movement_scale: 10.0,
            roll_movement_scale: 10.0,
            height_scale: 400.0,
            min_clamp_mm: 0.0,
            max_clamp_mm: 80.0,
            steps_per_mm: 400.0,
        }
    }
}

impl ControllerConfig {
    /// Convert a direct-command millimetre target to absolute steps.
    pub fn mm_to_steps(&self, mm: f32) -> i64 {
        (mm * self.steps_per_mm).round() as i64
    }
}

/// Mutable controller registers, persisting for the life of the process and
/// reset only by homing or power-cycle.
#[derive(Debug, Clone, Copy)]
pub struct ControllerState {
    pub config: ControllerConfig,
    /// Disables the mechanical travel clamp.  True only while a homing
    /// sequence is executing.
    pub clamp_bypass: bool,
}

impl ControllerState {
    /// Fresh registers with the clamp active.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            clamp_bypass: false,
        }
    }
}
