//! [`CommandSynthesizer`] – deltas + acceleration → a clamped wire command.
//!
//! The mapping is deliberately linear: per-channel gains scaled by a global
//! sensitivity, an exponential filter per channel, a user trim offset, and a
//! mechanical clamp.  The output is a [`GeneralCommand`]; rendering and
//! emission pacing happen elsewhere.

use serde::{Deserialize, Serialize};

use neckos_attitude::Vec3;
use neckos_types::GeneralCommand;

use crate::baseline::OrientationDelta;
use crate::smoothing::SmoothingState;

/// Symmetric travel clamp for the five signed channels, in command units.
pub const TRAVEL_LIMIT: f32 = 700.0;
/// Height channel clamp, in millimetres.
pub const HEIGHT_MIN_MM: f32 = 0.0;
pub const HEIGHT_MAX_MM: f32 = 70.0;
/// Speed/accel multipliers are clamped to this range.
pub const MULTIPLIER_MAX: f32 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Tunables
// ────────────────────────────────────────────────────────────────────────────

/// Per-channel gains applied to the raw delta before smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelGains {
    pub yaw_gain: f32,
    pub pitch_gain: f32,
    pub roll_gain: f32,
    pub heading_gain: f32,
    pub accel_y_gain: f32,
    pub accel_z_gain: f32,
    pub accel_h_gain: f32,
}

impl Default for ChannelGains {
    fn default() -> Self {
        Self {
            yaw_gain: 1.0,
            pitch_gain: 1.0,
            roll_gain: 1.0,
            heading_gain: 1.0,
            accel_y_gain: 1.0,
            accel_z_gain: 1.0,
            accel_h_gain: 1.0,
        }
    }
}

/// User trim offsets added after smoothing, per channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOffsets {
    pub yaw: f32,
    pub lateral: f32,
    pub front_back: f32,
    pub height: f32,
    pub roll: f32,
    pub pitch: f32,
}

/// Full producer tuning: gains, offsets, sensitivity, smoothing and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub gains: ChannelGains,
    pub offsets: ChannelOffsets,
    /// Global multiplier on the three rotational channels.
    pub sensitivity: f32,
    /// EMA coefficient shared by all six channels (clamped to `[0.1, 0.95]`
    /// when applied).
    pub smoothing_alpha: f32,
    /// Speed multiplier sent as the `S` field, clamped to `[0, 10]`.
    pub speed_multiplier: f32,
    /// Acceleration multiplier sent as the `A` field, clamped to `[0, 10]`.
    pub accel_multiplier: f32,
    /// Minimum interval between dispatched commands, in milliseconds.
    pub command_interval_ms: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            gains: ChannelGains::default(),
            offsets: ChannelOffsets::default(),
            sensitivity: 1.0,
            smoothing_alpha: 0.6,
            speed_multiplier: 1.0,
            accel_multiplier: 1.0,
            command_interval_ms: 85,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CommandSynthesizer
// ────────────────────────────────────────────────────────────────────────────

/// Maps an [`OrientationDelta`] plus linear acceleration into the six
/// smoothed, clamped channels of a [`GeneralCommand`].
#[derive(Debug)]
pub struct CommandSynthesizer {
    config: SynthesizerConfig,
    smoothing: SmoothingState,
}

impl CommandSynthesizer {
    /// Create a synthesizer from tuning values.
    pub fn new(config: SynthesizerConfig) -> Self {
        Self {
            smoothing: SmoothingState::new(config.smoothing_alpha),
            config,
        }
    }

    /// Current tuning.
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Replace the tuning, keeping the smoothing accumulators (the session
    /// resets them explicitly on re-baseline triggers).
    pub fn set_config(&mut self, config: SynthesizerConfig) {
        self.smoothing.set_alpha(config.smoothing_alpha);
        self.config = config;
    }

    /// Restore default tuning.
    pub fn reset_tuning(&mut self) {
        self.set_config(SynthesizerConfig::default());
    }

    /// Invalidate all smoothing accumulators (baseline invalidation).
    pub fn reset_smoothing(&mut self) {
        self.smoothing.reset();
    }

    /// Produce the next command from a baseline-relative delta and the
    /// device's linear acceleration.
    pub fn synthesize(&mut self, delta: &OrientationDelta, accel: Vec3) -> GeneralCommand {
        let g = &self.config.gains;
        let sens = self.config.sensitivity;

        let raw_yaw = sens * (delta.yaw_deg * g.yaw_gain + delta.heading_deg * g.heading_gain);
        let raw_pitch = sens * delta.pitch_deg * g.pitch_gain;
        let raw_roll = sens * delta.roll_deg * g.roll_gain;
        let raw_lateral = accel.x * g.accel_y_gain;
        let raw_front_back = -accel.z * g.accel_z_gain;
        let raw_height = accel.y * g.accel_h_gain;

        let o = &self.config.offsets;
        let yaw = clamp_travel(self.smoothing.yaw.update(raw_yaw) + o.yaw);
        let lateral = clamp_travel(self.smoothing.lateral.update(raw_lateral) + o.lateral);
        let front_back =
            clamp_travel(self.smoothing.front_back.update(raw_front_back) + o.front_back);
        let roll = clamp_travel(self.smoothing.roll.update(raw_roll) + o.roll);
        let pitch = clamp_travel(self.smoothing.pitch.update(raw_pitch) + o.pitch);
        let height = (self.smoothing.height.update(raw_height) + o.height)
            .clamp(HEIGHT_MIN_MM, HEIGHT_MAX_MM);

        GeneralCommand {
            angle_x: yaw,
            angle_y: lateral,
            angle_z: front_back,
            height_mm: height,
            speed: self.config.speed_multiplier.clamp(0.0, MULTIPLIER_MAX),
            accel: self.config.accel_multiplier.clamp(0.0, MULTIPLIER_MAX),
            roll,
            pitch,
        }
    }
}

fn clamp_travel(v: f32) -> f32 {
    v.clamp(-TRAVEL_LIMIT, TRAVEL_LIMIT)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
