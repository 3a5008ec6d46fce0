//! `neckos-controller` – the consumer half of the motion pipeline.
//!
//! Parses incoming wire lines, mixes movement commands into six per-actuator
//! step targets through the fixed linear kinematic approximation, clamps
//! them for mechanical safety, and sequences the open-loop homing routine.
//! No error ever propagates past a single sub-command: the control loop is
//! always ready for the next line.
//!
//! # Modules
//!
//! - [`state`] – [`ControllerConfig`][state::ControllerConfig] and
//!   [`ControllerState`][state::ControllerState]: the explicit register file
//!   (base speed/accel, clamp bypass, calibration constants).
//! - [`mixer`] – [`mix`][mixer::mix]: the fixed six-actuator sign matrix and
//!   the mechanical travel clamp.
//! - [`homing`] – [`HomingSequencer`][homing::HomingSequencer]: tick-driven
//!   overtravel → settle → zero sequencing with a `busy` gate.
//! - [`controller`] – [`Controller`][controller::Controller]: line intake,
//!   dispatch and health reporting.

pub mod controller;
pub mod homing;
pub mod mixer;
pub mod state;

pub use controller::Controller;
pub use homing::{HomingPhase, HomingSequencer};
pub use mixer::{ActuatorTarget, mix};
pub use state::{ControllerConfig, ControllerState};
