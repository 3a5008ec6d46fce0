//! `neckos-types` – shared wire contract of the NeckOS stack.
//!
//! Both halves of the system meet here: the teleop producer renders
//! [`Command`][command::Command] values into ASCII lines, and the motion
//! controller parses incoming lines back into the same enum.  Keeping the
//! grammar in one crate guarantees the two sides can never drift apart.
//!
//! # Modules
//!
//! - [`command`] – the five-form motion command grammar
//!   ([`Command`][command::Command]), its parser and its wire rendering.
//! - [`health`] – the single-line [`HealthReport`][health::HealthReport]
//!   emitted in response to `HEALTH` / `STATUS`.

use thiserror::Error;

pub mod command;
pub mod health;

pub use command::{Command, GeneralCommand, HomingMode, QuaternionCommand, parse_line};
pub use health::HealthReport;

/// Number of leadscrew actuators on the rig.
pub const MOTOR_COUNT: usize = 6;

/// Wire protocol version reported in health lines.
pub const PROTOCOL_VERSION: u32 = 1;

/// Global error type spanning command parsing and controller dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NeckError {
    /// Quaternion command with too few components or a near-zero norm.
    #[error("malformed quaternion command: {0}")]
    MalformedQuaternion(String),

    /// Direct command addressed a stepper outside `1..=6`.
    #[error("stepper index {0} out of range 1..=6")]
    InvalidStepperIndex(i32),

    /// Driver-level fault while applying a motion target.
    #[error("stepper fault on {id}: {details}")]
    StepperFault { id: String, details: String },

    /// Configuration could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}
