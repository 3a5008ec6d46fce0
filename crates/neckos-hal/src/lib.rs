//! `neckos-hal` – stepper driver seam between the motion controller and the
//! physical leadscrew actuators.
//!
//! The controller only ever talks to the [`StepperDriver`][stepper::StepperDriver]
//! trait, so the real motor-control engine (an external collaborator that
//! generates step pulses) can be swapped for the in-process simulation
//! without touching any mixing or homing logic.
//!
//! # Modules
//!
//! - [`stepper`] – the [`StepperDriver`][stepper::StepperDriver] trait:
//!   non-blocking, last-write-wins absolute moves plus the position register
//!   used by homing.
//! - [`sim`] – [`SimStepper`][sim::SimStepper]: records commands and
//!   completes every move instantly, for headless tests and CI.
//! - [`bank`] – [`StepperBank`][bank::StepperBank]: the fixed six-actuator
//!   bank, indexed `1..=6` like the wire protocol.

pub mod bank;
pub mod sim;
pub mod stepper;

pub use bank::StepperBank;
pub use sim::SimStepper;
pub use stepper::StepperDriver;
