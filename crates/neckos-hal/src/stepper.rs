//! Generic `StepperDriver` trait for the six leadscrew actuators.
//!
//! Drivers implement this trait and are collected into a
//! [`StepperBank`][crate::bank::StepperBank].  The rest of the stack only
//! ever talks to the trait, so the pulse-generating engine can be swapped
//! without touching mixing or homing logic.

use neckos_types::NeckError;

/// A single position-controlled stepper on the rig.
///
/// Moves are **non-blocking and last-write-wins**: a new target overwrites
/// an in-flight trajectory with no queue, exactly like the underlying
/// motor-control engine.  There is no encoder or limit switch – the position
/// register is pure dead reckoning, which is why homing exists.
pub trait StepperDriver: Send {
    /// Stable identifier, e.g. `"stepper_3"`.
    fn id(&self) -> &str;

    /// Command a move to an absolute step target at the currently configured
    /// speed and acceleration.  Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`NeckError::StepperFault`] when the driver cannot accept the
    /// command (e.g. the output stage is faulted).
    fn move_to(&mut self, target_steps: i64) -> Result<(), NeckError>;

    /// Set the step rate in Hz used by subsequent moves.
    fn set_speed_hz(&mut self, hz: f32);

    /// Step rate currently configured.
    fn speed_hz(&self) -> f32;

    /// Set the acceleration in steps/s² used by subsequent moves.
    fn set_acceleration(&mut self, steps_per_s2: f32);

    /// Acceleration currently configured.
    fn acceleration(&self) -> f32;

    /// Overwrite the position register.  Used only by homing ("logical zero
    /// is wherever the mechanism physically is").
    fn set_current_position(&mut self, steps: i64);

    /// Most recently known absolute position in steps.
    fn current_position(&self) -> i64;
}
