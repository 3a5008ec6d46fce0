//! [`StepperBank`] – the fixed six-actuator bank.
//!
//! Wire commands address steppers `1..=6`, so the bank keeps that indexing
//! on its public surface and hides the zero-based storage.

use tracing::warn;

use neckos_types::{MOTOR_COUNT, NeckError};

use crate::sim::SimStepper;
use crate::stepper::StepperDriver;

/// Owns the six stepper drivers of the rig.
///
/// # Example
///
/// ```
/// use neckos_hal::StepperBank;
///
/// let mut bank = StepperBank::sim();
/// bank.move_all(&[100, 200, 300, 400, 500, 600], 48_000.0, 36_000.0);
/// assert_eq!(bank.positions()[2], 300);
/// ```
pub struct StepperBank {
    steppers: Vec<Box<dyn StepperDriver>>,
}

impl StepperBank {
    /// Build a bank from exactly [`MOTOR_COUNT`] drivers, in actuator order
    /// 1 to 6.
    ///
    /// # Errors
    ///
    /// Returns [`NeckError::Config`] when the driver count is wrong.
    pub fn new(steppers: Vec<Box<dyn StepperDriver>>) -> Result<Self, NeckError> {
        if steppers.len() != MOTOR_COUNT {
            return Err(NeckError::Config(format!(
                "expected {MOTOR_COUNT} stepper drivers, got {}",
                steppers.len()
            )));
        }
        Ok(Self { steppers })
    }

    /// A bank of six [`SimStepper`]s named `stepper_1` to `stepper_6`.
    pub fn sim() -> Self {
        Self {
            steppers: (1..=MOTOR_COUNT)
                .map(|i| Box::new(SimStepper::new(format!("stepper_{i}"))) as Box<dyn StepperDriver>)
                .collect(),
        }
    }

    /// Borrow one driver by its 1-based wire index, or `None` when the index
    /// is out of range.
    pub fn get_mut(&mut self, index: i32) -> Option<&mut dyn StepperDriver> {
        if !(1..=MOTOR_COUNT as i32).contains(&index) {
            return None;
        }
        Some(self.steppers[(index - 1) as usize].as_mut())
    }

    /// Configure speed/accel on every driver and command the six absolute
    /// targets.  Driver faults are logged and do not stop the remaining
    /// actuators.
    pub fn move_all(&mut self, targets: &[i64; MOTOR_COUNT], speed_hz: f32, accel: f32) {
        for (stepper, &target) in self.steppers.iter_mut().zip(targets) {
            stepper.set_speed_hz(speed_hz);
            stepper.set_acceleration(accel);
            if let Err(e) = stepper.move_to(target) {
                warn!(stepper = stepper.id(), error = %e, "move rejected by driver");
            }
        }
    }

    /// Set every position register to 0 (homing's "logical zero is wherever
    /// the mechanism physically is").
    pub fn zero_all(&mut self) {
        for stepper in &mut self.steppers {
            stepper.set_current_position(0);
        }
    }

    /// Current position registers in actuator order.
    pub fn positions(&self) -> [i64; MOTOR_COUNT] {
        let mut out = [0i64; MOTOR_COUNT];
        for (slot, stepper) in out.iter_mut().zip(&self.steppers) {
            *slot = stepper.current_position();
        }
        out
    }

    /// Iterate the drivers in actuator order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn StepperDriver> {
        self.steppers.iter().map(|s| s.as_ref())
    }
}
