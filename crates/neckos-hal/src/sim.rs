//! In-process simulated stepper for headless tests and CI.

use neckos_types::NeckError;

use crate::stepper::StepperDriver;

/// A simulated stepper that records every command and completes moves
/// instantly (the position register jumps straight to the target).  Always
/// succeeds.
#[derive(Debug)]
pub struct SimStepper {
    id: String,
    position: i64,
    target: i64,
    speed_hz: f32,
    accel: f32,
}

impl SimStepper {
    /// Create a simulated stepper with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: 0,
            target: 0,
            speed_hz: 0.0,
            accel: 0.0,
        }
    }

    /// Last commanded absolute target in steps.
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Last configured acceleration in steps/s².
    pub fn accel(&self) -> f32 {
        self.accel
    }
}

impl StepperDriver for SimStepper {
    fn id(&self) -> &str {
        &self.id
    }

    fn move_to(&mut self, target_steps: i64) -> Result<(), NeckError> {
        self.target = target_steps;
        // Instant completion: the sim has no trajectory generator.
        self.position = target_steps;
        Ok(())
    }

    fn set_speed_hz(&mut self, hz: f32) {
        self.speed_hz = hz;
    }

    fn speed_hz(&self) -> f32 {
        self.speed_hz
    }

    fn set_acceleration(&mut self, steps_per_s2: f32) {
        self.accel = steps_per_s2;
    }

    fn acceleration(&self) -> f32 {
        self.accel
    }

    fn set_current_position(&mut self, steps: i64) {
        self.position = steps;
    }

    fn current_position(&self) -> i64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_stepper_records_moves_and_settings() {
        let mut s = SimStepper::new("stepper_1");
        s.set_speed_hz(48_000.0);
        s.set_acceleration(36_000.0);
        s.move_to(-2000).unwrap();

        assert_eq!(s.id(), "stepper_1");
        assert_eq!(s.target(), -2000);
        assert_eq!(s.current_position(), -2000);
        assert!((s.speed_hz() - 48_000.0).abs() < f32::EPSILON);
        assert!((s.accel() - 36_000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zeroing_keeps_the_last_target() {
        let mut s = SimStepper::new("stepper_2");
        s.move_to(500).unwrap();
        s.set_current_position(0);
        assert_eq!(s.current_position(), 0);
        assert_eq!(s.target(), 500);
    }

    #[test]
    fn later_move_overwrites_earlier_target() {
        // Last-write-wins: there is no queue.
        let mut s = SimStepper::new("stepper_3");
        s.move_to(100).unwrap();
        s.move_to(-300).unwrap();
        assert_eq!(s.target(), -300);
        assert_eq!(s.current_position(), -300);
    }
}
