//! [`Controller`] – line intake, dispatch and health reporting.
//!
//! One cooperative loop owns this struct, feeds it every received line and
//! calls [`tick`][Controller::tick] each iteration so the homing sequencer
//! can advance.  Whatever happens while processing a sub-command – a
//! malformed quaternion, a bad stepper index, a driver fault – is logged and
//! contained; the controller is always ready for the next line.

use std::time::Instant;

use tracing::{debug, warn};

use neckos_attitude::Quaternion;
use neckos_hal::StepperBank;
use neckos_types::{Command, GeneralCommand, HealthReport, QuaternionCommand, parse_line};

use crate::homing::HomingSequencer;
use crate::mixer;
use crate::state::{ControllerConfig, ControllerState};

/// The consumer side of the wire protocol, from text line to stepper moves.
pub struct Controller {
    state: ControllerState,
    bank: StepperBank,
    homing: HomingSequencer,
    started: Instant,
}

impl Controller {
    /// Create a controller and immediately begin the boot homing sequence
    /// (always the brute variant, matching power-on behaviour).
    pub fn new(bank: StepperBank, config: ControllerConfig, now: Instant) -> Self {
        let mut controller = Self {
            state: ControllerState::new(config),
            bank,
            homing: HomingSequencer::new(),
            started: now,
        };
        controller.homing.start(
            neckos_types::HomingMode::Brute,
            &mut controller.state,
            &mut controller.bank,
            now,
        );
        controller
    }

    /// Advance time-driven machinery (the homing sequencer).
    pub fn tick(&mut self, now: Instant) {
        self.homing.tick(&mut self.state, &mut self.bank, now);
    }

    /// Whether homing is currently executing (and lines are being dropped).
    pub fn homing_busy(&self) -> bool {
        self.homing.busy()
    }

    /// Current registers.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// The stepper bank (handy for inspecting positions in tests and
    /// monitoring).
    pub fn bank(&self) -> &StepperBank {
        &self.bank
    }

    /// Process one received wire line.  Returns any response lines (health
    /// reports) to hand back to the transport.
    ///
    /// A line arriving while homing executes is dropped wholesale – homing
    /// owns the rig while it runs, and nothing is queued behind it.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Vec<String> {
        if self.homing.busy() {
            debug!(line, "homing in progress; line dropped");
            return Vec::new();
        }

        let mut responses = Vec::new();
        for parsed in parse_line(line) {
            match parsed {
                Ok(command) => {
                    if let Some(response) = self.dispatch(command, now) {
                        responses.push(response);
                    }
                }
                Err(e) => {
                    // Taxonomy (a): drop the sub-command, log, no motion.
                    warn!(error = %e, "sub-command dropped");
                }
            }
            // A HOME earlier in this line starts the sequence immediately;
            // anything after it in the same line arrives "during homing"
            // and is dropped.
            if self.homing.busy() {
                break;
            }
        }
        responses
    }

    fn dispatch(&mut self, command: Command, now: Instant) -> Option<String> {
        match command {
            Command::Home(mode) => {
                self.homing
                    .start(mode, &mut self.state, &mut self.bank, now);
                None
            }
            Command::Health => Some(self.health(now).to_string()),
            Command::Quaternion(q) => {
                self.apply_quaternion(&q);
                None
            }
            Command::Direct(pairs) => {
                self.apply_direct(&pairs);
                None
            }
            Command::General(g) => {
                self.apply_general(&g);
                None
            }
        }
    }

    /// Normalize, decode to Y-up yaw/pitch/roll and feed the mixer with
    /// `angle_x=yaw, angle_y=pitch, angle_z=roll` (the dedicated pitch/roll
    /// channels stay at zero for attitude commands).
    fn apply_quaternion(&mut self, q: &QuaternionCommand) {
        let Some(unit) = Quaternion::new(q.w, q.x, q.y, q.z).normalize() else {
            // The parser already rejects degenerate norms; this guards the
            // API path where a QuaternionCommand is constructed directly.
            warn!("degenerate quaternion command dropped");
            return;
        };
        let euler = unit.to_euler_xyz();
        let general = GeneralCommand {
            angle_x: euler.yaw.to_degrees(),
            angle_y: euler.pitch.to_degrees(),
            angle_z: euler.roll.to_degrees(),
            height_mm: q.height_mm,
            speed: q.speed,
            accel: q.accel,
            roll: 0.0,
            pitch: 0.0,
        };
        self.apply_general(&general);
    }

    /// Per-stepper millimetre targets at the currently configured
    /// speed/accel.  An out-of-range index is logged and skipped; the
    /// remaining pairs still apply.
    fn apply_direct(&mut self, pairs: &[(i32, f32)]) {
        for &(index, mm) in pairs {
            let steps = self.state.config.mm_to_steps(mm);
            match self.bank.get_mut(index) {
                Some(stepper) => {
                    if let Err(e) = stepper.move_to(steps) {
                        warn!(index, error = %e, "direct move rejected by driver");
                    }
                }
                None => warn!(index, "stepper index out of range; token skipped"),
            }
        }
    }

    fn apply_general(&mut self, cmd: &GeneralCommand) {
        let target = mixer::mix(cmd, &self.state.config, self.state.clamp_bypass);
        self.bank
            .move_all(&target.steps, target.speed_hz, target.accel);
    }

    fn health(&self, now: Instant) -> HealthReport {
        HealthReport {
            uptime_ms: now.duration_since(self.started).as_millis() as u64,
            speed_hz: self.state.config.base_speed_hz as u32,
            accel: self.state.config.base_accel as u32,
            bypass_clamp: self.state.clamp_bypass,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
