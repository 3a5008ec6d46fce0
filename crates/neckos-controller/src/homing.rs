//! Open-loop homing: overtravel against the hard stop, settle, zero.
//!
//! There are no encoders or limit switches on the rig, so homing drives the
//! mechanism past its lowest position at bypassed clamp, waits a fixed
//! settle delay for the hard stop to be reached, and then declares wherever
//! the mechanism physically is to be step zero.  If the hard stop is *not*
//! reached within the commanded overtravel the resulting zero is silently
//! wrong – that risk is inherent to the open-loop design and deliberately
//! not handled.
//!
//! The sequencer is advanced by [`tick`][HomingSequencer::tick] instead of
//! blocking the control loop in a sleep; commands arriving during homing
//! are dropped, not queued, and [`busy`][HomingSequencer::busy] is the gate
//! the control loop checks.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use neckos_hal::StepperBank;
use neckos_types::{GeneralCommand, HomingMode};

use crate::mixer;
use crate::state::ControllerState;

/// One overtravel stage: a general command to issue and the settle delay to
/// wait before trusting that the mechanism stopped moving.
#[derive(Debug, Clone, Copy)]
struct HomingStep {
    command: GeneralCommand,
    settle: Duration,
}

fn overtravel(height_mm: f32, speed: f32, accel: f32, settle_ms: u64) -> HomingStep {
    HomingStep {
        command: GeneralCommand {
            height_mm,
            speed,
            accel,
            ..GeneralCommand::default()
        },
        settle: Duration::from_millis(settle_ms),
    }
}

fn steps_for(mode: HomingMode) -> Vec<HomingStep> {
    match mode {
        HomingMode::Brute => vec![
            overtravel(-55.0, 2.5, 2.5, 2300),
            overtravel(-80.0, 3.0, 3.0, 2600),
        ],
        HomingMode::Soft => vec![overtravel(-40.0, 2.0, 2.0, 2200)],
    }
}

/// Where the sequencer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingPhase {
    /// Not homing; commands flow normally.
    Idle,
    /// Stage `step` has been commanded; waiting for its settle deadline.
    Settling { step: usize, deadline: Instant },
}

/// Tick-driven homing state machine.
#[derive(Debug)]
pub struct HomingSequencer {
    phase: HomingPhase,
    steps: Vec<HomingStep>,
    saved_bypass: bool,
}

impl Default for HomingSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl HomingSequencer {
    /// An idle sequencer.
    pub fn new() -> Self {
        Self {
            phase: HomingPhase::Idle,
            steps: Vec::new(),
            saved_bypass: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Whether a sequence is executing.  While true, the controller drops
    /// every incoming command.
    pub fn busy(&self) -> bool {
        self.phase != HomingPhase::Idle
    }

    /// Begin a homing sequence: save and bypass the clamp, command the first
    /// overtravel stage and arm its settle deadline.  A start while already
    /// busy is ignored (the in-flight sequence wins).
    pub fn start(
        &mut self,
        mode: HomingMode,
        state: &mut ControllerState,
        bank: &mut StepperBank,
        now: Instant,
    ) {
        if self.busy() {
            debug!(?mode, "homing already in progress; start ignored");
            return;
        }
        info!(?mode, "homing started");
        self.saved_bypass = state.clamp_bypass;
        state.clamp_bypass = true;
        self.steps = steps_for(mode);
        self.issue(0, state, bank, now);
    }

    /// Advance the sequence.  Call from the control loop on every iteration;
    /// does nothing until the current settle deadline passes.
    pub fn tick(&mut self, state: &mut ControllerState, bank: &mut StepperBank, now: Instant) {
        let HomingPhase::Settling { step, deadline } = self.phase else {
            return;
        };
        if now < deadline {
            return;
        }

        let next = step + 1;
        if next < self.steps.len() {
            self.issue(next, state, bank, now);
        } else {
            // Logical zero is wherever the mechanism physically is after the
            // overtravel.
            bank.zero_all();
            state.clamp_bypass = self.saved_bypass;
            self.phase = HomingPhase::Idle;
            info!("homing complete; all position registers zeroed");
        }
    }

    fn issue(&mut self, step: usize, state: &ControllerState, bank: &mut StepperBank, now: Instant) {
        let stage = self.steps[step];
        let target = mixer::mix(&stage.command, &state.config, state.clamp_bypass);
        bank.move_all(&target.steps, target.speed_hz, target.accel);
        self.phase = HomingPhase::Settling {
            step,
            deadline: now + stage.settle,
        };
        debug!(
            step,
            height_mm = stage.command.height_mm,
            settle_ms = stage.settle.as_millis() as u64,
            "homing stage commanded"
        );
    }
}
