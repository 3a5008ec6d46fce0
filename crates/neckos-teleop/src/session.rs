//! [`TeleopSession`] – the producer pipeline behind the sensor callbacks.
//!
//! One session owns the snapshot builder settings, the baseline engine, the
//! synthesizer and the pacer, and runs them synchronously inside whatever
//! sensor callback delivers a sample.  Baseline invalidation and smoothing
//! reset always happen together in one call, so no sample ever observes a
//! half-reset pipeline.

use std::time::Instant;

use tracing::{debug, info};

use neckos_attitude::{GeoFix, OrientationSnapshot, ProjectionMode, SnapshotBuilder, Quaternion, Vec3};

use crate::baseline::BaselineEngine;
use crate::pacer::CommandPacer;
use crate::synthesizer::{CommandSynthesizer, SynthesizerConfig};

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// Where the session currently takes its pose from.  Samples from any other
/// source are ignored until the session is switched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseSource {
    /// This device's own orientation sensors.
    LocalDevice,
    /// A relayed peer, identified by its relay id.
    Peer(String),
}

/// One local sensor callback payload.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSample {
    /// Device Euler angles in degrees.
    pub alpha_deg: f32,
    pub beta_deg: f32,
    pub gamma_deg: f32,
    /// Hardware compass heading when the platform provides one.
    pub compass_deg: Option<f32>,
    /// Linear acceleration, device axes.
    pub linear_accel: Vec3,
}

/// One relayed pose payload.
#[derive(Debug, Clone)]
pub struct PeerSample {
    pub peer_id: String,
    pub quaternion: Quaternion,
    pub heading_deg: Option<f32>,
    pub linear_accel: Vec3,
}

// ────────────────────────────────────────────────────────────────────────────
// TeleopSession
// ────────────────────────────────────────────────────────────────────────────

/// Producer-side façade: samples in, paced wire commands out.
///
/// # Example
///
/// ```
/// use std::time::Instant;
/// use neckos_attitude::Vec3;
/// use neckos_teleop::{DeviceSample, TeleopSession};
/// use neckos_teleop::synthesizer::SynthesizerConfig;
///
/// let mut session = TeleopSession::new(SynthesizerConfig::default());
/// let sample = DeviceSample {
///     alpha_deg: 0.0,
///     beta_deg: 0.0,
///     gamma_deg: 0.0,
///     compass_deg: None,
///     linear_accel: Vec3::zero(),
/// };
/// // The first valid sample becomes the baseline and emits the centred
/// // command.
/// let cmd = session.on_device_sample(&sample, Instant::now()).unwrap();
/// assert!(cmd.starts_with("X0,"));
/// ```
#[derive(Debug)]
pub struct TeleopSession {
    builder: SnapshotBuilder,
    baseline: BaselineEngine,
    synthesizer: CommandSynthesizer,
    pacer: CommandPacer,
    source: PoseSource,
    playback: bool,
}

impl TeleopSession {
    /// Create a session driven by the local device sensors.
    ///
    /// Activating the initial source counts as a source change, so the
    /// baseline auto-captures from the first valid sample.
    pub fn new(config: SynthesizerConfig) -> Self {
        let mut baseline = BaselineEngine::new();
        baseline.invalidate();
        Self {
            builder: SnapshotBuilder::new(),
            pacer: CommandPacer::from_millis(config.command_interval_ms),
            synthesizer: CommandSynthesizer::new(config),
            baseline,
            source: PoseSource::LocalDevice,
            playback: false,
        }
    }

    /// Current pose source.
    pub fn source(&self) -> &PoseSource {
        &self.source
    }

    // ── Sample paths ────────────────────────────────────────────────────────

    /// Process a local sensor sample.  Returns the wire command to dispatch,
    /// or `None` (inactive source, degenerate attitude, no baseline, or
    /// suppressed by the pacer).
    pub fn on_device_sample(&mut self, sample: &DeviceSample, now: Instant) -> Option<String> {
        if self.source != PoseSource::LocalDevice {
            return None;
        }
        let snapshot = self.builder.from_device_angles(
            sample.alpha_deg,
            sample.beta_deg,
            sample.gamma_deg,
            sample.compass_deg,
            sample.linear_accel,
        )?;
        self.process(&snapshot, now)
    }

    /// Process a relayed peer sample.  Only samples from the active peer are
    /// used.
    pub fn on_peer_sample(&mut self, sample: &PeerSample, now: Instant) -> Option<String> {
        match &self.source {
            PoseSource::Peer(id) if *id == sample.peer_id => {}
            _ => return None,
        }
        let snapshot =
            self.builder
                .from_peer(sample.quaternion, sample.heading_deg, sample.linear_accel)?;
        self.process(&snapshot, now)
    }

    fn process(&mut self, snapshot: &OrientationSnapshot, now: Instant) -> Option<String> {
        let delta = self.baseline.process(snapshot)?;
        let command = self
            .synthesizer
            .synthesize(&delta, snapshot.linear_accel)
            .to_string();
        let dispatched = self.pacer.try_dispatch(command, now);
        if let Some(cmd) = &dispatched {
            debug!(command = %cmd, "dispatching");
        }
        dispatched
    }

    // ── Projection / environment updates ────────────────────────────────────

    /// Switch projection mode; a change re-baselines.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        if self.builder.mode() != mode {
            self.builder.set_mode(mode);
            self.rebaseline("projection mode change");
        }
    }

    /// Update the screen-rotation compensation (degrees).  Not a re-baseline
    /// trigger: the attitude composition absorbs it.
    pub fn set_screen_rotation(&mut self, deg: f32) {
        self.builder.set_screen_rotation(deg);
    }

    /// Update the GPS fix used by Globe projection.
    pub fn on_location(&mut self, lat_deg: f32, lon_deg: f32) {
        self.builder.set_geo_fix(GeoFix { lat_deg, lon_deg });
    }

    // ── Re-baseline triggers ────────────────────────────────────────────────

    /// Switch the active pose source; a change re-baselines.
    pub fn set_source(&mut self, source: PoseSource) {
        if self.source != source {
            self.source = source;
            self.rebaseline("source change");
        }
    }

    /// Explicit operator recenter: the next sample becomes the baseline.
    pub fn recenter(&mut self) {
        self.rebaseline("recenter");
    }

    /// Restore default tuning and re-baseline.
    pub fn reset_tuning(&mut self) {
        self.synthesizer.reset_tuning();
        self.rebaseline("tuning reset");
    }

    /// Toggle playback; turning it on re-baselines so the replayed stream
    /// starts from a fresh reference.
    pub fn set_playback(&mut self, on: bool) {
        if on && !self.playback {
            self.rebaseline("playback resumed");
        }
        self.playback = on;
    }

    /// Access the synthesizer for tuning adjustments.
    pub fn synthesizer_mut(&mut self) -> &mut CommandSynthesizer {
        &mut self.synthesizer
    }

    /// Baseline invalidation and smoothing reset happen together, atomically
    /// with respect to the next processed sample.
    fn rebaseline(&mut self, reason: &str) {
        info!(reason, "re-baseline armed");
        self.baseline.invalidate();
        self.synthesizer.reset_smoothing();
    }
}

/// Report a sensor-permission outcome as a status string (never a panic).
pub fn sensor_permission_status(error: Option<&str>) -> String {
    match error {
        None => "SENSORS_OK".to_string(),
        Some(reason) => format!("SENSOR_PERMISSION_DENIED: {reason}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
