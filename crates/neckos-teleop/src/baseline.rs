//! [`BaselineEngine`] – zero-reference capture and delta computation.
//!
//! Every command the producer emits is relative to a **baseline**: the
//! snapshot the operator declared (or the session inferred) to be "straight
//! ahead".  The baseline is captured wholesale, replaced wholesale and never
//! merged.  Without one, no command may be synthesized at all.

use neckos_attitude::{OrientationSnapshot, Quaternion};

/// Baseline-relative rotation, in degrees, decomposed in the fixed YXZ
/// order (yaw about world-up first, then pitch, then roll).  The channel
/// gains are tuned against exactly this order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationDelta {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    /// Compass heading delta wrapped into `(-180, 180]`, or `0` when either
    /// side has no heading.
    pub heading_deg: f32,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    quaternion: Quaternion,
    heading: Option<f32>,
}

/// Captures a reference snapshot and differences later snapshots against it.
///
/// After [`invalidate`][Self::invalidate] the engine is *pending*: the next
/// valid snapshot it processes automatically becomes the new baseline, so an
/// explicit [`capture`][Self::capture] call is only ever needed for the
/// first reference.
#[derive(Debug, Default)]
pub struct BaselineEngine {
    baseline: Option<Baseline>,
    pending: bool,
}

impl BaselineEngine {
    /// Create an engine with no baseline and no pending capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a baseline is currently set.
    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    /// Whether the next processed snapshot will become the baseline.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Store `snapshot` as the new zero reference and clear the pending
    /// flag.  The caller is responsible for resetting its smoothing state in
    /// the same breath (the session does both atomically with respect to
    /// the next sample).
    pub fn capture(&mut self, snapshot: &OrientationSnapshot) {
        self.baseline = Some(Baseline {
            quaternion: snapshot.quaternion,
            heading: snapshot.heading,
        });
        self.pending = false;
    }

    /// Drop the baseline and arm the pending auto-capture.
    pub fn invalidate(&mut self) {
        self.baseline = None;
        self.pending = true;
    }

    /// Difference `snapshot` against the baseline, auto-capturing first when
    /// a re-baseline is pending.  Returns `None` when no baseline exists and
    /// none is pending – command synthesis is suppressed, not an error.
    pub fn process(&mut self, snapshot: &OrientationSnapshot) -> Option<OrientationDelta> {
        if self.pending {
            self.capture(snapshot);
        }
        let baseline = self.baseline.as_ref()?;

        let delta_q = baseline.quaternion.conjugate().mul(snapshot.quaternion);
        let euler = delta_q.to_euler_yxz();

        let heading_deg = match (snapshot.heading, baseline.heading) {
            (Some(now), Some(base)) => wrap_deg(now - base),
            _ => 0.0,
        };

        Some(OrientationDelta {
            yaw_deg: euler.yaw.to_degrees(),
            pitch_deg: euler.pitch.to_degrees(),
            roll_deg: euler.roll.to_degrees(),
            heading_deg,
        })
    }
}

/// Wrap an angle difference into `(-180, 180]` degrees.
pub fn wrap_deg(delta: f32) -> f32 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}
