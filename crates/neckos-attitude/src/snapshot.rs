//! Device sensors → normalized orientation snapshots.
//!
//! Two input paths produce the same [`OrientationSnapshot`]:
//!
//! - **Local device angles** `(alpha, beta, gamma)` in degrees plus the
//!   current screen-rotation offset, composed into a unit attitude
//!   quaternion via the standard mobile-device YXZ convention.
//! - **Peer relay**: a pre-built quaternion + heading + acceleration tuple
//!   forwarded from another phone or a hub; only normalized and re-projected
//!   here.
//!
//! With [`ProjectionMode::Globe`] and a GPS fix, the attitude is re-expressed
//! in the local geodesic tangent frame so that "forward" means the same
//! thing regardless of where on the planet the operator stands.

use tracing::warn;

use crate::quaternion::{Quaternion, Vec3};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A normalized attitude sample ready for baseline differencing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSnapshot {
    /// Display quaternion: unit attitude, tangent-frame re-projected when
    /// Globe projection is active.
    pub quaternion: Quaternion,
    /// Compass heading in degrees `[0, 360)`, when one is available.
    pub heading: Option<f32>,
    /// Device linear acceleration (gravity removed), device axes.
    pub linear_accel: Vec3,
}

/// How the raw attitude is re-expressed before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Use the device attitude as-is.
    #[default]
    Flat,
    /// Re-project into the geodesic tangent frame of the current GPS fix.
    Globe,
}

/// A GPS fix in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub lat_deg: f32,
    pub lon_deg: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Free transforms
// ────────────────────────────────────────────────────────────────────────────

/// Attitude quaternion from device Euler angles (degrees) and the current
/// screen rotation (degrees).
///
/// Composition order is fixed: beta about device X, alpha about device Y,
/// −gamma about device Z (YXZ), then a −90°-about-Z world correction, then a
/// −screen-rotation compensation about Z.
pub fn device_attitude(alpha_deg: f32, beta_deg: f32, gamma_deg: f32, screen_deg: f32) -> Quaternion {
    let qx = Quaternion::from_axis_angle(Vec3::X, beta_deg.to_radians());
    let qy = Quaternion::from_axis_angle(Vec3::Y, alpha_deg.to_radians());
    let qz = Quaternion::from_axis_angle(Vec3::Z, -gamma_deg.to_radians());
    let world = Quaternion::from_axis_angle(Vec3::Z, -std::f32::consts::FRAC_PI_2);
    let screen = Quaternion::from_axis_angle(Vec3::Z, -screen_deg.to_radians());
    qy.mul(qx).mul(qz).mul(world).mul(screen)
}

/// Tilt-compensated compass heading in degrees `[0, 360)` derived from the
/// same three device Euler angles, for devices without a hardware compass
/// event.
pub fn tilt_compensated_heading(alpha_deg: f32, beta_deg: f32, gamma_deg: f32) -> f32 {
    let (sz, cz) = alpha_deg.to_radians().sin_cos();
    let sx = beta_deg.to_radians().sin();
    let (sy, cy) = gamma_deg.to_radians().sin_cos();

    // Horizontal components of the device's -Z axis in world coordinates.
    let vx = -cz * sy - sz * sx * cy;
    let vy = -sz * sy + cz * sx * cy;

    vx.atan2(vy).to_degrees().rem_euclid(360.0)
}

/// Frame quaternion of the geodesic tangent plane at `(lat, lon)`.
///
/// The "up" unit vector comes from the standard lat/lon → unit-sphere
/// mapping (Y-up world); `east = normalize(northPole × up)` with a fixed
/// `+X` fallback near the poles, and `north = up × east`.  The right-handed
/// basis `(east, north, up)` is converted to a quaternion and left-multiplied
/// onto the raw attitude by the caller.
pub fn tangent_frame(lat_deg: f32, lon_deg: f32) -> Quaternion {
    let (slat, clat) = lat_deg.to_radians().sin_cos();
    let (slon, clon) = lon_deg.to_radians().sin_cos();

    let up = Vec3::new(clat * slon, slat, clat * clon);
    let north_pole = Vec3::Y;
    let east = north_pole
        .cross(up)
        .normalized()
        .unwrap_or(Vec3::X);
    let north = up.cross(east);

    Quaternion::from_basis(east, north, up)
}

// ────────────────────────────────────────────────────────────────────────────
// SnapshotBuilder
// ────────────────────────────────────────────────────────────────────────────

/// Stateless-per-sample builder holding the projection settings shared by
/// every sample of a teleop session.
///
/// Both input paths return `None` (no snapshot, no command downstream) when
/// the attitude quaternion is degenerate – it is rejected, never silently
/// zeroed.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    mode: ProjectionMode,
    screen_rotation_deg: f32,
    geo: Option<GeoFix>,
}

impl SnapshotBuilder {
    /// Create a builder with [`ProjectionMode::Flat`], no screen rotation
    /// and no GPS fix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current projection mode.
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Switch projection mode.  Re-baselining on a change is the session's
    /// responsibility.
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    /// Update the screen rotation compensation (degrees).
    pub fn set_screen_rotation(&mut self, deg: f32) {
        self.screen_rotation_deg = deg;
    }

    /// Update the GPS fix used by Globe projection.
    pub fn set_geo_fix(&mut self, fix: GeoFix) {
        self.geo = Some(fix);
    }

    /// Build a snapshot from local device angles.
    ///
    /// Heading prefers the hardware `compass` reading when present and falls
    /// back to the tilt-compensated derivation from the same angles.
    pub fn from_device_angles(
        &self,
        alpha_deg: f32,
        beta_deg: f32,
        gamma_deg: f32,
        compass: Option<f32>,
        linear_accel: Vec3,
    ) -> Option<OrientationSnapshot> {
        let raw = device_attitude(alpha_deg, beta_deg, gamma_deg, self.screen_rotation_deg);
        let quaternion = self.project(raw)?;
        let heading =
            Some(compass.unwrap_or_else(|| tilt_compensated_heading(alpha_deg, beta_deg, gamma_deg)));
        Some(OrientationSnapshot {
            quaternion,
            heading,
            linear_accel,
        })
    }

    /// Build a snapshot from a relayed peer pose.
    pub fn from_peer(
        &self,
        quaternion: Quaternion,
        heading: Option<f32>,
        linear_accel: Vec3,
    ) -> Option<OrientationSnapshot> {
        let quaternion = self.project(quaternion)?;
        Some(OrientationSnapshot {
            quaternion,
            heading,
            linear_accel,
        })
    }

    /// Normalize and, in Globe mode with a fix, re-express in the tangent
    /// frame.  `None` when the quaternion is degenerate.
    fn project(&self, raw: Quaternion) -> Option<Quaternion> {
        let Some(unit) = raw.normalize() else {
            warn!(norm_sq = raw.norm_sq(), "degenerate attitude quaternion rejected");
            return None;
        };
        match (self.mode, self.geo) {
            (ProjectionMode::Globe, Some(fix)) => {
                Some(tangent_frame(fix.lat_deg, fix.lon_deg).mul(unit))
            }
            _ => Some(unit),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "expected {b}, got {a}");
    }

    #[test]
    fn device_attitude_is_unit() {
        let q = device_attitude(33.0, -20.0, 71.0, 90.0);
        assert_close(q.norm_sq(), 1.0);
    }

    #[test]
    fn zero_angles_reduce_to_world_correction() {
        // With all angles zero only the fixed −90°-about-Z correction remains.
        let q = device_attitude(0.0, 0.0, 0.0, 0.0);
        let expected =
            Quaternion::from_axis_angle(Vec3::Z, -std::f32::consts::FRAC_PI_2);
        assert_close(q.w, expected.w);
        assert_close(q.z, expected.z);
    }

    #[test]
    fn screen_rotation_twists_about_z() {
        let q0 = device_attitude(10.0, 20.0, 30.0, 0.0);
        let q90 = device_attitude(10.0, 20.0, 30.0, 90.0);
        // q90 == q0 * qz(-90°)
        let expected =
            q0.mul(Quaternion::from_axis_angle(Vec3::Z, -std::f32::consts::FRAC_PI_2));
        assert_close(q90.w, expected.w);
        assert_close(q90.x, expected.x);
        assert_close(q90.y, expected.y);
        assert_close(q90.z, expected.z);
    }

    #[test]
    fn heading_is_wrapped_to_positive_degrees() {
        let h = tilt_compensated_heading(123.0, 45.0, -10.0);
        assert!((0.0..360.0).contains(&h), "heading {h} out of range");
    }

    #[test]
    fn heading_flat_device_tracks_alpha() {
        // With the device held upright (beta=90), turning alpha by +90°
        // moves the compass heading by -90° (mod 360).
        let h0 = tilt_compensated_heading(0.0, 90.0, 0.0);
        let h1 = tilt_compensated_heading(90.0, 90.0, 0.0);
        let delta = (h1 - h0).rem_euclid(360.0);
        assert_close(delta, 270.0);
    }

    #[test]
    fn tangent_frame_at_origin_is_identity() {
        // lat=0, lon=0 → up = +Z, east = +X, north = +Y: identity frame.
        let q = tangent_frame(0.0, 0.0);
        assert_close(q.w.abs(), 1.0);
    }

    #[test]
    fn tangent_frame_at_pole_uses_fallback_east() {
        // At the pole northPole × up degenerates; the fixed +X fallback
        // keeps the frame orthonormal (and the quaternion unit).
        let q = tangent_frame(90.0, 0.0);
        assert_close(q.norm_sq(), 1.0);
    }

    #[test]
    fn builder_rejects_degenerate_peer_quaternion() {
        let builder = SnapshotBuilder::new();
        let snap = builder.from_peer(Quaternion::new(0.0, 0.0, 0.0, 0.0), None, Vec3::zero());
        assert!(snap.is_none());
    }

    #[test]
    fn builder_normalizes_peer_quaternion() {
        let builder = SnapshotBuilder::new();
        let snap = builder
            .from_peer(Quaternion::new(2.0, 0.0, 0.0, 0.0), Some(10.0), Vec3::zero())
            .unwrap();
        assert_close(snap.quaternion.norm_sq(), 1.0);
        assert_eq!(snap.heading, Some(10.0));
    }

    #[test]
    fn builder_prefers_hardware_compass() {
        let builder = SnapshotBuilder::new();
        let snap = builder
            .from_device_angles(10.0, 20.0, 30.0, Some(123.0), Vec3::zero())
            .unwrap();
        assert_eq!(snap.heading, Some(123.0));
    }

    #[test]
    fn builder_falls_back_to_derived_heading() {
        let builder = SnapshotBuilder::new();
        let snap = builder
            .from_device_angles(10.0, 20.0, 30.0, None, Vec3::zero())
            .unwrap();
        let expected = tilt_compensated_heading(10.0, 20.0, 30.0);
        assert_eq!(snap.heading, Some(expected));
    }

    #[test]
    fn globe_mode_without_fix_leaves_attitude_unprojected() {
        let mut builder = SnapshotBuilder::new();
        builder.set_mode(ProjectionMode::Globe);
        let q = Quaternion::from_axis_angle(Vec3::Y, 0.5);
        let snap = builder.from_peer(q, None, Vec3::zero()).unwrap();
        assert_close(snap.quaternion.w, q.w);
        assert_close(snap.quaternion.y, q.y);
    }

    #[test]
    fn globe_mode_with_fix_left_multiplies_frame() {
        let mut builder = SnapshotBuilder::new();
        builder.set_mode(ProjectionMode::Globe);
        builder.set_geo_fix(GeoFix { lat_deg: 48.85, lon_deg: 2.35 });
        let raw = Quaternion::from_axis_angle(Vec3::X, 0.3);
        let snap = builder.from_peer(raw, None, Vec3::zero()).unwrap();
        let expected = tangent_frame(48.85, 2.35).mul(raw);
        assert_close(snap.quaternion.w, expected.w);
        assert_close(snap.quaternion.x, expected.x);
        assert_close(snap.quaternion.y, expected.y);
        assert_close(snap.quaternion.z, expected.z);
    }
}
