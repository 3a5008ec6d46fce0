//! Quaternion and vector primitives (w, x, y, z convention, Y-up world).
//!
//! The producer decomposes baseline-relative rotations in **YXZ** order (yaw
//! about world-up Y first, then pitch about X, then roll about Z) – the
//! channel gains are tuned against exactly that order.  The controller's
//! quaternion command uses the **XYZ** extraction instead, where the `asin`
//! term is the yaw about world-up Y.  Both live here so the two conventions
//! stay side by side and documented.

/// Squared-norm threshold below which a quaternion is rejected as degenerate.
pub const NORM_EPSILON: f32 = 1e-8;

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit X axis.
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };
    /// Unit Y axis (world up).
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    /// Unit Z axis.
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    /// Cross product `self × rhs`.
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Squared Euclidean length.
    pub fn norm_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit-length copy, or `None` when the length is degenerate.
    pub fn normalized(self) -> Option<Self> {
        let n2 = self.norm_sq();
        if !(n2 > NORM_EPSILON) {
            return None;
        }
        let inv = n2.sqrt().recip();
        Some(Self::new(self.x * inv, self.y * inv, self.z * inv))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tait–Bryan angles
// ────────────────────────────────────────────────────────────────────────────

/// A Tait–Bryan decomposition in radians: yaw about world-up Y, pitch about
/// X, roll about Z.  Which factorization order produced it depends on the
/// method that returned it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaitBryan {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A rotation quaternion (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Create a quaternion from raw components.
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` around a unit `axis`.
    pub fn from_axis_angle(axis: Vec3, angle_rad: f32) -> Self {
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    /// Hamilton product: compose two rotations (`self` applied after `rhs`
    /// when rotating column vectors).
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Squared norm.
    pub fn norm_sq(self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit-length copy, or `None` when the squared norm is below
    /// [`NORM_EPSILON`].  A degenerate quaternion is rejected, never
    /// silently zeroed; NaN components also land here.
    pub fn normalize(self) -> Option<Self> {
        let n2 = self.norm_sq();
        if !(n2 > NORM_EPSILON) {
            return None;
        }
        let inv = n2.sqrt().recip();
        Some(Self::new(
            self.w * inv,
            self.x * inv,
            self.y * inv,
            self.z * inv,
        ))
    }

    /// Rotate a vector by this quaternion: `p' = q * p * q*`.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// Build the rotation whose columns are the orthonormal basis
    /// `(x_axis, y_axis, z_axis)`.
    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m11, m12, m13) = (x_axis.x, y_axis.x, z_axis.x);
        let (m21, m22, m23) = (x_axis.y, y_axis.y, z_axis.y);
        let (m31, m32, m33) = (x_axis.z, y_axis.z, z_axis.z);

        let trace = m11 + m22 + m33;
        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new(
                0.25 / s,
                (m32 - m23) * s,
                (m13 - m31) * s,
                (m21 - m12) * s,
            )
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            Self::new(
                (m32 - m23) / s,
                0.25 * s,
                (m12 + m21) / s,
                (m13 + m31) / s,
            )
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            Self::new(
                (m13 - m31) / s,
                (m12 + m21) / s,
                0.25 * s,
                (m23 + m32) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            Self::new(
                (m21 - m12) / s,
                (m13 + m31) / s,
                (m23 + m32) / s,
                0.25 * s,
            )
        }
    }

    /// Decompose in **YXZ** order: yaw about Y first, then pitch about X,
    /// then roll about Z.  This is the producer's delta convention.
    pub fn to_euler_yxz(self) -> TaitBryan {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        let m11 = 1.0 - 2.0 * (y * y + z * z);
        let m13 = 2.0 * (x * z + w * y);
        let m21 = 2.0 * (x * y + w * z);
        let m22 = 1.0 - 2.0 * (x * x + z * z);
        let m23 = 2.0 * (y * z - w * x);
        let m31 = 2.0 * (x * z - w * y);
        let m33 = 1.0 - 2.0 * (x * x + y * y);

        let pitch = (-m23.clamp(-1.0, 1.0)).asin();
        if m23.abs() < 0.999_999_5 {
            TaitBryan {
                yaw: m13.atan2(m33),
                pitch,
                roll: m21.atan2(m22),
            }
        } else {
            // Gimbal lock: pitch at ±90°, yaw absorbs the remaining twist.
            TaitBryan {
                yaw: (-m31).atan2(m11),
                pitch,
                roll: 0.0,
            }
        }
    }

    /// Decompose in **XYZ** order: the consumer's quaternion-command
    /// convention, where the `asin` term is the yaw about world-up Y.
    pub fn to_euler_xyz(self) -> TaitBryan {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        let m11 = 1.0 - 2.0 * (y * y + z * z);
        let m12 = 2.0 * (x * y - w * z);
        let m13 = 2.0 * (x * z + w * y);
        let m22 = 1.0 - 2.0 * (x * x + z * z);
        let m23 = 2.0 * (y * z - w * x);
        let m32 = 2.0 * (y * z + w * x);
        let m33 = 1.0 - 2.0 * (x * x + y * y);

        let yaw = m13.clamp(-1.0, 1.0).asin();
        if m13.abs() < 0.999_999_5 {
            TaitBryan {
                yaw,
                pitch: (-m23).atan2(m33),
                roll: (-m12).atan2(m11),
            }
        } else {
            TaitBryan {
                yaw,
                pitch: m32.atan2(m22),
                roll: 0.0,
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_1_SQRT_2};

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "expected {b}, got {a}");
    }

    // ── Basics ──────────────────────────────────────────────────────────────

    #[test]
    fn identity_rotate_is_noop() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = Quaternion::identity().rotate(v);
        assert_close(r.x, 1.0);
        assert_close(r.y, 2.0);
        assert_close(r.z, 3.0);
    }

    #[test]
    fn axis_angle_quarter_turn_about_y_rotates_x_to_minus_z() {
        let q = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        let r = q.rotate(Vec3::X);
        assert_close(r.x, 0.0);
        assert_close(r.y, 0.0);
        assert_close(r.z, -1.0);
    }

    #[test]
    fn conjugate_is_inverse() {
        let q = Quaternion::from_axis_angle(Vec3::Z, 0.7);
        let prod = q.mul(q.conjugate());
        assert_close(prod.w, 1.0);
        assert_close(prod.x, 0.0);
        assert_close(prod.y, 0.0);
        assert_close(prod.z, 0.0);
    }

    // ── Normalization ───────────────────────────────────────────────────────

    #[test]
    fn normalize_is_idempotent() {
        let q = Quaternion::new(2.0, 0.0, 2.0, 0.0);
        let once = q.normalize().unwrap();
        let twice = once.normalize().unwrap();
        assert_close(once.norm_sq(), 1.0);
        assert_close(twice.norm_sq(), 1.0);
        assert_close(once.w, twice.w);
        assert_close(once.y, twice.y);
    }

    #[test]
    fn normalize_rejects_near_zero_norm() {
        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize().is_none());
        assert!(Quaternion::new(1e-6, 0.0, 0.0, 0.0).normalize().is_none());
    }

    #[test]
    fn normalize_rejects_nan() {
        assert!(Quaternion::new(f32::NAN, 0.0, 0.0, 0.0).normalize().is_none());
    }

    // ── Euler decompositions ────────────────────────────────────────────────

    #[test]
    fn yxz_identity_is_all_zero() {
        let e = Quaternion::identity().to_euler_yxz();
        assert_close(e.yaw, 0.0);
        assert_close(e.pitch, 0.0);
        assert_close(e.roll, 0.0);
    }

    #[test]
    fn yxz_recovers_pure_axis_rotations() {
        let e = Quaternion::from_axis_angle(Vec3::Y, 0.5).to_euler_yxz();
        assert_close(e.yaw, 0.5);
        assert_close(e.pitch, 0.0);
        assert_close(e.roll, 0.0);

        let e = Quaternion::from_axis_angle(Vec3::X, 0.4).to_euler_yxz();
        assert_close(e.pitch, 0.4);
        assert_close(e.yaw, 0.0);

        let e = Quaternion::from_axis_angle(Vec3::Z, -0.3).to_euler_yxz();
        assert_close(e.roll, -0.3);
        assert_close(e.yaw, 0.0);
    }

    #[test]
    fn yxz_recovers_composed_rotation_in_order() {
        // q = qY(yaw) * qX(pitch) * qZ(roll) must decompose exactly.
        let yaw = 0.6;
        let pitch = -0.25;
        let roll = 0.4;
        let q = Quaternion::from_axis_angle(Vec3::Y, yaw)
            .mul(Quaternion::from_axis_angle(Vec3::X, pitch))
            .mul(Quaternion::from_axis_angle(Vec3::Z, roll));
        let e = q.to_euler_yxz();
        assert_close(e.yaw, yaw);
        assert_close(e.pitch, pitch);
        assert_close(e.roll, roll);
    }

    #[test]
    fn xyz_quarter_turn_about_y_is_pure_yaw() {
        // The consumer-convention test vector: w=x=0.7071 on (w, y).
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0);
        let e = q.to_euler_xyz();
        assert_close(e.yaw.to_degrees(), 90.0);
        assert_close(e.pitch, 0.0);
        assert_close(e.roll, 0.0);
    }

    #[test]
    fn xyz_recovers_pure_axis_rotations() {
        let e = Quaternion::from_axis_angle(Vec3::X, 0.3).to_euler_xyz();
        assert_close(e.pitch, 0.3);
        assert_close(e.yaw, 0.0);

        let e = Quaternion::from_axis_angle(Vec3::Z, 0.2).to_euler_xyz();
        assert_close(e.roll, 0.2);
        assert_close(e.pitch, 0.0);
    }

    // ── Basis conversion ────────────────────────────────────────────────────

    #[test]
    fn from_basis_identity() {
        let q = Quaternion::from_basis(Vec3::X, Vec3::Y, Vec3::Z);
        assert_close(q.w, 1.0);
        assert_close(q.x, 0.0);
    }

    #[test]
    fn from_basis_matches_axis_angle() {
        // Basis rotated 90° about Y: x̂ → -ẑ, ŷ → ŷ, ẑ → x̂.
        let q = Quaternion::from_basis(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            Vec3::new(1.0, 0.0, 0.0),
        );
        let expected = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert_close(q.w, expected.w);
        assert_close(q.x, expected.x);
        assert_close(q.y, expected.y);
        assert_close(q.z, expected.z);
    }

    #[test]
    fn from_basis_rotates_like_the_basis() {
        // The frame quaternion must map world axes onto the basis columns.
        // Right-handed triple: east × north == up.
        let east = Vec3::new(0.0, 0.0, -1.0);
        let north = Vec3::Y;
        let up = Vec3::X;
        let q = Quaternion::from_basis(east, north, up);
        let r = q.rotate(Vec3::X);
        assert_close(r.x, east.x);
        assert_close(r.y, east.y);
        assert_close(r.z, east.z);
        let r = q.rotate(Vec3::Z);
        assert_close(r.x, up.x);
        assert_close(r.y, up.y);
        assert_close(r.z, up.z);
    }

    // ── Vec3 ────────────────────────────────────────────────────────────────

    #[test]
    fn cross_product_follows_right_hand_rule() {
        let c = Vec3::X.cross(Vec3::Y);
        assert_close(c.x, 0.0);
        assert_close(c.y, 0.0);
        assert_close(c.z, 1.0);
    }

    #[test]
    fn normalized_rejects_zero_vector() {
        assert!(Vec3::zero().normalized().is_none());
        let v = Vec3::new(0.0, 3.0, 4.0).normalized().unwrap();
        assert_close(v.norm_sq(), 1.0);
    }
}
