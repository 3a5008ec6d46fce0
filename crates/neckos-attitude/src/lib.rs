//! `neckos-attitude` – pure attitude math for the teleop producer.
//!
//! Turns raw phone sensor readings (device Euler angles, compass, GPS) and
//! relayed peer poses into normalized attitude snapshots that the rest of the
//! pipeline can difference against a baseline.  Everything in this crate is a
//! pure transform: no side effects, no hardware, no time.
//!
//! # Modules
//!
//! - [`quaternion`] – [`Quaternion`][quaternion::Quaternion] and
//!   [`Vec3`][quaternion::Vec3]: Hamilton products, axis-angle construction,
//!   basis/matrix conversion and the two Tait–Bryan decompositions used by
//!   the producer (YXZ) and the consumer (XYZ) conventions.
//! - [`snapshot`] – [`SnapshotBuilder`][snapshot::SnapshotBuilder]: device
//!   Euler → attitude quaternion, tilt-compensated compass heading, and the
//!   optional geodesic tangent-frame re-projection that yields the display
//!   quaternion.

pub mod quaternion;
pub mod snapshot;

pub use quaternion::{Quaternion, TaitBryan, Vec3};
pub use snapshot::{
    GeoFix, OrientationSnapshot, ProjectionMode, SnapshotBuilder, device_attitude,
    tangent_frame, tilt_compensated_heading,
};
