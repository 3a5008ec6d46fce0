//! `neckos-teleop` – the producer half of the motion pipeline.
//!
//! Consumes orientation snapshots (from the phone's sensors or a relayed
//! peer) and emits baseline-relative, smoothed, clamped, rate-limited wire
//! commands for the motion controller.  Nothing here touches hardware or a
//! transport: the session hands back a rendered command string and the
//! caller decides where it goes.
//!
//! # Modules
//!
//! - [`baseline`] – [`BaselineEngine`][baseline::BaselineEngine]: captures
//!   the zero-reference snapshot and computes yaw/pitch/roll/heading deltas
//!   against it.
//! - [`smoothing`] – [`ChannelFilter`][smoothing::ChannelFilter]: per-channel
//!   exponential moving average with lazy first-sample initialisation.
//! - [`synthesizer`] – [`CommandSynthesizer`][synthesizer::CommandSynthesizer]:
//!   gains, offsets and clamps that turn a delta into a
//!   [`GeneralCommand`][neckos_types::GeneralCommand].
//! - [`pacer`] – [`CommandPacer`][pacer::CommandPacer]: combined
//!   de-duplication + rate limiter on the rendered command string.
//! - [`session`] – [`TeleopSession`][session::TeleopSession]: wires the
//!   above together and owns the re-baseline triggers.

pub mod baseline;
pub mod pacer;
pub mod session;
pub mod smoothing;
pub mod synthesizer;

pub use baseline::{BaselineEngine, OrientationDelta};
pub use pacer::CommandPacer;
pub use session::{DeviceSample, PeerSample, PoseSource, TeleopSession};
pub use smoothing::{ChannelFilter, SmoothingState};
pub use synthesizer::{ChannelGains, ChannelOffsets, CommandSynthesizer, SynthesizerConfig};
