//! Per-channel exponential smoothing.
//!
//! Each of the six output channels runs its own exponential moving average.
//! The accumulator initialises lazily to the first raw sample it receives –
//! there is no artificial ramp from zero – and is invalidated whenever the
//! baseline is invalidated, so the contract stays visible in the type
//! (`Option<f32>`, not an implicit zero).

/// Lowest permitted filter coefficient (heaviest smoothing).
pub const ALPHA_MIN: f32 = 0.1;
/// Highest permitted filter coefficient (effectively raw pass-through).
pub const ALPHA_MAX: f32 = 0.95;

/// One exponential-moving-average channel:
/// `smoothed = alpha*raw + (1-alpha)*smoothed_prev`.
#[derive(Debug, Clone, Copy)]
pub struct ChannelFilter {
    alpha: f32,
    state: Option<f32>,
}

impl ChannelFilter {
    /// Create a filter with `alpha` clamped to `[ALPHA_MIN, ALPHA_MAX]`.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(ALPHA_MIN, ALPHA_MAX),
            state: None,
        }
    }

    /// Effective (clamped) filter coefficient.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Change the coefficient without disturbing the accumulator.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(ALPHA_MIN, ALPHA_MAX);
    }

    /// Feed one raw sample and return the smoothed value.  The first sample
    /// seeds the accumulator unchanged.
    pub fn update(&mut self, raw: f32) -> f32 {
        let smoothed = match self.state {
            None => raw,
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
        };
        self.state = Some(smoothed);
        smoothed
    }

    /// Forget the accumulator; the next sample seeds it again.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Whether the accumulator has been seeded.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }
}

/// The six smoothing channels of the command synthesizer.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingState {
    pub yaw: ChannelFilter,
    pub lateral: ChannelFilter,
    pub front_back: ChannelFilter,
    pub height: ChannelFilter,
    pub roll: ChannelFilter,
    pub pitch: ChannelFilter,
}

impl SmoothingState {
    /// Six fresh channels sharing one coefficient.
    pub fn new(alpha: f32) -> Self {
        let filter = ChannelFilter::new(alpha);
        Self {
            yaw: filter,
            lateral: filter,
            front_back: filter,
            height: filter,
            roll: filter,
            pitch: filter,
        }
    }

    /// Reset every channel to uninitialised.
    pub fn reset(&mut self) {
        self.yaw.reset();
        self.lateral.reset();
        self.front_back.reset();
        self.height.reset();
        self.roll.reset();
        self.pitch.reset();
    }

    /// Update the coefficient on every channel.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.yaw.set_alpha(alpha);
        self.lateral.set_alpha(alpha);
        self.front_back.set_alpha(alpha);
        self.height.set_alpha(alpha);
        self.roll.set_alpha(alpha);
        self.pitch.set_alpha(alpha);
    }
}
