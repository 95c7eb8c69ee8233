//! Time-based tweens.
//!
//! Every animation is a pure function of elapsed time: callers pass the
//! current timestamp on each tick and read back a value, so sampling twice
//! at the same instant gives the same result and late ticks catch up
//! instead of drifting.

use serde::{Deserialize, Serialize};

/// Cubic ease-out, `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quadratic ease-out, `1 - (1 - t)^2`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(2)
}

/// Easing curve applied to a tween's linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    Linear,
    /// Quadratic ease-out.
    QuadOut,
    /// Cubic ease-out.
    #[default]
    CubicOut,
}

impl Easing {
    /// Apply the curve to a linear progress value.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t.clamp(0.0, 1.0),
            Self::QuadOut => ease_out_quad(t),
            Self::CubicOut => ease_out_cubic(t),
        }
    }
}

/// Fraction of `duration_ms` elapsed since `start_ms`, clamped to `[0, 1]`.
///
/// A non-positive duration counts as already finished.
#[must_use]
pub fn progress(start_ms: f64, now_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0)
}

/// A scalar animated from one value to another over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

impl Tween {
    /// Start a tween at `start_ms`.
    #[must_use]
    pub fn new(from: f32, to: f32, start_ms: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            easing,
        }
    }

    /// A tween that has already finished at `value`.
    #[must_use]
    pub fn settled(value: f32) -> Self {
        Self::new(value, value, 0.0, 0.0, Easing::Linear)
    }

    /// Eased value at `now_ms`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value_at(&self, now_ms: f64) -> f32 {
        let eased = self
            .easing
            .apply(progress(self.start_ms, now_ms, self.duration_ms));
        self.from + (self.to - self.from) * eased as f32
    }

    /// Whether the tween has reached its end value at `now_ms`.
    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        progress(self.start_ms, now_ms, self.duration_ms) >= 1.0
    }

    /// Final value.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.to
    }
}

/// Opacity pulse used to draw attention to AI-suggested segments.
///
/// Oscillates `low → high → low` once per period while active, then holds `settle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    start_ms: f64,
    period_ms: f64,
    active_ms: f64,
    low: f32,
    high: f32,
    settle: f32,
}

impl Pulse {
    /// Start a pulse at `start_ms`.
    #[must_use]
    pub fn new(start_ms: f64, period_ms: f64, active_ms: f64, low: f32, high: f32, settle: f32) -> Self {
        Self {
            start_ms,
            period_ms,
            active_ms,
            low,
            high,
            settle,
        }
    }

    /// Opacity at `now_ms`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value_at(&self, now_ms: f64) -> f32 {
        let elapsed = (now_ms - self.start_ms).max(0.0);
        if self.is_finished(now_ms) || self.period_ms <= 0.0 {
            return self.settle;
        }
        let phase = (elapsed % self.period_ms) / self.period_ms;
        self.low + (self.high - self.low) * (phase * std::f64::consts::PI).sin() as f32
    }

    /// Whether the pulse has stopped at `now_ms`.
    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.active_ms
    }
}
