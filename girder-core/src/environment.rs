//! Simulated environmental sensors.
//!
//! Temperature and humidity perform an unbounded random walk, one step per
//! elapsed sensor interval. Readings may leave their nominal range; the gauge
//! status reports that rather than clamping.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{DashboardConfig, GaugeConfig};

/// Colour band of a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeStatus {
    /// Comfortably inside the range.
    Normal,
    /// Within 10% of a bound.
    Warning,
    /// Outside the range.
    Error,
}

/// A single gauge value with its nominal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    /// Gauge title.
    pub title: String,
    /// Unit suffix, e.g. `"°C"`.
    pub unit: String,
    /// Current value.
    pub value: f32,
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl GaugeReading {
    /// Build a reading from its configured start value and range.
    #[must_use]
    pub fn new(title: impl Into<String>, unit: impl Into<String>, config: GaugeConfig) -> Self {
        Self {
            title: title.into(),
            unit: unit.into(),
            value: config.current,
            min: config.min,
            max: config.max,
        }
    }

    /// Colour band for the current value.
    #[must_use]
    pub fn status(&self) -> GaugeStatus {
        if self.value > self.max || self.value < self.min {
            GaugeStatus::Error
        } else if self.value > self.max * 0.9 || self.value < self.min * 1.1 {
            GaugeStatus::Warning
        } else {
            GaugeStatus::Normal
        }
    }

    /// Position of the value within the range, in percent. Not clamped.
    #[must_use]
    pub fn percentage(&self) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f32::EPSILON {
            return 0.0;
        }
        (self.value - self.min) / span * 100.0
    }

    /// Value with one decimal and unit, e.g. `"23.5°C"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.1}{}", self.value, self.unit)
    }
}

/// Snapshot of both gauges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// Temperature gauge.
    pub temperature: GaugeReading,
    /// Humidity gauge.
    pub humidity: GaugeReading,
    /// Timestamp of the most recent walk step.
    pub last_update_ms: f64,
}

/// Most walk steps a single tick replays.
pub const MAX_CATCH_UP_STEPS: u32 = 64;

/// Random-walk sensor simulation.
#[derive(Debug, Clone)]
pub struct EnvironmentSimulator {
    temperature: GaugeReading,
    humidity: GaugeReading,
    rng: StdRng,
    interval_ms: f64,
    half_step: f32,
    last_step_ms: f64,
}

impl EnvironmentSimulator {
    /// Start the simulation at `now_ms` with a seeded generator.
    #[must_use]
    pub fn new(config: &DashboardConfig, seed: u64, now_ms: f64) -> Self {
        Self {
            temperature: GaugeReading::new("Temperature", "°C", config.temperature),
            humidity: GaugeReading::new("Humidity", "%", config.humidity),
            rng: StdRng::seed_from_u64(seed),
            interval_ms: config.sensor_interval_ms,
            half_step: config.sensor_step / 2.0,
            last_step_ms: now_ms,
        }
    }

    /// Advance one walk step for every full interval elapsed since the last
    /// step. Returns how many steps were taken.
    ///
    /// A tick after a long stall replays at most [`MAX_CATCH_UP_STEPS`] steps.
    /// A timestamp earlier than the last step re-anchors the walk.
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        if self.interval_ms <= 0.0 || !now_ms.is_finite() {
            return 0;
        }
        if now_ms < self.last_step_ms {
            tracing::warn!(
                "Sensor clock went backwards ({now_ms} < {}), re-anchoring",
                self.last_step_ms
            );
            self.last_step_ms = now_ms;
            return 0;
        }

        let missed = ((now_ms - self.last_step_ms) / self.interval_ms).floor();
        if missed < 1.0 {
            return 0;
        }
        self.last_step_ms += missed * self.interval_ms;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = missed.min(f64::from(MAX_CATCH_UP_STEPS)) as u32;
        for _ in 0..steps {
            self.step();
        }

        tracing::trace!(
            "Sensors: {} {}",
            self.temperature.display(),
            self.humidity.display()
        );
        steps
    }

    fn step(&mut self) {
        let h = self.half_step;
        if h > 0.0 {
            self.temperature.value += self.rng.random_range(-h..=h);
            self.humidity.value += self.rng.random_range(-h..=h);
        }
    }

    /// Temperature gauge.
    #[must_use]
    pub fn temperature(&self) -> &GaugeReading {
        &self.temperature
    }

    /// Humidity gauge.
    #[must_use]
    pub fn humidity(&self) -> &GaugeReading {
        &self.humidity
    }

    /// Copy of both gauges.
    #[must_use]
    pub fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            temperature: self.temperature.clone(),
            humidity: self.humidity.clone(),
            last_update_ms: self.last_step_ms,
        }
    }
}
