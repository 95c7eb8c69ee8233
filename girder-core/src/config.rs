//! Dashboard tuning constants.
//!
//! Everything the simulation uses is collected here so a host can override
//! it from JSON. Missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GirderError, GirderResult};

/// Configuration for a dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Total duration of a simulated glue run.
    pub glue_duration_ms: f64,
    /// How often a host should sample progress while a run is active.
    pub progress_interval_ms: f64,
    /// Smallest storable thickness (mm).
    pub min_thickness: f32,
    /// Largest storable thickness (mm).
    pub max_thickness: f32,
    /// Stepper increment (mm).
    pub thickness_step: f32,
    /// Lowest value the stepper will step down to (mm).
    pub stepper_min: f32,
    /// Thickness the AI recommends (mm).
    pub suggested_thickness: f32,
    /// Thickness the operator starts with (mm).
    pub initial_thickness: f32,
    /// Period of the environment random walk.
    pub sensor_interval_ms: f64,
    /// Each walk step is uniform in `[-sensor_step / 2, sensor_step / 2]`.
    pub sensor_step: f32,
    /// Starting temperature gauge.
    pub temperature: GaugeConfig,
    /// Starting humidity gauge.
    pub humidity: GaugeConfig,
    /// Selection scale animation.
    pub selection_scale: f32,
    /// Selection scale animation duration.
    pub selection_scale_ms: f64,
    /// Outward glue offset per mm of thickness.
    pub glue_offset_per_mm: f32,
    /// Glue offset animation duration.
    pub glue_offset_ms: f64,
    /// Camera intro animation duration.
    pub camera_intro_ms: f64,
    /// AI suggestion pulse period.
    pub pulse_period_ms: f64,
    /// How long AI suggestions pulse.
    pub pulse_active_ms: f64,
}

/// Initial reading and display range for one gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Starting value.
    pub current: f32,
    /// Lower bound of the nominal range.
    pub min: f32,
    /// Upper bound of the nominal range.
    pub max: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            glue_duration_ms: 8000.0,
            progress_interval_ms: 100.0,
            min_thickness: 0.1,
            max_thickness: 10.0,
            thickness_step: 0.5,
            stepper_min: 0.5,
            suggested_thickness: 5.0,
            initial_thickness: 5.0,
            sensor_interval_ms: 2000.0,
            sensor_step: 1.0,
            temperature: GaugeConfig {
                current: 23.5,
                min: 18.0,
                max: 25.0,
            },
            humidity: GaugeConfig {
                current: 45.0,
                min: 30.0,
                max: 60.0,
            },
            selection_scale: 1.05,
            selection_scale_ms: 300.0,
            glue_offset_per_mm: 0.05,
            glue_offset_ms: 800.0,
            camera_intro_ms: 1800.0,
            pulse_period_ms: 1500.0,
            pulse_active_ms: 3000.0,
        }
    }
}

impl DashboardConfig {
    /// Check that ranges are ordered and durations are positive.
    ///
    /// # Errors
    ///
    /// Returns [`GirderError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> GirderResult<()> {
        if !positive(self.min_thickness) || self.min_thickness >= self.max_thickness {
            return Err(GirderError::InvalidConfig(format!(
                "thickness range {}..{} must be positive and ordered",
                self.min_thickness, self.max_thickness
            )));
        }
        if !positive(self.thickness_step) {
            return Err(GirderError::InvalidConfig(
                "thickness_step must be positive".to_string(),
            ));
        }
        if !self.sensor_step.is_finite() || self.sensor_step < 0.0 {
            return Err(GirderError::InvalidConfig(format!(
                "sensor_step must be finite and non-negative, got {}",
                self.sensor_step
            )));
        }
        if !(self.min_thickness..=self.max_thickness).contains(&self.initial_thickness) {
            return Err(GirderError::InvalidConfig(format!(
                "initial_thickness {} outside {}..={}",
                self.initial_thickness, self.min_thickness, self.max_thickness
            )));
        }
        for (name, value) in [
            ("glue_duration_ms", self.glue_duration_ms),
            ("progress_interval_ms", self.progress_interval_ms),
            ("sensor_interval_ms", self.sensor_interval_ms),
        ] {
            if !positive(value) {
                return Err(GirderError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> GirderResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load(path: &Path) -> GirderResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// `true` for finite values above zero.
fn positive<T: Into<f64>>(value: T) -> bool {
    let value = value.into();
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(DashboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DashboardConfig::from_json(r#"{"glue_duration_ms": 2000.0}"#)
            .expect("should parse");
        assert!((config.glue_duration_ms - 2000.0).abs() < f64::EPSILON);
        assert!((config.max_thickness - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = DashboardConfig::from_json(r#"{"min_thickness": 12.0}"#);
        assert!(matches!(result, Err(GirderError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let result = DashboardConfig::from_json(r#"{"glue_duration_ms": 0.0}"#);
        assert!(matches!(result, Err(GirderError::InvalidConfig(msg)) if msg.contains("glue_duration_ms")));
    }

    #[test]
    fn test_rejects_unusable_sensor_step() {
        for step in [f32::INFINITY, f32::NAN, -1.0] {
            let config = DashboardConfig {
                sensor_step: step,
                ..DashboardConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(GirderError::InvalidConfig(msg)) if msg.contains("sensor_step")),
                "accepted sensor_step {step}"
            );
        }
        assert!(DashboardConfig::from_json(r#"{"sensor_step": 1e39}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"sensor_step": 0.0}"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = DashboardConfig::from_json("{ not json }");
        assert!(matches!(result, Err(GirderError::Serialization(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"suggested_thickness": 3.5}}"#).expect("write");
        let config = DashboardConfig::load(file.path()).expect("should load");
        assert!((config.suggested_thickness - 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let result = DashboardConfig::load(Path::new("/nonexistent/girder.json"));
        assert!(matches!(result, Err(GirderError::Io(_))));
    }
}
