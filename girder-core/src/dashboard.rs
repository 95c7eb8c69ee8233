//! Dashboard state and the simulated glue workflow.
//!
//! ```text
//!             apply_glue (valid)               tick: progress = 100
//!   Idle ───────────────────────────▶ Working ─────────────────────▶ Idle
//!    │                                   │                   log + success alert
//!    └─ apply_glue (invalid) ─▶ log error, stay Idle
//! ```
//!
//! Progress is recomputed from the run's start time on every tick, so a host
//! that ticks late simply sees a larger jump.

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertHistory, AlertLevel};
use crate::animation::{ease_out_cubic, progress};
use crate::config::DashboardConfig;
use crate::error::GlueRejection;
use crate::scene::Scene;
use crate::segment::Segment;

/// First line of every status log.
pub const READY_MESSAGE: &str = "Ready. Select segments to apply glue.";
/// Logged when the selection becomes non-empty.
pub const SELECTED_MESSAGE: &str = "Segments selected for gluing.";
/// Logged after a run finishes.
pub const COMPLETE_MESSAGE: &str = "Glue application complete.";
/// Logged after the operator clears the selection.
pub const CLEARED_MESSAGE: &str = "All selections cleared.";

/// What the robot is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RobotStatus {
    /// Waiting for work.
    #[default]
    Idle,
    /// Applying glue.
    Working,
}

impl std::fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Working => write!(f, "Working"),
        }
    }
}

/// A glue run in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueRun {
    /// When the run started.
    pub start_ms: f64,
    /// Thickness the run was started with (mm).
    pub thickness: f32,
    /// Labels of the segments being glued.
    pub segments: Vec<String>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueCompletion {
    /// Number of segments glued.
    pub segment_count: usize,
    /// Thickness used (mm).
    pub thickness: f32,
}

/// Serializable view of the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Confirmed thickness (mm).
    pub thickness: f32,
    /// AI-recommended thickness (mm).
    pub suggested_thickness: f32,
    /// Whether a run is active.
    pub is_applying_glue: bool,
    /// Run progress in percent.
    pub progress: u8,
    /// Robot status label.
    pub robot_status: RobotStatus,
    /// Selected segments in index order.
    pub selected_segments: Vec<Segment>,
    /// Status log, oldest first.
    pub status_log: Vec<String>,
    /// Alerts, newest first.
    pub alerts: AlertHistory,
}

/// Owns the operator-facing session state.
#[derive(Debug, Clone)]
pub struct DashboardController {
    thickness: f32,
    suggested_thickness: f32,
    min_thickness: f32,
    max_thickness: f32,
    thickness_step: f32,
    stepper_min: f32,
    glue_duration_ms: f64,
    run: Option<GlueRun>,
    progress: u8,
    robot_status: RobotStatus,
    selected: Vec<Segment>,
    status_log: Vec<String>,
    alerts: AlertHistory,
}

impl DashboardController {
    /// Create a controller with the ready message logged.
    #[must_use]
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            thickness: config
                .initial_thickness
                .clamp(config.min_thickness, config.max_thickness),
            suggested_thickness: config.suggested_thickness,
            min_thickness: config.min_thickness,
            max_thickness: config.max_thickness,
            thickness_step: config.thickness_step,
            stepper_min: config.stepper_min,
            glue_duration_ms: config.glue_duration_ms,
            run: None,
            progress: 0,
            robot_status: RobotStatus::Idle,
            selected: Vec::new(),
            status_log: vec![READY_MESSAGE.to_string()],
            alerts: AlertHistory::new(),
        }
    }

    /// Take a fresh segment snapshot from the broadcaster.
    pub fn on_selection_change(&mut self, segments: &[Segment]) {
        let selected: Vec<Segment> = segments.iter().filter(|s| s.selected).cloned().collect();
        let unchanged = selected.len() == self.selected.len()
            && selected
                .iter()
                .zip(&self.selected)
                .all(|(a, b)| a.id == b.id);
        if unchanged {
            return;
        }

        let non_empty = !selected.is_empty();
        self.selected = selected;
        if non_empty && self.status_log.last().map(String::as_str) != Some(SELECTED_MESSAGE) {
            self.log(SELECTED_MESSAGE);
        }
    }

    /// Start a glue run on the current selection.
    ///
    /// # Errors
    ///
    /// Returns the rejection, which is also appended to the status log, when
    /// nothing is selected, the thickness is not a positive number, or a run
    /// is already active. A rejected call changes nothing else.
    pub fn apply_glue(&mut self, thickness: f32, now_ms: f64) -> Result<GlueRun, GlueRejection> {
        let rejection = if self.selected.is_empty() {
            Some(GlueRejection::NoSegmentsSelected)
        } else if !thickness.is_finite() || thickness <= 0.0 {
            Some(GlueRejection::InvalidThickness)
        } else if self.run.is_some() {
            Some(GlueRejection::AlreadyApplying)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            tracing::warn!("Glue request rejected: {rejection}");
            self.log(rejection.to_string());
            return Err(rejection);
        }

        let segments: Vec<String> = self.selected.iter().map(|s| s.id.clone()).collect();
        self.robot_status = RobotStatus::Working;
        self.progress = 0;
        self.log(format!(
            "Applying {thickness}mm glue to: {}",
            segments.join(", ")
        ));
        tracing::info!(
            "Glue run started: {} segments at {thickness}mm",
            segments.len()
        );

        let run = GlueRun {
            start_ms: now_ms,
            thickness,
            segments,
        };
        self.run = Some(run.clone());
        Ok(run)
    }

    /// Start a glue run with the confirmed thickness.
    ///
    /// # Errors
    ///
    /// See [`DashboardController::apply_glue`].
    pub fn apply_confirmed_glue(&mut self, now_ms: f64) -> Result<GlueRun, GlueRejection> {
        self.apply_glue(self.thickness, now_ms)
    }

    /// Sample run progress at `now_ms`. Returns the completion when this
    /// tick finished the run.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self, now_ms: f64) -> Option<GlueCompletion> {
        let run = self.run.as_ref()?;
        let linear = progress(run.start_ms, now_ms, self.glue_duration_ms);
        self.progress = (ease_out_cubic(linear) * 100.0).round().clamp(0.0, 100.0) as u8;
        if linear < 1.0 {
            return None;
        }

        let run = self.run.take()?;
        let completion = GlueCompletion {
            segment_count: run.segments.len(),
            thickness: run.thickness,
        };
        self.robot_status = RobotStatus::Idle;
        self.log(COMPLETE_MESSAGE);
        self.alerts.prepend(Alert::new(
            AlertLevel::Success,
            format!(
                "Glue application completed: {} segments, {}mm thickness",
                completion.segment_count, completion.thickness
            ),
        ));
        tracing::info!("Glue run complete");
        Some(completion)
    }

    /// Store a thickness clamped to the allowed range. Non-finite input is
    /// ignored. Returns the stored value.
    pub fn change_thickness(&mut self, value: f32) -> f32 {
        if value.is_finite() {
            self.thickness = value.clamp(self.min_thickness, self.max_thickness);
        }
        self.thickness
    }

    /// Stepper "+" button. Disabled at the upper bound and during a run.
    pub fn increment_thickness(&mut self) -> bool {
        if self.run.is_some() || self.thickness >= self.max_thickness {
            return false;
        }
        self.change_thickness(self.thickness + self.thickness_step);
        true
    }

    /// Stepper "-" button. Disabled at the stepper floor and during a run.
    pub fn decrement_thickness(&mut self) -> bool {
        if self.run.is_some() || self.thickness <= self.stepper_min {
            return false;
        }
        self.change_thickness(self.thickness - self.thickness_step);
        true
    }

    /// Deselect everything in the scene and log it. Returns how many
    /// segments were deselected.
    pub fn clear_selections(&mut self, scene: &mut Scene) -> usize {
        let cleared = scene.clear_all();
        self.log(CLEARED_MESSAGE);
        cleared
    }

    /// Append a line to the status log.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("Status: {line}");
        self.status_log.push(line);
    }

    /// Confirmed thickness (mm).
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// AI-recommended thickness (mm).
    #[must_use]
    pub fn suggested_thickness(&self) -> f32 {
        self.suggested_thickness
    }

    /// Whether a run is active.
    #[must_use]
    pub fn is_applying(&self) -> bool {
        self.run.is_some()
    }

    /// The active run.
    #[must_use]
    pub fn run(&self) -> Option<&GlueRun> {
        self.run.as_ref()
    }

    /// Last sampled progress in percent.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Robot status.
    #[must_use]
    pub fn robot_status(&self) -> RobotStatus {
        self.robot_status
    }

    /// Selected segments as last reported by the broadcaster.
    #[must_use]
    pub fn selected(&self) -> &[Segment] {
        &self.selected
    }

    /// Status log, oldest first.
    #[must_use]
    pub fn status_log(&self) -> &[String] {
        &self.status_log
    }

    /// Alert history.
    #[must_use]
    pub fn alerts(&self) -> &AlertHistory {
        &self.alerts
    }

    /// Serializable copy of the dashboard state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            thickness: self.thickness,
            suggested_thickness: self.suggested_thickness,
            is_applying_glue: self.is_applying(),
            progress: self.progress,
            robot_status: self.robot_status,
            selected_segments: self.selected.clone(),
            status_log: self.status_log.clone(),
            alerts: self.alerts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(selected: &[usize]) -> Vec<Segment> {
        (0..8)
            .map(|i| Segment {
                id: format!("Segment {}", i + 1),
                index: i,
                selected: selected.contains(&i),
                ai_suggested: false,
            })
            .collect()
    }

    fn controller() -> DashboardController {
        DashboardController::new(&DashboardConfig::default())
    }

    #[test]
    fn test_starts_ready() {
        let dashboard = controller();
        assert_eq!(dashboard.status_log(), [READY_MESSAGE]);
        assert_eq!(dashboard.robot_status(), RobotStatus::Idle);
        assert!((dashboard.thickness() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_selection_logged_once() {
        let mut dashboard = controller();
        dashboard.on_selection_change(&segments(&[1]));
        dashboard.on_selection_change(&segments(&[1, 2]));
        assert_eq!(dashboard.status_log().len(), 2);
        assert_eq!(dashboard.selected().len(), 2);

        dashboard.on_selection_change(&segments(&[]));
        assert_eq!(dashboard.status_log().len(), 2);
        assert!(dashboard.selected().is_empty());
    }

    #[test]
    fn test_reject_empty_selection() {
        let mut dashboard = controller();
        let result = dashboard.apply_glue(5.0, 0.0);
        assert_eq!(result.err(), Some(GlueRejection::NoSegmentsSelected));
        assert!(!dashboard.is_applying());
        assert_eq!(
            dashboard.status_log().last().map(String::as_str),
            Some("Error: No segments selected for gluing.")
        );
    }

    #[test]
    fn test_reject_invalid_thickness() {
        let mut dashboard = controller();
        dashboard.on_selection_change(&segments(&[0]));
        for bad in [0.0, -1.0, f32::NAN] {
            assert_eq!(
                dashboard.apply_glue(bad, 0.0).err(),
                Some(GlueRejection::InvalidThickness)
            );
        }
        assert!(!dashboard.is_applying());
        assert_eq!(dashboard.robot_status(), RobotStatus::Idle);
    }

    #[test]
    fn test_full_run() {
        let mut dashboard = controller();
        dashboard.on_selection_change(&segments(&[0, 3]));
        dashboard.apply_glue(5.0, 1000.0).expect("valid run");

        assert!(dashboard.is_applying());
        assert_eq!(dashboard.robot_status(), RobotStatus::Working);
        assert_eq!(
            dashboard.status_log().last().map(String::as_str),
            Some("Applying 5mm glue to: Segment 1, Segment 4")
        );

        assert!(dashboard.tick(5000.0).is_none());
        assert!((1..100).contains(&dashboard.progress()));

        let completion = dashboard.tick(9000.0).expect("complete");
        assert_eq!(completion.segment_count, 2);
        assert_eq!(dashboard.progress(), 100);
        assert!(!dashboard.is_applying());
        assert_eq!(dashboard.robot_status(), RobotStatus::Idle);
        assert_eq!(
            dashboard.alerts().latest().map(|a| a.message.as_str()),
            Some("Glue application completed: 2 segments, 5mm thickness")
        );
        assert!(dashboard.tick(9100.0).is_none());
    }

    #[test]
    fn test_reentrant_apply_rejected() {
        let mut dashboard = controller();
        dashboard.on_selection_change(&segments(&[2]));
        dashboard.apply_glue(2.5, 0.0).expect("valid run");
        assert_eq!(
            dashboard.apply_glue(2.5, 10.0).err(),
            Some(GlueRejection::AlreadyApplying)
        );
        assert!((dashboard.run().expect("run").thickness - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_change_thickness_clamps() {
        let mut dashboard = controller();
        assert!((dashboard.change_thickness(42.0) - 10.0).abs() < f32::EPSILON);
        assert!((dashboard.change_thickness(0.0) - 0.1).abs() < f32::EPSILON);
        assert!((dashboard.change_thickness(f32::NAN) - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stepper_bounds() {
        let mut dashboard = controller();
        dashboard.change_thickness(9.5);
        assert!(dashboard.increment_thickness());
        assert!(!dashboard.increment_thickness());
        assert!((dashboard.thickness() - 10.0).abs() < f32::EPSILON);

        dashboard.change_thickness(1.0);
        assert!(dashboard.decrement_thickness());
        assert!(!dashboard.decrement_thickness());
        assert!((dashboard.thickness() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear_selections_logs() {
        let mut dashboard = controller();
        let mut scene = Scene::initialize();
        scene.toggle_selection(crate::segment::SegmentId::new(0));
        assert_eq!(dashboard.clear_selections(&mut scene), 1);
        assert!(scene.selected_ids().is_empty());
        assert_eq!(
            dashboard.status_log().last().map(String::as_str),
            Some(CLEARED_MESSAGE)
        );
    }
}
