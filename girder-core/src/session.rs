//! A mounted dashboard session.
//!
//! [`GirderSession`] wires the pieces together in the order events flow:
//!
//! ```text
//! pointer ─▶ InteractionLayer ─▶ Scene ─▶ SelectionBroadcaster ─▶ host callback
//!                                             │
//!                                             └──▶ DashboardController
//! ```
//!
//! Hosts keep the session returned by [`GirderSession::start`] and drive it
//! through [`GlueActions`]; nothing is reachable through global state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::broadcast::{SelectionBroadcaster, SelectionCallback};
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardController, DashboardSnapshot, GlueCompletion};
use crate::environment::{EnvironmentSimulator, EnvironmentSnapshot};
use crate::error::{GirderResult, GlueRejection};
use crate::interaction::{CursorHint, HoverState, InteractionLayer, InteractionOutcome};
use crate::scene::Scene;
use crate::segment::{Segment, SegmentId};
use crate::visual::{Frame, SceneVisuals};

/// Mixed into the seed so the sensor walk does not mirror the AI draw.
const SENSOR_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Reverse-control surface the host's buttons call into.
pub trait GlueActions {
    /// Deselect every segment.
    fn clear_all_selections(&mut self, now_ms: f64);

    /// Start a glue run on the selected segments.
    ///
    /// # Errors
    ///
    /// Returns why the run was not started.
    fn apply_glue(&mut self, thickness: f32, now_ms: f64) -> Result<(), GlueRejection>;

    /// Snapshots of the selected segments in index order.
    fn get_selected_segments(&self) -> Vec<Segment>;
}

/// What a tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Set when the tick finished a glue run.
    pub completion: Option<GlueCompletion>,
    /// Sensor walk steps taken.
    pub sensor_steps: u32,
    /// Whether any visual tween is still moving.
    pub animating: bool,
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Dashboard cards.
    pub dashboard: DashboardSnapshot,
    /// Gauges.
    pub environment: EnvironmentSnapshot,
    /// All segments in index order.
    pub segments: Vec<Segment>,
    /// Hover state.
    pub hover: HoverState,
    /// Cursor hint.
    pub cursor: CursorHint,
}

/// One mounted dashboard.
#[derive(Debug)]
pub struct GirderSession {
    scene: Scene,
    interaction: InteractionLayer,
    broadcaster: SelectionBroadcaster,
    dashboard: DashboardController,
    environment: EnvironmentSimulator,
    visuals: SceneVisuals,
    released: bool,
}

impl GirderSession {
    /// Validate the configuration, build the scene and run the AI suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn start(config: &DashboardConfig, seed: u64, now_ms: f64) -> GirderResult<Self> {
        config.validate()?;

        let mut scene = Scene::initialize();
        let mut rng = StdRng::seed_from_u64(seed);
        let suggested = scene.suggest_random(&mut rng);

        let mut visuals = SceneVisuals::new(config, &scene, now_ms);
        visuals.start_pulse(&suggested, now_ms);

        tracing::info!("Girder session started (seed {seed})");

        Ok(Self {
            scene,
            interaction: InteractionLayer::new(),
            broadcaster: SelectionBroadcaster::new(),
            dashboard: DashboardController::new(config),
            environment: EnvironmentSimulator::new(config, seed ^ SENSOR_SEED_SALT, now_ms),
            visuals,
            released: false,
        })
    }

    /// Register the host's selection callback.
    pub fn on_segment_selection_change(&mut self, callback: SelectionCallback) {
        self.broadcaster.subscribe(callback);
    }

    /// Pointer moved to mount-relative pixel coordinates.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> InteractionOutcome {
        if self.released {
            return InteractionOutcome::Unchanged;
        }
        self.interaction.pointer_move(&self.scene, x, y)
    }

    /// Pointer left the mount.
    pub fn pointer_leave(&mut self) -> InteractionOutcome {
        if self.released {
            return InteractionOutcome::Unchanged;
        }
        self.interaction.pointer_leave()
    }

    /// Click at mount-relative pixel coordinates.
    pub fn click(&mut self, x: f32, y: f32, now_ms: f64) -> InteractionOutcome {
        if self.released {
            return InteractionOutcome::Unchanged;
        }
        let outcome = self.interaction.click(&mut self.scene, x, y);
        if matches!(outcome, InteractionOutcome::Toggled { .. }) {
            self.selection_mutated(now_ms);
        }
        outcome
    }

    /// Toggle a segment by id, as a keyboard or console host would.
    pub fn toggle_segment(&mut self, id: SegmentId, now_ms: f64) -> Option<bool> {
        let selected = self.scene.toggle_selection(id)?;
        self.selection_mutated(now_ms);
        Some(selected)
    }

    /// Advance timers: sensors, glue progress and the camera intro.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        if self.released {
            return TickReport::default();
        }

        let sensor_steps = self.environment.tick(now_ms);
        let completion = self.dashboard.tick(now_ms);
        self.scene.camera_mut().position = self.visuals.camera_position(now_ms);

        TickReport {
            completion,
            sensor_steps,
            animating: self.visuals.is_animating(now_ms),
        }
    }

    /// Mount resized.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.released {
            self.scene.set_viewport(width, height);
        }
    }

    /// Evaluate the viewer for drawing.
    #[must_use]
    pub fn frame(&self, now_ms: f64) -> Frame {
        self.visuals
            .frame(&self.scene, self.interaction.hover().segment(), now_ms)
    }

    /// Clamp and store the operator's thickness. Returns the stored value.
    pub fn change_thickness(&mut self, value: f32) -> f32 {
        self.dashboard.change_thickness(value)
    }

    /// Start a glue run with the confirmed thickness.
    ///
    /// # Errors
    ///
    /// Returns why the run was not started.
    pub fn apply_confirmed_glue(&mut self, now_ms: f64) -> Result<(), GlueRejection> {
        let thickness = self.dashboard.thickness();
        self.apply_glue(thickness, now_ms)
    }

    /// Release the scene and drop the host callback. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.scene.teardown();
        self.visuals.release();
        self.broadcaster.unsubscribe();
        self.interaction.reset();
        self.released = true;
        tracing::info!("Girder session torn down");
    }

    /// Whether [`GirderSession::teardown`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The interaction layer.
    #[must_use]
    pub fn interaction(&self) -> &InteractionLayer {
        &self.interaction
    }

    /// The selection broadcaster.
    #[must_use]
    pub fn broadcaster(&self) -> &SelectionBroadcaster {
        &self.broadcaster
    }

    /// The dashboard controller.
    #[must_use]
    pub fn dashboard(&self) -> &DashboardController {
        &self.dashboard
    }

    /// Mutable dashboard controller, for the thickness stepper.
    pub fn dashboard_mut(&mut self) -> &mut DashboardController {
        &mut self.dashboard
    }

    /// The sensor simulation.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentSimulator {
        &self.environment
    }

    /// Serializable view of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            dashboard: self.dashboard.snapshot(),
            environment: self.environment.snapshot(),
            segments: self.scene.segments(),
            hover: self.interaction.hover(),
            cursor: self.interaction.cursor(),
        }
    }

    /// [`GirderSession::snapshot`] as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_json(&self) -> GirderResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    fn selection_mutated(&mut self, now_ms: f64) {
        let segments = self.scene.segments();
        if self.broadcaster.publish(&segments) {
            self.dashboard.on_selection_change(&segments);
        }
        self.visuals
            .sync(&self.scene, self.dashboard.thickness(), now_ms);
    }
}

impl GlueActions for GirderSession {
    fn clear_all_selections(&mut self, now_ms: f64) {
        if self.released {
            return;
        }
        self.dashboard.clear_selections(&mut self.scene);
        self.selection_mutated(now_ms);
    }

    fn apply_glue(&mut self, thickness: f32, now_ms: f64) -> Result<(), GlueRejection> {
        if self.released {
            return Err(GlueRejection::SessionClosed);
        }
        let run = self.dashboard.apply_glue(thickness, now_ms)?;
        let glued = self.scene.mark_glue_applied();
        tracing::debug!("Marked {} of {} segments as glued", glued.len(), run.segments.len());
        self.visuals.sync(&self.scene, run.thickness, now_ms);
        Ok(())
    }

    fn get_selected_segments(&self) -> Vec<Segment> {
        self.scene.selected_segments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialPreset;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> GirderSession {
        GirderSession::start(&DashboardConfig::default(), 11, 0.0).expect("valid config")
    }

    #[test]
    fn test_start_suggests_without_selecting() {
        let session = session();
        let suggested = session.scene().records().filter(|s| s.ai_suggested).count();
        assert!((2..=3).contains(&suggested));
        assert!(session.get_selected_segments().is_empty());
    }

    #[test]
    fn test_start_rejects_bad_config() {
        let config = DashboardConfig {
            glue_duration_ms: -1.0,
            ..DashboardConfig::default()
        };
        assert!(GirderSession::start(&config, 0, 0.0).is_err());
    }

    #[test]
    fn test_toggle_broadcasts_and_updates_dashboard() {
        let mut session = session();
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        session.on_segment_selection_change(Box::new(move |_| *sink.borrow_mut() += 1));

        session.toggle_segment(SegmentId::new(2), 0.0);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(session.dashboard().selected().len(), 1);
        assert_eq!(
            session.dashboard().status_log().last().map(String::as_str),
            Some("Segments selected for gluing.")
        );
    }

    #[test]
    fn test_apply_glue_marks_segments() {
        let mut session = session();
        session.toggle_segment(SegmentId::new(0), 0.0);
        session.apply_glue(5.0, 100.0).expect("valid run");

        let frame = session.frame(1000.0);
        assert_eq!(frame.segments[0].preset, MaterialPreset::GlueApplied);
        assert!(session.dashboard().is_applying());

        let report = session.tick(8100.0);
        assert!(report.completion.is_some());
        assert_eq!(session.dashboard().progress(), 100);
    }

    #[test]
    fn test_clear_all_selections() {
        let mut session = session();
        session.toggle_segment(SegmentId::new(1), 0.0);
        session.toggle_segment(SegmentId::new(6), 0.0);
        session.clear_all_selections(10.0);

        assert!(session.get_selected_segments().is_empty());
        assert!(session.dashboard().selected().is_empty());
        assert_eq!(
            session.dashboard().status_log().last().map(String::as_str),
            Some("All selections cleared.")
        );
    }

    #[test]
    fn test_tick_moves_camera() {
        let mut session = session();
        session.tick(1800.0);
        let position = session.scene().camera().position;
        assert!((position.x - 2.0).abs() < 1e-4);
        assert!((position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_teardown_silences_everything() {
        let mut session = session();
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        session.on_segment_selection_change(Box::new(move |_| *sink.borrow_mut() += 1));
        session.teardown();

        assert_eq!(session.toggle_segment(SegmentId::new(0), 0.0), None);
        assert_eq!(session.apply_glue(5.0, 0.0), Err(GlueRejection::SessionClosed));
        assert_eq!(session.pointer_move(400.0, 300.0), InteractionOutcome::Unchanged);
        assert!(session.frame(0.0).segments.is_empty());
        assert_eq!(*calls.borrow(), 0);
        session.teardown();
    }

    #[test]
    fn test_snapshot_json_shape() {
        let session = session();
        let value: serde_json::Value =
            serde_json::from_str(&session.snapshot_json().expect("serialize")).expect("parse");
        assert_eq!(value["dashboard"]["robotStatus"], "Idle");
        assert_eq!(value["segments"].as_array().map(Vec::len), Some(8));
        assert_eq!(value["hover"]["state"], "Idle");
    }
}
