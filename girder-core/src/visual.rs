//! Per-frame visual state for the girder viewer.
//!
//! [`SceneVisuals`] watches the scene flags between frames and starts the
//! cosmetic tweens (selection scale, glue offset, AI pulse, camera intro).
//! Every value is evaluated against the timestamp of the frame being drawn.

use serde::{Deserialize, Serialize};

use crate::animation::{ease_out_cubic, progress, Easing, Pulse, Tween};
use crate::config::DashboardConfig;
use crate::material::{Material, MaterialPreset};
use crate::scene::Scene;
use crate::segment::{SegmentId, SEGMENT_COUNT};
use crate::spatial::Vec3;

/// Where the intro camera flight ends.
const CAMERA_REST: Vec3 = Vec3::new(2.0, 4.0, 10.0);

/// Opacity range of the AI suggestion pulse.
const PULSE_LOW: f32 = 0.7;
const PULSE_HIGH: f32 = 0.9;

/// Everything a renderer needs to draw one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentVisual {
    /// Segment index.
    pub index: usize,
    /// Active preset.
    pub preset: MaterialPreset,
    /// Surface parameters of the preset.
    pub material: Material,
    /// Opacity after the AI pulse is applied.
    pub opacity: f32,
    /// Uniform scale around the segment centre.
    pub scale: f32,
    /// World-space translation away from the rest position.
    pub offset: Vec3,
    /// Rest centre.
    pub center: Vec3,
    /// Rest size.
    pub size: Vec3,
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Timestamp the frame was evaluated at.
    pub now_ms: f64,
    /// Camera position for this frame.
    pub camera_position: Vec3,
    /// Segments in index order.
    pub segments: Vec<SegmentVisual>,
}

#[derive(Debug, Clone, Copy)]
struct SegmentTweens {
    scale: Tween,
    offset: Tween,
    pulse: Option<Pulse>,
    was_selected: bool,
    was_glued: bool,
}

impl Default for SegmentTweens {
    fn default() -> Self {
        Self {
            scale: Tween::settled(1.0),
            offset: Tween::settled(0.0),
            pulse: None,
            was_selected: false,
            was_glued: false,
        }
    }
}

/// Tween bookkeeping for the whole scene.
#[derive(Debug, Clone)]
pub struct SceneVisuals {
    tweens: [SegmentTweens; SEGMENT_COUNT],
    camera_from: Vec3,
    camera_start_ms: f64,
    camera_duration_ms: f64,
    selection_scale: f32,
    selection_scale_ms: f64,
    glue_offset_per_mm: f32,
    glue_offset_ms: f64,
    pulse_period_ms: f64,
    pulse_active_ms: f64,
    released: bool,
}

impl SceneVisuals {
    /// Start the camera intro at `now_ms`, flying from the scene's current camera.
    #[must_use]
    pub fn new(config: &DashboardConfig, scene: &Scene, now_ms: f64) -> Self {
        Self {
            tweens: [SegmentTweens::default(); SEGMENT_COUNT],
            camera_from: scene.camera().position,
            camera_start_ms: now_ms,
            camera_duration_ms: config.camera_intro_ms,
            selection_scale: config.selection_scale,
            selection_scale_ms: config.selection_scale_ms,
            glue_offset_per_mm: config.glue_offset_per_mm,
            glue_offset_ms: config.glue_offset_ms,
            pulse_period_ms: config.pulse_period_ms,
            pulse_active_ms: config.pulse_active_ms,
            released: false,
        }
    }

    /// Start the opacity pulse on freshly suggested segments.
    pub fn start_pulse(&mut self, ids: &[SegmentId], now_ms: f64) {
        if self.released {
            return;
        }
        for id in ids {
            if let Some(t) = self.tweens.get_mut(id.index()) {
                t.pulse = Some(Pulse::new(
                    now_ms,
                    self.pulse_period_ms,
                    self.pulse_active_ms,
                    PULSE_LOW,
                    PULSE_HIGH,
                    PULSE_HIGH,
                ));
            }
        }
    }

    /// Compare the scene flags with the previous sync and start tweens for
    /// whatever changed. A segment that became glued is pushed outward in
    /// proportion to `thickness`.
    pub fn sync(&mut self, scene: &Scene, thickness: f32, now_ms: f64) {
        if self.released {
            return;
        }

        for record in scene.records() {
            let Some(t) = self.tweens.get_mut(record.id.index()) else {
                continue;
            };

            if record.selected != t.was_selected {
                let from = t.scale.value_at(now_ms);
                let to = if record.selected {
                    self.selection_scale
                } else {
                    1.0
                };
                t.scale = Tween::new(from, to, now_ms, self.selection_scale_ms, Easing::QuadOut);
                t.was_selected = record.selected;
            }

            if record.glue_applied != t.was_glued {
                t.offset = if record.glue_applied {
                    Tween::new(
                        t.offset.value_at(now_ms),
                        self.glue_offset_per_mm * thickness,
                        now_ms,
                        self.glue_offset_ms,
                        Easing::CubicOut,
                    )
                } else {
                    Tween::settled(0.0)
                };
                t.was_glued = record.glue_applied;
            }
        }
    }

    /// Camera position at `now_ms`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn camera_position(&self, now_ms: f64) -> Vec3 {
        let t = ease_out_cubic(progress(
            self.camera_start_ms,
            now_ms,
            self.camera_duration_ms,
        ));
        self.camera_from.lerp(&CAMERA_REST, t as f32)
    }

    /// Whether any tween is still moving at `now_ms`.
    #[must_use]
    pub fn is_animating(&self, now_ms: f64) -> bool {
        if self.released {
            return false;
        }
        progress(self.camera_start_ms, now_ms, self.camera_duration_ms) < 1.0
            || self.tweens.iter().any(|t| {
                !t.scale.is_finished(now_ms)
                    || !t.offset.is_finished(now_ms)
                    || t.pulse.is_some_and(|p| !p.is_finished(now_ms))
            })
    }

    /// Evaluate every segment for drawing. `hovered` is the current hover target.
    #[must_use]
    pub fn frame(&self, scene: &Scene, hovered: Option<SegmentId>, now_ms: f64) -> Frame {
        let segments = if self.released {
            Vec::new()
        } else {
            scene
                .records()
                .zip(self.tweens.iter())
                .map(|(record, t)| {
                    let preset = MaterialPreset::for_state(record.state(hovered == Some(record.id)));
                    let material = preset.material();
                    let opacity = match (preset, t.pulse) {
                        (MaterialPreset::AiSuggested, Some(pulse)) => pulse.value_at(now_ms),
                        _ => material.opacity,
                    };
                    SegmentVisual {
                        index: record.id.index(),
                        preset,
                        material,
                        opacity,
                        scale: t.scale.value_at(now_ms),
                        offset: Vec3::new(0.0, 0.0, record.face.normal_z() * t.offset.value_at(now_ms)),
                        center: record.bounds.center(),
                        size: record.bounds.max.sub(&record.bounds.min),
                    }
                })
                .collect()
        };

        Frame {
            now_ms,
            camera_position: self.camera_position(now_ms),
            segments,
        }
    }

    /// Drop every tween. Later frames are empty.
    pub fn release(&mut self) {
        self.tweens = [SegmentTweens::default(); SEGMENT_COUNT];
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn setup() -> (Scene, SceneVisuals) {
        let scene = Scene::initialize();
        let visuals = SceneVisuals::new(&DashboardConfig::default(), &scene, 0.0);
        (scene, visuals)
    }

    #[test]
    fn test_camera_intro_lands_at_rest() {
        let (_, visuals) = setup();
        let start = visuals.camera_position(0.0);
        assert!((start.z - 12.0).abs() < EPSILON);
        let end = visuals.camera_position(1800.0);
        assert!((end.x - 2.0).abs() < EPSILON);
        assert!((end.y - 4.0).abs() < EPSILON);
        assert!((end.z - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_selection_scales_up_then_down() {
        let (mut scene, mut visuals) = setup();
        let id = SegmentId::new(2);

        scene.toggle_selection(id);
        visuals.sync(&scene, 5.0, 1000.0);
        let mid = visuals.frame(&scene, None, 1150.0).segments[2].scale;
        assert!(mid > 1.0 && mid < 1.05);
        assert!((visuals.frame(&scene, None, 1300.0).segments[2].scale - 1.05).abs() < EPSILON);

        scene.toggle_selection(id);
        visuals.sync(&scene, 5.0, 2000.0);
        assert!((visuals.frame(&scene, None, 2300.0).segments[2].scale - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_glue_offset_follows_face_normal() {
        let (mut scene, mut visuals) = setup();
        scene.toggle_selection(SegmentId::new(1));
        scene.toggle_selection(SegmentId::new(5));
        scene.mark_glue_applied();
        visuals.sync(&scene, 4.0, 0.0);

        let frame = visuals.frame(&scene, None, 800.0);
        assert!((frame.segments[1].offset.z - 0.2).abs() < EPSILON);
        assert!((frame.segments[5].offset.z + 0.2).abs() < EPSILON);
        assert_eq!(frame.segments[1].preset, MaterialPreset::GlueApplied);

        scene.clear_all();
        visuals.sync(&scene, 4.0, 900.0);
        assert!(visuals.frame(&scene, None, 900.0).segments[1].offset.z.abs() < EPSILON);
    }

    #[test]
    fn test_ai_pulse_then_settle() {
        let (mut scene, mut visuals) = setup();
        let id = SegmentId::new(4);
        scene.set_ai_suggested(&[id]);
        visuals.start_pulse(&[id], 0.0);

        let early = visuals.frame(&scene, None, 0.0).segments[4].opacity;
        assert!((early - 0.7).abs() < EPSILON);
        let settled = visuals.frame(&scene, None, 5000.0).segments[4].opacity;
        assert!((settled - 0.9).abs() < EPSILON);
        assert!(!visuals.is_animating(5000.0));
    }

    #[test]
    fn test_hover_preset_only_on_hovered_segment() {
        let (scene, visuals) = setup();
        let frame = visuals.frame(&scene, Some(SegmentId::new(3)), 0.0);
        let hovered: Vec<_> = frame
            .segments
            .iter()
            .filter(|s| s.preset == MaterialPreset::Hover)
            .map(|s| s.index)
            .collect();
        assert_eq!(hovered, [3]);
    }

    #[test]
    fn test_release_empties_frames() {
        let (scene, mut visuals) = setup();
        visuals.release();
        assert!(visuals.frame(&scene, None, 0.0).segments.is_empty());
        assert!(!visuals.is_animating(0.0));
    }
}
