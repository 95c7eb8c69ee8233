//! Scene model: the fixed arena of girder segments.

use rand::Rng;

use crate::segment::{Face, Segment, SegmentId, SegmentRecord, SEGMENT_COUNT};
use crate::spatial::{Camera, Ray, Vec3, Viewport};

/// Edge lengths shared by every segment panel.
const SEGMENT_SIZE: Vec3 = Vec3::new(2.0, 1.5, 0.12);

/// Panel centres: four along the front face, then four along the back.
const SEGMENT_LAYOUT: [(f32, f32, f32, Face); SEGMENT_COUNT] = [
    (-3.0, 0.0, 1.06, Face::Front),
    (-1.0, 0.0, 1.06, Face::Front),
    (1.0, 0.0, 1.06, Face::Front),
    (3.0, 0.0, 1.06, Face::Front),
    (-3.0, 0.0, -1.06, Face::Back),
    (-1.0, 0.0, -1.06, Face::Back),
    (1.0, 0.0, -1.06, Face::Back),
    (3.0, 0.0, -1.06, Face::Back),
];

/// The girder scene: segments, camera and mount viewport.
///
/// After [`Scene::teardown`] every mutation is a silent no-op so callbacks
/// that fire during unmount cannot touch released state.
#[derive(Debug, Clone)]
pub struct Scene {
    segments: [SegmentRecord; SEGMENT_COUNT],
    camera: Camera,
    viewport: Viewport,
    released: bool,
}

impl Scene {
    /// Create the eight segments at their fixed positions with flags cleared.
    #[must_use]
    pub fn initialize() -> Self {
        let segments = std::array::from_fn(|i| {
            let (x, y, z, face) = SEGMENT_LAYOUT[i];
            SegmentRecord::new(SegmentId::new(i), Vec3::new(x, y, z), SEGMENT_SIZE, face)
        });

        tracing::debug!("Initialized girder scene with {SEGMENT_COUNT} segments");

        Self {
            segments,
            camera: Camera::default(),
            viewport: Viewport::default(),
            released: false,
        }
    }

    /// Look up a segment record.
    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<&SegmentRecord> {
        self.segments.get(id.index())
    }

    /// All segment records in index order.
    pub fn records(&self) -> impl Iterator<Item = &SegmentRecord> {
        self.segments.iter()
    }

    /// Snapshots of every segment in index order.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        self.segments.iter().map(SegmentRecord::snapshot).collect()
    }

    /// Snapshots of the selected segments in index order.
    #[must_use]
    pub fn selected_segments(&self) -> Vec<Segment> {
        self.segments
            .iter()
            .filter(|s| s.selected)
            .map(SegmentRecord::snapshot)
            .collect()
    }

    /// Ids of the selected segments in index order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<SegmentId> {
        self.segments
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.id)
            .collect()
    }

    /// Whether the given segment is selected. Unknown ids are unselected.
    #[must_use]
    pub fn is_selected(&self, id: SegmentId) -> bool {
        self.segment(id).is_some_and(|s| s.selected)
    }

    /// Mark segments as AI-suggested. Invalid ids are skipped.
    ///
    /// Returns how many segments were marked.
    pub fn set_ai_suggested(&mut self, ids: &[SegmentId]) -> usize {
        if self.released {
            return 0;
        }

        let mut marked = 0;
        for id in ids {
            if let Some(segment) = self.segments.get_mut(id.index()) {
                segment.ai_suggested = true;
                marked += 1;
            }
        }
        marked
    }

    /// Simulate an AI recommendation: sample 2 or 3 distinct segments
    /// uniformly without replacement and mark them.
    ///
    /// Returns the chosen ids in ascending order.
    pub fn suggest_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<SegmentId> {
        let amount = rng.random_range(2..=3).min(SEGMENT_COUNT);
        let mut ids: Vec<SegmentId> = rand::seq::index::sample(rng, SEGMENT_COUNT, amount)
            .into_iter()
            .map(SegmentId::new)
            .collect();
        ids.sort_unstable();

        self.set_ai_suggested(&ids);
        tracing::info!(
            "AI suggested segments: {}",
            ids.iter()
                .filter_map(|id| self.segment(*id).map(|s| s.label.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        ids
    }

    /// Flip the selection of a segment.
    ///
    /// Returns the new selection state, or `None` when the id is invalid or
    /// the scene has been torn down. Deselecting also clears the glue mark.
    pub fn toggle_selection(&mut self, id: SegmentId) -> Option<bool> {
        if self.released {
            return None;
        }

        let segment = self.segments.get_mut(id.index())?;
        segment.selected = !segment.selected;
        if !segment.selected {
            segment.glue_applied = false;
        }
        tracing::debug!("{} selected={}", segment.label, segment.selected);
        Some(segment.selected)
    }

    /// Deselect every segment, keeping AI suggestions.
    ///
    /// Returns how many segments were deselected.
    pub fn clear_all(&mut self) -> usize {
        if self.released {
            return 0;
        }

        let mut cleared = 0;
        for segment in &mut self.segments {
            if segment.selected {
                cleared += 1;
            }
            segment.selected = false;
            segment.glue_applied = false;
        }
        cleared
    }

    /// Mark every selected segment as glued. Returns the affected ids.
    pub fn mark_glue_applied(&mut self) -> Vec<SegmentId> {
        if self.released {
            return Vec::new();
        }

        let mut glued = Vec::new();
        for segment in self.segments.iter_mut().filter(|s| s.selected) {
            segment.glue_applied = true;
            glued.push(segment.id);
        }
        glued
    }

    /// Nearest segment hit by a world-space ray, with its distance.
    #[must_use]
    pub fn segment_at_ray(&self, ray: &Ray) -> Option<(SegmentId, f32)> {
        self.segments
            .iter()
            .filter_map(|s| s.bounds.intersect(ray).map(|t| (s.id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Segment under a mount-relative pointer position.
    #[must_use]
    pub fn segment_at(&self, x: f32, y: f32) -> Option<SegmentId> {
        if self.released {
            return None;
        }
        let (ndc_x, ndc_y) = self.viewport.to_ndc(x, y);
        let ray = self.camera.ray_from_ndc(ndc_x, ndc_y);
        self.segment_at_ray(&ray).map(|(id, _)| id)
    }

    /// Project a world point to mount-relative pixels.
    #[must_use]
    pub fn world_to_screen(&self, point: Vec3) -> Option<(f32, f32)> {
        self.camera
            .project(point)
            .map(|(x, y)| self.viewport.to_pixels(x, y))
    }

    /// Resize the mount; keeps the camera aspect in step.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            tracing::warn!("Ignoring degenerate viewport {width}x{height}");
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.camera.set_viewport(width, height);
    }

    /// Current mount viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Viewer camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable viewer camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Release the scene. Later mutations become no-ops.
    pub fn teardown(&mut self) {
        if !self.released {
            tracing::debug!("Girder scene released");
        }
        self.released = true;
    }

    /// Whether [`Scene::teardown`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::initialize()
    }
}
