//! Girder segments - the selectable regions of the box girder.

use serde::{Deserialize, Serialize};

use crate::material::SegmentState;
use crate::spatial::{Aabb, Vec3};

/// Number of selectable segments on the girder.
pub const SEGMENT_COUNT: usize = 8;

/// Index of a segment in the scene arena.
///
/// Any value can be constructed; ids outside `0..SEGMENT_COUNT` simply
/// match nothing, so stale ids held by a host are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(usize);

impl SegmentId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Whether the id addresses a segment.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 < SEGMENT_COUNT
    }

    /// Iterate over every valid id in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SEGMENT_COUNT).map(Self)
    }
}

impl From<usize> for SegmentId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of a segment as handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Display label, e.g. `"Segment 3"`.
    pub id: String,
    /// Stable index in the scene.
    pub index: usize,
    /// Whether the segment is selected for gluing.
    pub selected: bool,
    /// Whether the AI simulation recommended this segment.
    pub ai_suggested: bool,
}

/// Which face of the girder a segment sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// Facing +Z.
    Front,
    /// Facing -Z.
    Back,
}

impl Face {
    /// Outward normal along Z (+1 or -1).
    #[must_use]
    pub fn normal_z(self) -> f32 {
        match self {
            Self::Front => 1.0,
            Self::Back => -1.0,
        }
    }
}

/// A segment as stored in the scene arena.
#[derive(Debug, Clone)]
pub struct SegmentRecord {
    /// Arena index.
    pub id: SegmentId,
    /// Display label.
    pub label: String,
    /// World-space box at rest.
    pub bounds: Aabb,
    /// Girder face the segment belongs to.
    pub face: Face,
    /// Selected for gluing.
    pub selected: bool,
    /// Recommended by the AI simulation.
    pub ai_suggested: bool,
    /// A glue run was started while this segment was selected.
    pub glue_applied: bool,
}

impl SegmentRecord {
    /// Create a record with all flags cleared.
    #[must_use]
    pub fn new(id: SegmentId, center: Vec3, size: Vec3, face: Face) -> Self {
        Self {
            id,
            label: format!("Segment {}", id.index() + 1),
            bounds: Aabb::from_center_size(center, size),
            face,
            selected: false,
            ai_suggested: false,
            glue_applied: false,
        }
    }

    /// Host-facing snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Segment {
        Segment {
            id: self.label.clone(),
            index: self.id.index(),
            selected: self.selected,
            ai_suggested: self.ai_suggested,
        }
    }

    /// Flags for material selection, given the current hover.
    #[must_use]
    pub fn state(&self, hovered: bool) -> SegmentState {
        SegmentState {
            selected: self.selected,
            ai_suggested: self.ai_suggested,
            hovered,
            glue_applied: self.glue_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_one_based() {
        let record = SegmentRecord::new(
            SegmentId::new(2),
            Vec3::zero(),
            Vec3::new(2.0, 1.5, 0.12),
            Face::Front,
        );
        assert_eq!(record.label, "Segment 3");
        assert_eq!(record.snapshot().index, 2);
    }

    #[test]
    fn test_segment_serializes_camel_case() {
        let segment = Segment {
            id: "Segment 1".to_string(),
            index: 0,
            selected: true,
            ai_suggested: false,
        };
        let json = serde_json::to_string(&segment).expect("serialize");
        assert_eq!(
            json,
            r#"{"id":"Segment 1","index":0,"selected":true,"aiSuggested":false}"#
        );
    }

    #[test]
    fn test_segment_id_validity() {
        assert!(SegmentId::new(7).is_valid());
        assert!(!SegmentId::new(8).is_valid());
        assert_eq!(SegmentId::all().count(), SEGMENT_COUNT);
    }
}
