//! Pointer interaction: hover tracking and click-to-toggle.
//!
//! ```text
//!            move over i                 move over j ≠ i
//!   Idle ─────────────────▶ Hovering(i) ─────────────────▶ Hovering(j)
//!    ▲                          │
//!    └──────── move off ────────┘
//!
//!   click over k (any state) → toggle_selection(k)
//! ```
//!
//! The highlight itself is not stored: a segment is highlighted while it is
//! the hover target and unselected, which [`crate::material`] derives on
//! every frame. Reverting a highlight is therefore just leaving the state.

use serde::{Deserialize, Serialize};

use crate::scene::Scene;
use crate::segment::SegmentId;

/// Hover state of the pointer over the girder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "segment")]
pub enum HoverState {
    /// Pointer is not over any segment.
    #[default]
    Idle,
    /// Pointer is over the given segment.
    Hovering(SegmentId),
}

impl HoverState {
    /// The hovered segment, if any.
    #[must_use]
    pub fn segment(self) -> Option<SegmentId> {
        match self {
            Self::Idle => None,
            Self::Hovering(id) => Some(id),
        }
    }
}

/// Cursor the host should show over the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    /// Regular arrow.
    #[default]
    Default,
    /// Hand cursor over a clickable segment.
    Pointer,
}

impl CursorHint {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
        }
    }
}

/// What a pointer event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Nothing changed.
    Unchanged,
    /// The hover target changed.
    HoverChanged {
        /// Segment that lost the hover.
        from: Option<SegmentId>,
        /// Segment that gained the hover.
        to: Option<SegmentId>,
    },
    /// A segment's selection was toggled.
    Toggled {
        /// The toggled segment.
        segment: SegmentId,
        /// Its new selection state.
        selected: bool,
    },
}

/// Hover/selection state machine over a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct InteractionLayer {
    hover: HoverState,
    cursor: CursorHint,
}

impl InteractionLayer {
    /// Create a layer in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hover state.
    #[must_use]
    pub fn hover(&self) -> HoverState {
        self.hover
    }

    /// Cursor the host should show.
    #[must_use]
    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Whether the segment currently shows the hover highlight.
    #[must_use]
    pub fn is_highlighted(&self, scene: &Scene, id: SegmentId) -> bool {
        self.hover == HoverState::Hovering(id) && !scene.is_selected(id)
    }

    /// Handle a pointer move at mount-relative pixel coordinates.
    pub fn pointer_move(&mut self, scene: &Scene, x: f32, y: f32) -> InteractionOutcome {
        let target = scene.segment_at(x, y);
        self.cursor = if target.is_some() {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        };
        self.transition(target)
    }

    /// Handle the pointer leaving the mount.
    pub fn pointer_leave(&mut self) -> InteractionOutcome {
        self.cursor = CursorHint::Default;
        self.transition(None)
    }

    /// Handle a click at mount-relative pixel coordinates.
    ///
    /// Toggles the nearest segment under the pointer regardless of hover
    /// state. Clicking empty space changes nothing.
    pub fn click(&mut self, scene: &mut Scene, x: f32, y: f32) -> InteractionOutcome {
        let Some(segment) = scene.segment_at(x, y) else {
            return InteractionOutcome::Unchanged;
        };

        match scene.toggle_selection(segment) {
            Some(selected) => InteractionOutcome::Toggled { segment, selected },
            None => InteractionOutcome::Unchanged,
        }
    }

    /// Forget the hover target without emitting an outcome; used on teardown.
    pub fn reset(&mut self) {
        self.hover = HoverState::Idle;
        self.cursor = CursorHint::Default;
    }

    fn transition(&mut self, target: Option<SegmentId>) -> InteractionOutcome {
        let from = self.hover.segment();
        if from == target {
            return InteractionOutcome::Unchanged;
        }

        self.hover = target.map_or(HoverState::Idle, HoverState::Hovering);
        tracing::debug!("Hover {:?} -> {:?}", from, target);
        InteractionOutcome::HoverChanged { from, to: target }
    }
}
