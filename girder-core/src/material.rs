//! Segment material presets.
//!
//! A segment's look is derived from its flags and the hover state, never
//! stored. [`MaterialPreset::for_state`] picks exactly one preset; presets
//! are never blended.

use serde::{Deserialize, Serialize};

/// Flags that decide which preset a segment shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SegmentState {
    /// Segment is selected for gluing.
    pub selected: bool,
    /// Segment was recommended by the startup simulation.
    pub ai_suggested: bool,
    /// Pointer is over the segment.
    pub hovered: bool,
    /// A glue run has been started on this selected segment.
    pub glue_applied: bool,
}

/// The fixed set of segment looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialPreset {
    /// Untouched segment.
    Base,
    /// Pointer hover over an unselected segment.
    Hover,
    /// Selected for gluing.
    Selected,
    /// Recommended by the AI simulation.
    AiSuggested,
    /// Selected and glued.
    GlueApplied,
}

impl MaterialPreset {
    /// Pick the preset for a segment state.
    ///
    /// Hover only shows on unselected segments; selection outranks the AI hint.
    #[must_use]
    pub fn for_state(state: SegmentState) -> Self {
        match state {
            SegmentState {
                selected: false,
                hovered: true,
                ..
            } => Self::Hover,
            SegmentState {
                selected: true,
                glue_applied: true,
                ..
            } => Self::GlueApplied,
            SegmentState { selected: true, .. } => Self::Selected,
            SegmentState {
                ai_suggested: true,
                ..
            } => Self::AiSuggested,
            SegmentState { .. } => Self::Base,
        }
    }

    /// Surface parameters for this preset.
    #[must_use]
    pub fn material(self) -> Material {
        match self {
            Self::Base => Material::new(0x00dd_dddd, 0.85, 0.5, 0.3),
            Self::Hover => Material::new(0x00dd_dddd, 0.95, 0.5, 0.3).with_emissive(0x00ff_dd44, 0.3),
            Self::Selected => Material::new(0x00ff_d600, 0.9, 0.3, 0.7),
            Self::AiSuggested => {
                Material::new(0x004c_af50, 0.9, 0.4, 0.4).with_emissive(0x004c_af50, 0.1)
            }
            Self::GlueApplied => {
                Material::new(0x0021_96f3, 0.9, 0.2, 0.8).with_emissive(0x0021_96f3, 0.2)
            }
        }
    }
}

/// Physically based surface parameters handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base colour as `0xRRGGBB`.
    pub color: u32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
    /// Emissive colour as `0xRRGGBB`, if any.
    pub emissive: Option<u32>,
    /// Emissive strength.
    pub emissive_intensity: f32,
}

impl Material {
    const fn new(color: u32, opacity: f32, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            opacity,
            roughness,
            metalness,
            emissive: None,
            emissive_intensity: 0.0,
        }
    }

    const fn with_emissive(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = Some(emissive);
        self.emissive_intensity = intensity;
        self
    }

    /// CSS hex string for the base colour, e.g. `#ffd600`.
    #[must_use]
    pub fn css_color(&self) -> String {
        format!("#{:06x}", self.color & 0x00ff_ffff)
    }
}
