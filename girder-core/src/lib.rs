//! # Girder Core
//!
//! Core logic for the precast girder gluing dashboard.
//! Platform independent; compiles to WASM for the browser host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               girder-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model      │  Interaction Layer      │
//! │  - 8 segments     │  - Ray picking          │
//! │  - AI suggestion  │  - Hover / click        │
//! │  - Materials      │  - Cursor hints         │
//! ├─────────────────────────────────────────────┤
//! │  Broadcaster      │  Dashboard Controller   │
//! │  - Dedup notify   │  - Glue workflow        │
//! │  - Host callback  │  - Log, alerts, gauges  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alert;
pub mod animation;
pub mod broadcast;
pub mod config;
pub mod dashboard;
pub mod environment;
pub mod error;
pub mod interaction;
pub mod material;
pub mod scene;
pub mod segment;
pub mod session;
pub mod spatial;
pub mod visual;

pub use alert::{Alert, AlertFilter, AlertHistory, AlertId, AlertLevel};
pub use animation::{ease_out_cubic, ease_out_quad, Easing, Pulse, Tween};
pub use broadcast::{SelectionBroadcaster, SelectionCallback};
pub use config::{DashboardConfig, GaugeConfig};
pub use dashboard::{
    DashboardController, DashboardSnapshot, GlueCompletion, GlueRun, RobotStatus,
};
pub use environment::{
    EnvironmentSimulator, EnvironmentSnapshot, GaugeReading, GaugeStatus, MAX_CATCH_UP_STEPS,
};
pub use error::{GirderError, GirderResult, GlueRejection};
pub use interaction::{CursorHint, HoverState, InteractionLayer, InteractionOutcome};
pub use material::{Material, MaterialPreset, SegmentState};
pub use scene::Scene;
pub use segment::{Face, Segment, SegmentId, SegmentRecord, SEGMENT_COUNT};
pub use session::{GirderSession, GlueActions, SessionSnapshot, TickReport};
pub use spatial::{Aabb, Camera, Ray, Vec3, Viewport};
pub use visual::{Frame, SceneVisuals, SegmentVisual};

/// Girder core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
