//! # Girder Glue Dashboard WASM Application
//!
//! Mounts the girder segment viewer on a `<canvas>` and hands the glue
//! actions to the page. The page owns the returned `GirderApp`; there is no
//! global bridge object.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web girder-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { GirderApp } from './pkg/girder_app.js';
//!
//! await init();
//! const app = new GirderApp('girder-canvas');
//! app.onSegmentSelectionChange((json) => renderSelection(JSON.parse(json)));
//! canvas.addEventListener('mousemove', (e) => app.pointerMove(e));
//! canvas.addEventListener('click', (e) => app.click(e));
//! applyButton.onclick = () => app.applyGlue(thickness);
//!
//! new ResizeObserver(([entry]) => {
//!     const { width, height } = entry.contentRect;
//!     const dpr = window.devicePixelRatio;
//!     app.resize(Math.round(width * dpr), Math.round(height * dpr));
//! }).observe(canvas);
//!
//! // rAF timestamps share the origin of performance.now(), which the
//! // session is started on.
//! function frame(now) {
//!     app.tick(now);
//!     requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::{cell::RefCell, rc::Rc};

use girder_core::{
    Aabb, DashboardConfig, GirderSession, GlueActions, InteractionOutcome, Scene, Segment,
    SegmentVisual, Vec3,
};

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Girder dashboard WASM initialized");
}

/// Screen-space rectangle covering a projected segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Client-space rectangle of the canvas element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClientRect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

/// Map a client-space point into canvas backing-store pixels, the space the
/// viewport is sized in. Covers CSS stretching and device pixel ratios.
#[allow(clippy::cast_possible_truncation)]
fn client_to_backing(client: (f64, f64), rect: ClientRect, backing: (u32, u32)) -> (f32, f32) {
    let scale = |css: f64, pixels: u32| {
        if css > 0.0 {
            f64::from(pixels) / css
        } else {
            1.0
        }
    };
    (
        ((client.0 - rect.left) * scale(rect.width, backing.0)) as f32,
        ((client.1 - rect.top) * scale(rect.height, backing.1)) as f32,
    )
}

/// Milliseconds on the page's high-resolution clock, the origin
/// `requestAnimationFrame` timestamps use.
fn performance_now() -> Result<f64, JsValue> {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .ok_or_else(|| JsValue::from_str("No performance clock"))
}

/// Project the animated box of a segment and take its screen bounds.
///
/// Returns `None` if any corner is behind the camera.
fn project_segment(scene: &Scene, visual: &SegmentVisual) -> Option<ScreenRect> {
    let bounds = Aabb::from_center_size(
        visual.center.add(&visual.offset),
        visual.size.scale(visual.scale),
    );

    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);
    for corner in bounds.corners() {
        let (x, y) = scene.world_to_screen(corner)?;
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    }

    Some(ScreenRect {
        x: min.0,
        y: min.1,
        width: max.0 - min.0,
        height: max.1 - min.1,
    })
}

/// Painter's order: farthest segment first.
fn back_to_front<'a>(camera: Vec3, segments: &'a [SegmentVisual]) -> Vec<&'a SegmentVisual> {
    let mut ordered: Vec<_> = segments.iter().collect();
    ordered.sort_by(|a, b| {
        let da = a.center.add(&a.offset).sub(&camera).length();
        let db = b.center.add(&b.offset).sub(&camera).length();
        db.total_cmp(&da)
    });
    ordered
}

struct DomRendererState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    background_color: String,
}

impl DomRendererState {
    fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let width = canvas.width();
        let height = canvas.height();
        Self {
            canvas,
            ctx,
            width,
            height,
            background_color: "#f5f5f5".to_string(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.width = width;
        self.height = height;
    }

    /// Position of a mouse event in canvas backing-store pixels.
    fn local_position(&self, event: &MouseEvent) -> (f32, f32) {
        let rect = self.canvas.get_bounding_client_rect();
        client_to_backing(
            (f64::from(event.client_x()), f64::from(event.client_y())),
            ClientRect {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
            },
            (self.canvas.width(), self.canvas.height()),
        )
    }

    fn render(&self, session: &GirderSession, now_ms: f64) {
        self.ctx.set_fill_style_str(&self.background_color);
        self.ctx
            .fill_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height));

        let frame = session.frame(now_ms);
        let scene = session.scene();
        for visual in back_to_front(scene.camera().position, &frame.segments) {
            self.render_segment(scene, visual);
        }
    }

    fn render_segment(&self, scene: &Scene, visual: &SegmentVisual) {
        let Some(rect) = project_segment(scene, visual) else {
            return;
        };
        let (x, y, w, h) = (
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );

        self.ctx.set_global_alpha(f64::from(visual.opacity));
        self.ctx.set_fill_style_str(&visual.material.css_color());
        self.ctx.fill_rect(x, y, w, h);

        if let Some(emissive) = visual.material.emissive {
            self.ctx
                .set_stroke_style_str(&format!("#{:06x}", emissive & 0x00ff_ffff));
            self.ctx.set_line_width(2.0);
            self.ctx.stroke_rect(x, y, w, h);
        }
        self.ctx.set_global_alpha(1.0);

        let label = scene
            .records()
            .nth(visual.index)
            .map_or_else(|| format!("Segment {}", visual.index + 1), |r| r.label.clone());
        self.ctx.set_fill_style_str("#333333");
        self.ctx.set_font("12px sans-serif");
        let _ = self.ctx.fill_text(&label, x + 5.0, y + 15.0);
    }
}

/// The girder dashboard for WASM.
#[wasm_bindgen]
pub struct GirderApp {
    session: GirderSession,
    renderer_state: Rc<RefCell<DomRendererState>>,
    last_now_ms: f64,
}

#[wasm_bindgen]
impl GirderApp {
    /// Mount the dashboard on the canvas with the given element ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas element is not found or 2D context fails.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<GirderApp, JsValue> {
        Self::with_config(canvas_id, None)
    }

    /// Mount with a JSON dashboard configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or mounting fails.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(canvas_id: &str, config_json: Option<String>) -> Result<GirderApp, JsValue> {
        let config = match config_json {
            Some(json) => DashboardConfig::from_json(&json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => DashboardConfig::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("Canvas element '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("Element is not a canvas"))?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| JsValue::from_str("Failed to get 2D context"))?
            .ok_or_else(|| JsValue::from_str("2D context not available"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("Failed to cast to 2D context"))?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seed = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        let now_ms = performance_now()?;

        let mut session = GirderSession::start(&config, seed, now_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        session.resize(width, height);

        Ok(Self {
            session,
            renderer_state: Rc::new(RefCell::new(DomRendererState::new(canvas, ctx))),
            last_now_ms: now_ms,
        })
    }

    /// Register the selection callback. It receives the JSON array of all
    /// segments in index order whenever the selection changes.
    #[wasm_bindgen(js_name = onSegmentSelectionChange)]
    pub fn on_segment_selection_change(&mut self, callback: js_sys::Function) {
        self.session
            .on_segment_selection_change(Box::new(move |segments: &[Segment]| {
                let json = serde_json::to_string(segments).unwrap_or_default();
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    tracing::warn!("Selection callback threw: {:?}", err);
                }
            }));
    }

    /// Handle a mouse move. Returns the CSS cursor to show.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, event: &MouseEvent) -> String {
        let (x, y) = self.renderer_state.borrow().local_position(event);
        self.session.pointer_move(x, y);
        self.session.interaction().cursor().as_css().to_string()
    }

    /// Handle the pointer leaving the canvas.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    /// Handle a click. Returns the toggled segment index, if any.
    pub fn click(&mut self, event: &MouseEvent) -> Option<usize> {
        let (x, y) = self.renderer_state.borrow().local_position(event);
        match self.session.click(x, y, self.last_now_ms) {
            InteractionOutcome::Toggled { segment, .. } => Some(segment.index()),
            _ => None,
        }
    }

    /// Resize the canvas backing store (device pixels) and the camera
    /// projection.
    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Ok(mut state) = self.renderer_state.try_borrow_mut() {
            state.resize(width, height);
        }
        self.session.resize(width as f32, height as f32);
    }

    /// Advance timers and draw a frame. Returns `true` when a glue run
    /// finished on this tick.
    ///
    /// `now_ms` must come from `performance.now()` or a
    /// `requestAnimationFrame` timestamp.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.last_now_ms = now_ms;
        let report = self.session.tick(now_ms);
        self.render();
        report.completion.is_some()
    }

    /// Draw the scene at the last ticked time.
    pub fn render(&self) {
        if let Ok(state) = self.renderer_state.try_borrow() {
            state.render(&self.session, self.last_now_ms);
        }
    }

    /// Deselect every segment.
    #[wasm_bindgen(js_name = clearAllSelections)]
    pub fn clear_all_selections(&mut self) {
        self.session.clear_all_selections(self.last_now_ms);
    }

    /// Start a glue run.
    ///
    /// # Errors
    ///
    /// Returns the rejection message when the run is refused.
    #[wasm_bindgen(js_name = applyGlue)]
    pub fn apply_glue(&mut self, thickness: f32) -> Result<(), JsValue> {
        self.session
            .apply_glue(thickness, self.last_now_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start a glue run with the confirmed thickness.
    ///
    /// # Errors
    ///
    /// Returns the rejection message when the run is refused.
    #[wasm_bindgen(js_name = applyConfirmedGlue)]
    pub fn apply_confirmed_glue(&mut self) -> Result<(), JsValue> {
        self.session
            .apply_confirmed_glue(self.last_now_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Store a clamped thickness. Returns the stored value.
    #[wasm_bindgen(js_name = changeThickness)]
    pub fn change_thickness(&mut self, value: f32) -> f32 {
        self.session.change_thickness(value)
    }

    /// Stepper "+". Returns whether the value changed.
    #[wasm_bindgen(js_name = incrementThickness)]
    pub fn increment_thickness(&mut self) -> bool {
        self.session.dashboard_mut().increment_thickness()
    }

    /// Stepper "-". Returns whether the value changed.
    #[wasm_bindgen(js_name = decrementThickness)]
    pub fn decrement_thickness(&mut self) -> bool {
        self.session.dashboard_mut().decrement_thickness()
    }

    /// Selected segments as a JSON array.
    #[wasm_bindgen(js_name = getSelectedSegments)]
    #[must_use]
    pub fn get_selected_segments(&self) -> String {
        serde_json::to_string(&self.session.get_selected_segments()).unwrap_or_default()
    }

    /// Full dashboard state as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = getDashboardJson)]
    pub fn get_dashboard_json(&self) -> Result<String, JsValue> {
        self.session
            .snapshot_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Release the scene and drop the selection callback.
    pub fn dispose(&mut self) {
        self.session.teardown();
        if let Ok(state) = self.renderer_state.try_borrow() {
            state.ctx.clear_rect(
                0.0,
                0.0,
                f64::from(state.width),
                f64::from(state.height),
            );
        }
    }
}
