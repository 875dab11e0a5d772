//! Browser host: the particle field on a `<canvas>` 2D context
//!
//! JS side:
//!
//! ```js
//! const field = NeonField.mountById();   // or NeonField.mount(canvasElement)
//! // ...
//! field.unmount();                       // removes listeners, cancels the frame
//! ```

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use crate::core::render::RadialGradient;
use crate::core::{FieldSimulator, FrameClock, Surface};
use crate::theme::Rgba;

/// Canvas element id used when none is given
pub const DEFAULT_CANVAS_ID: &str = "neon-field";
/// Window property that overrides [`DEFAULT_CANVAS_ID`]
const CANVAS_ID_OVERRIDE: &str = "__neon_field_canvas";

const EVENT_RESIZE: &str = "resize";
const EVENT_POINTER_MOVE: &str = "mousemove";
const EVENT_POINTER_LEAVE: &str = "mouseleave";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();
}

// ============================================================================
// Canvas surface
// ============================================================================

/// 2D context of one canvas element
pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// None if the browser will not hand out a 2D context
    pub fn acquire(window: Window, canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            window,
            canvas,
            ctx,
        })
    }

    /// Top-left corner of the canvas in client coordinates
    pub fn origin(&self) -> DVec2 {
        let rect = self.canvas.get_bounding_client_rect();
        DVec2::new(rect.left(), rect.top())
    }

    fn set_fill(&self, value: &JsValue) {
        #[allow(deprecated)]
        self.ctx.set_fill_style(value);
    }

    fn set_stroke(&self, value: &JsValue) {
        #[allow(deprecated)]
        self.ctx.set_stroke_style(value);
    }
}

impl Surface for CanvasSurface {
    fn logical_size(&self) -> DVec2 {
        let rect = self.canvas.get_bounding_client_rect();
        DVec2::new(rect.width(), rect.height())
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn configure(&mut self, raster_width: u32, raster_height: u32, scale: f64) {
        self.canvas.set_width(raster_width);
        self.canvas.set_height(raster_height);
        if let Err(e) = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0) {
            warn!(?e, "Failed to set canvas transform");
        }
    }

    fn clear(&mut self, size: DVec2) {
        self.ctx.clear_rect(0.0, 0.0, size.x, size.y);
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient, size: DVec2) {
        let fill = match self.ctx.create_radial_gradient(
            gradient.inner_center.x,
            gradient.inner_center.y,
            gradient.inner_radius,
            gradient.outer_center.x,
            gradient.outer_center.y,
            gradient.outer_radius,
        ) {
            Ok(fill) => fill,
            Err(e) => {
                // Negative radius on a zero-width canvas, mostly
                debug!(?e, "Skipping ambient gradient");
                return;
            }
        };
        for stop in gradient.stops {
            if let Err(e) = fill.add_color_stop(stop.offset as f32, &stop.color.to_css()) {
                warn!(?e, offset = stop.offset, "Bad gradient color stop");
                return;
            }
        }
        self.set_fill(&fill);
        self.ctx.fill_rect(0.0, 0.0, size.x, size.y);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64) {
        self.set_stroke(&JsValue::from_str(&color.to_css()));
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.set_fill(&JsValue::from_str(&color.to_css()));
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(center.x, center.y, radius, 0.0, TAU) {
            warn!(?e, "Failed to trace particle");
            return;
        }
        self.ctx.fill();
    }
}

// ============================================================================
// requestAnimationFrame clock
// ============================================================================

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Frame clock backed by `requestAnimationFrame`.
///
/// The callback lives in a shared cell so the simulator can re-request it
/// from inside the callback itself.
pub struct RafClock {
    window: Window,
    callback: FrameCallback,
}

impl FrameClock for RafClock {
    type Handle = i32;

    fn request_frame(&mut self) -> Option<i32> {
        let slot = self.callback.borrow();
        let callback = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(?e, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            warn!(?e, handle, "cancelAnimationFrame failed");
        }
    }
}

// ============================================================================
// Mounting
// ============================================================================

type WebSimulator = FieldSimulator<CanvasSurface, RafClock, StdRng>;
type SimulatorSlot = Rc<RefCell<Option<WebSimulator>>>;

/// Run `f` against the simulator if it is still alive and not already
/// borrowed by another callback on the stack.
fn with_simulator(slot: &Weak<RefCell<Option<WebSimulator>>>, f: impl FnOnce(&mut WebSimulator)) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let Ok(mut guard) = slot.try_borrow_mut() else {
        warn!("Particle field busy, callback dropped");
        return;
    };
    if let Some(sim) = guard.as_mut() {
        f(sim);
    }
}

/// Window listeners feeding one simulator
struct Listeners {
    window: Window,
    on_resize: Closure<dyn FnMut()>,
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_leave: Closure<dyn FnMut()>,
}

impl Listeners {
    fn attach(window: Window, slot: &SimulatorSlot) -> Self {
        let weak = Rc::downgrade(slot);
        let on_resize = Closure::wrap(Box::new(move || {
            with_simulator(&weak, |sim| sim.resize());
        }) as Box<dyn FnMut()>);

        let weak = Rc::downgrade(slot);
        let on_move = Closure::wrap(Box::new(move |e: MouseEvent| {
            with_simulator(&weak, |sim| {
                let origin = sim.surface().origin();
                let client = DVec2::new(e.client_x() as f64, e.client_y() as f64);
                sim.pointer_moved(client, origin);
            });
        }) as Box<dyn FnMut(MouseEvent)>);

        let weak = Rc::downgrade(slot);
        let on_leave = Closure::wrap(Box::new(move || {
            with_simulator(&weak, |sim| sim.pointer_left());
        }) as Box<dyn FnMut()>);

        let listeners = Self {
            window,
            on_resize,
            on_move,
            on_leave,
        };
        for (event, callback) in listeners.callbacks() {
            if let Err(e) = listeners
                .window
                .add_event_listener_with_callback(event, callback.unchecked_ref())
            {
                warn!(?e, event, "Failed to attach listener");
            }
        }
        listeners
    }

    fn callbacks(&self) -> [(&'static str, &JsValue); 3] {
        [
            (EVENT_RESIZE, self.on_resize.as_ref()),
            (EVENT_POINTER_MOVE, self.on_move.as_ref()),
            (EVENT_POINTER_LEAVE, self.on_leave.as_ref()),
        ]
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (event, callback) in self.callbacks() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback(event, callback.unchecked_ref())
            {
                warn!(?e, event, "Failed to detach listener");
            }
        }
    }
}

/// Everything one mounted canvas keeps alive
struct Mounted {
    slot: SimulatorSlot,
    frame_callback: FrameCallback,
    _listeners: Listeners,
}

impl Mounted {
    fn new(window: Window, canvas: HtmlCanvasElement) -> Option<Self> {
        let surface = CanvasSurface::acquire(window.clone(), canvas);

        let slot: SimulatorSlot = Rc::new(RefCell::new(None));
        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));

        // The callback must exist before mount, which schedules the first frame
        let weak = Rc::downgrade(&slot);
        *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
            with_simulator(&weak, |sim| sim.on_frame());
        }) as Box<dyn FnMut(f64)>));

        let clock = RafClock {
            window: window.clone(),
            callback: frame_callback.clone(),
        };
        let sim = FieldSimulator::mount(surface, clock, StdRng::from_entropy())?;
        *slot.borrow_mut() = Some(sim);

        let listeners = Listeners::attach(window, &slot);
        Some(Self {
            slot,
            frame_callback,
            _listeners: listeners,
        })
    }

    fn frames(&self) -> u64 {
        self.slot
            .try_borrow()
            .ok()
            .and_then(|guard| guard.as_ref().map(|sim| sim.frames()))
            .unwrap_or(0)
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        // Listeners detach in their own Drop, after this runs
        match self.slot.try_borrow_mut() {
            Ok(mut guard) => {
                if let Some(sim) = guard.as_mut() {
                    sim.unmount();
                }
                guard.take();
            }
            Err(_) => warn!("Particle field busy during teardown"),
        }
        self.frame_callback.borrow_mut().take();
    }
}

fn configured_canvas_id(window: &Window) -> String {
    js_sys::Reflect::get(window, &JsValue::from_str(CANVAS_ID_OVERRIDE))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| DEFAULT_CANVAS_ID.to_string())
}

fn find_canvas(window: &Window, id: &str) -> Option<HtmlCanvasElement> {
    window
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()
}

/// Handle to one particle field running on a canvas.
///
/// Mounting never throws: without a window, canvas or 2D context the handle
/// is simply inert.
#[wasm_bindgen]
pub struct NeonField {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl NeonField {
    /// Start the field on a canvas element
    pub fn mount(canvas: HtmlCanvasElement) -> NeonField {
        let mounted = web_sys::window().and_then(|window| Mounted::new(window, canvas));
        if mounted.is_some() {
            info!("Particle field running");
        }
        NeonField { mounted }
    }

    /// Start the field on the canvas with this id, or the configured default
    #[wasm_bindgen(js_name = mountById)]
    pub fn mount_by_id(id: Option<String>) -> NeonField {
        let Some(window) = web_sys::window() else {
            return NeonField { mounted: None };
        };
        let id = id.unwrap_or_else(|| configured_canvas_id(&window));
        match find_canvas(&window, &id) {
            Some(canvas) => Self::mount(canvas),
            None => {
                debug!(id = %id, "Canvas not found, particle field not started");
                NeonField { mounted: None }
            }
        }
    }

    /// Remove listeners and cancel the pending frame. Safe to call twice.
    pub fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            info!("Particle field stopped");
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.mounted.is_some()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> f64 {
        self.mounted.as_ref().map_or(0, Mounted::frames) as f64
    }
}
