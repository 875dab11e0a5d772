//! Native viewer for the particle field
//!
//! Runs the same simulator as the browser build inside an eframe window, with
//! a small header showing frame rate and field counters.

mod header;
mod surface;

pub use surface::{color32, PainterSurface, RepaintClock};

use eframe::egui;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::core::FieldSimulator;
use crate::theme::colors;
use crate::time::FpsCounter;

type ViewerSimulator = FieldSimulator<PainterSurface, RepaintClock, StdRng>;

fn to_dvec(v: egui::Vec2) -> DVec2 {
    DVec2::new(v.x as f64, v.y as f64)
}

/// Dark visuals matching the field background
fn neon_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = color32(colors::BG_PRIMARY);
    visuals.window_fill = color32(colors::BG_PRIMARY);
    visuals.extreme_bg_color = color32(colors::BG_PRIMARY);
    visuals.override_text_color = Some(color32(colors::TEXT_SECONDARY));
    visuals
}

pub struct NeonViewer {
    /// None only if mounting failed
    pub(crate) sim: Option<ViewerSimulator>,
    /// Field area size at the last resize
    last_size: Option<egui::Vec2>,
    pub(crate) fps_counter: FpsCounter,
}

impl NeonViewer {
    pub fn new(cc: &eframe::CreationContext<'_>, seed: Option<u64>) -> Self {
        cc.egui_ctx.set_visuals(neon_visuals());

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = RepaintClock::new(cc.egui_ctx.clone());
        let sim = FieldSimulator::mount(Some(PainterSurface::new()), clock, rng);
        info!(seed = ?seed, "Viewer started");

        Self {
            sim,
            last_size: None,
            fps_counter: FpsCounter::new(),
        }
    }

    fn render_field(&mut self, ui: &mut egui::Ui) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        sim.surface_mut()
            .attach(painter, rect, ui.ctx().pixels_per_point());

        // Window resize: re-measure and reseed, like the browser resize event
        if self.last_size != Some(rect.size()) {
            self.last_size = Some(rect.size());
            sim.resize();
        }

        match ui.ctx().input(|i| i.pointer.hover_pos()) {
            Some(pos) => sim.pointer_moved(to_dvec(pos.to_vec2()), to_dvec(rect.min.to_vec2())),
            None if sim.pointer().is_tracking() => sim.pointer_left(),
            None => {}
        }

        if sim.clock_mut().take_pending().is_some() {
            sim.on_frame();
        }
    }
}

impl eframe::App for NeonViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(color32(colors::BG_PRIMARY))
                    .inner_margin(4.0),
            )
            .show(ctx, |ui| self.render_header(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(color32(colors::BG_PRIMARY)))
            .show(ctx, |ui| self.render_field(ui));
    }
}

impl Drop for NeonViewer {
    fn drop(&mut self) {
        if let Some(sim) = self.sim.as_mut() {
            sim.unmount();
            info!(frames = sim.frames(), "Viewer stopped");
        }
    }
}
