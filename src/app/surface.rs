//! egui painter as a field surface, plus a repaint-driven frame clock

use eframe::egui;
use glam::DVec2;
use tracing::trace;

use crate::core::render::RadialGradient;
use crate::core::{FrameClock, FrameId, ManualClock, Surface};
use crate::theme::{colors, Rgba};

/// Angular resolution of rasterized gradients
const GRADIENT_SEGMENTS: u32 = 64;

pub fn color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.alpha_u8())
}

/// Surface over an egui `Painter`.
///
/// egui is immediate mode, so the painter is re-attached every update before
/// the simulator draws. Drawing while detached is a no-op.
pub struct PainterSurface {
    painter: Option<egui::Painter>,
    rect: egui::Rect,
    pixels_per_point: f32,
    raster: (u32, u32),
}

impl PainterSurface {
    pub fn new() -> Self {
        Self {
            painter: None,
            rect: egui::Rect::ZERO,
            pixels_per_point: 1.0,
            raster: (0, 0),
        }
    }

    pub fn attach(&mut self, painter: egui::Painter, rect: egui::Rect, pixels_per_point: f32) {
        self.painter = Some(painter);
        self.rect = rect;
        self.pixels_per_point = pixels_per_point;
    }

    pub fn rect(&self) -> egui::Rect {
        self.rect
    }

    /// Device pixel size last handed to `configure`
    pub fn raster(&self) -> (u32, u32) {
        self.raster
    }

    fn to_screen(&self, p: DVec2) -> egui::Pos2 {
        self.rect.min + egui::vec2(p.x as f32, p.y as f32)
    }

    /// Concentric rings at the gradient stops, fanned from the center
    fn gradient_mesh(&self, gradient: &RadialGradient) -> egui::Mesh {
        let mut mesh = egui::Mesh::default();
        let span = gradient.outer_radius - gradient.inner_radius;
        if span <= 0.0 {
            return mesh;
        }

        let mut radii: Vec<f64> = Vec::with_capacity(gradient.stops.len() + 1);
        radii.push(gradient.inner_radius);
        radii.extend(
            gradient
                .stops
                .iter()
                .map(|stop| gradient.inner_radius + stop.offset * span),
        );
        radii.retain(|r| *r > 0.0);
        radii.dedup_by(|a, b| (*a - *b).abs() < 0.5);

        let center = self.to_screen(gradient.outer_center);
        mesh.colored_vertex(center, color32(gradient.color_at(0.0)));

        for radius in &radii {
            let color = color32(gradient.color_at(*radius));
            for k in 0..GRADIENT_SEGMENTS {
                let angle = std::f32::consts::TAU * k as f32 / GRADIENT_SEGMENTS as f32;
                let offset = egui::vec2(angle.cos(), angle.sin()) * *radius as f32;
                mesh.colored_vertex(center + offset, color);
            }
        }

        let ring = |i: u32, k: u32| 1 + i * GRADIENT_SEGMENTS + k % GRADIENT_SEGMENTS;
        for k in 0..GRADIENT_SEGMENTS {
            mesh.add_triangle(0, ring(0, k), ring(0, k + 1));
        }
        for i in 0..(radii.len() as u32).saturating_sub(1) {
            for k in 0..GRADIENT_SEGMENTS {
                mesh.add_triangle(ring(i, k), ring(i + 1, k), ring(i + 1, k + 1));
                mesh.add_triangle(ring(i, k), ring(i + 1, k + 1), ring(i, k + 1));
            }
        }
        mesh
    }
}

impl Default for PainterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for PainterSurface {
    fn logical_size(&self) -> DVec2 {
        DVec2::new(self.rect.width() as f64, self.rect.height() as f64)
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixels_per_point as f64
    }

    fn configure(&mut self, raster_width: u32, raster_height: u32, scale: f64) {
        // egui owns the framebuffer; just remember what was asked for
        trace!(raster_width, raster_height, scale, "Painter surface configured");
        self.raster = (raster_width, raster_height);
    }

    fn clear(&mut self, _size: DVec2) {
        if let Some(painter) = &self.painter {
            painter.rect_filled(self.rect, 0.0, color32(colors::BG_PRIMARY));
        }
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient, _size: DVec2) {
        let mesh = self.gradient_mesh(gradient);
        if let Some(painter) = &self.painter {
            if !mesh.is_empty() {
                painter.add(egui::Shape::mesh(mesh));
            }
        }
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64) {
        if let Some(painter) = &self.painter {
            painter.line_segment(
                [self.to_screen(from), self.to_screen(to)],
                egui::Stroke::new(width as f32, color32(color)),
            );
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if let Some(painter) = &self.painter {
            painter.circle_filled(self.to_screen(center), radius as f32, color32(color));
        }
    }
}

/// Frame clock that turns a frame request into an egui repaint request
pub struct RepaintClock {
    ctx: egui::Context,
    inner: ManualClock,
}

impl RepaintClock {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            inner: ManualClock::new(),
        }
    }

    /// Consume the pending request, if the simulator left one
    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.inner.take_pending()
    }
}

impl FrameClock for RepaintClock {
    type Handle = FrameId;

    fn request_frame(&mut self) -> Option<FrameId> {
        self.ctx.request_repaint();
        self.inner.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameId) {
        self.inner.cancel_frame(handle);
    }
}
