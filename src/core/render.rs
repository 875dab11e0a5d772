//! Drawing surface abstraction and the per-frame renderer

use glam::DVec2;
use tracing::trace;

use super::field::ParticleField;
use crate::theme::{colors, Rgba};

/// Width of link lines in logical pixels
pub const LINK_WIDTH: f64 = 1.0;

/// Something the field can be drawn onto.
///
/// All drawing calls take logical (unscaled) coordinates; `configure` is
/// where a host maps them onto its device pixels.
pub trait Surface {
    /// On-screen box size in logical pixels
    fn logical_size(&self) -> DVec2;

    /// Device pixels per logical pixel, as reported by the host
    fn pixel_ratio(&self) -> f64;

    /// Resize the backing raster and reset the transform so that subsequent
    /// drawing is scaled by `scale`
    fn configure(&mut self, raster_width: u32, raster_height: u32, scale: f64);

    fn clear(&mut self, size: DVec2);

    /// Fill the `size` box at the origin with a radial gradient
    fn fill_radial_gradient(&mut self, gradient: &RadialGradient, size: DVec2);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

const fn stop(offset: f64, color: Rgba) -> ColorStop {
    ColorStop { offset, color }
}

static HAZE_STOPS: [ColorStop; 3] = [
    stop(0.0, colors::HAZE_INDIGO),
    stop(0.45, colors::HAZE_PURPLE),
    stop(1.0, colors::HAZE_CLEAR),
];

static GLOW_STOPS: [ColorStop; 2] = [
    stop(0.0, colors::GLOW_PURPLE),
    stop(0.55, colors::GLOW_CLEAR),
];

/// Two-circle radial gradient, same model as the canvas 2D API
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub inner_center: DVec2,
    pub inner_radius: f64,
    pub outer_center: DVec2,
    pub outer_radius: f64,
    pub stops: &'static [ColorStop],
}

impl RadialGradient {
    /// Color at `distance` from the center, for hosts that rasterize the
    /// gradient themselves. Assumes concentric circles.
    pub fn color_at(&self, distance: f64) -> Rgba {
        let span = (self.outer_radius - self.inner_radius).max(f64::EPSILON);
        let t = ((distance - self.inner_radius) / span).clamp(0.0, 1.0);

        let Some(first) = self.stops.first() else {
            return Rgba::new(0, 0, 0, 0.0);
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let local = (t - a.offset) / (b.offset - a.offset).max(f64::EPSILON);
                return a.color.lerp(b.color, local);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

/// Decorative background drawn under the field every frame.
///
/// Depends only on the surface size: an indigo/purple haze upper right of
/// center and a purple glow toward the lower-left edge.
pub fn ambient_gradients(size: DVec2) -> [RadialGradient; 2] {
    let haze_center = DVec2::new(size.x * 0.55, size.y * 0.3);
    let glow_center = DVec2::new(size.x * 0.2, size.y * 0.8);
    [
        RadialGradient {
            inner_center: haze_center,
            inner_radius: 40.0,
            outer_center: haze_center,
            outer_radius: size.x * 0.9,
            stops: &HAZE_STOPS,
        },
        RadialGradient {
            inner_center: glow_center,
            inner_radius: 0.0,
            outer_center: glow_center,
            outer_radius: 800.0,
            stops: &GLOW_STOPS,
        },
    ]
}

/// Counts from one rendered frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub links: usize,
    pub dots: usize,
}

/// Draw the field: clear, ambient background, links, then dots.
pub fn render_frame<S: Surface + ?Sized>(field: &ParticleField, surface: &mut S) -> FrameStats {
    let size = field.bounds();
    surface.clear(size);

    for gradient in ambient_gradients(size).iter() {
        surface.fill_radial_gradient(gradient, size);
    }

    let mut links = 0;
    for link in field.links() {
        surface.stroke_line(link.from, link.to, colors::LINK.with_alpha(link.alpha), LINK_WIDTH);
        links += 1;
    }

    for particle in field.particles() {
        surface.fill_circle(
            particle.position,
            particle.radius(),
            colors::DOT.with_alpha(particle.alpha()),
        );
    }

    let stats = FrameStats {
        links,
        dots: field.len(),
    };
    trace!(links = stats.links, dots = stats.dots, "Frame rendered");
    stats
}

/// One recorded drawing call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear { size: DVec2 },
    Gradient { center: DVec2, outer_radius: f64 },
    Line { from: DVec2, to: DVec2, color: Rgba },
    Circle { center: DVec2, radius: f64, color: Rgba },
}

/// In-memory surface that records the last frame's drawing calls.
///
/// Used by the headless CLI and as a spy in tests.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: DVec2,
    pixel_ratio: f64,
    raster: (u32, u32),
    scale: f64,
    ops: Vec<DrawOp>,
    clears: u64,
}

impl RecordingSurface {
    pub fn new(size: DVec2, pixel_ratio: f64) -> Self {
        Self {
            size,
            pixel_ratio,
            raster: (0, 0),
            scale: 1.0,
            ops: Vec::new(),
            clears: 0,
        }
    }

    /// Change the reported box size; hosts follow up with a resize
    pub fn set_logical_size(&mut self, size: DVec2) {
        self.size = size;
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    /// Drawing calls since the last clear
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn raster(&self) -> (u32, u32) {
        self.raster
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of frames started (clears) so far
    pub fn frames_drawn(&self) -> u64 {
        self.clears
    }

    pub fn line_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count()
    }

    pub fn circle_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Circle { .. })).count()
    }
}

impl Surface for RecordingSurface {
    fn logical_size(&self) -> DVec2 {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn configure(&mut self, raster_width: u32, raster_height: u32, scale: f64) {
        self.raster = (raster_width, raster_height);
        self.scale = scale;
    }

    fn clear(&mut self, size: DVec2) {
        self.ops.clear();
        self.clears += 1;
        self.ops.push(DrawOp::Clear { size });
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient, _size: DVec2) {
        self.ops.push(DrawOp::Gradient {
            center: gradient.outer_center,
            outer_radius: gradient.outer_radius,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Rgba, _width: f64) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Particle;

    fn field() -> ParticleField {
        let dot = |x: f64, y: f64, alpha: f64| Particle::new(DVec2::new(x, y), DVec2::ZERO, 2.0, alpha);
        ParticleField::from_particles(
            vec![dot(10.0, 10.0, 0.2), dot(60.0, 10.0, 0.3), dot(400.0, 400.0, 0.15)],
            DVec2::new(500.0, 500.0),
        )
    }

    #[test]
    fn frame_draws_in_layer_order() {
        let mut surface = RecordingSurface::new(DVec2::new(500.0, 500.0), 1.0);
        let stats = render_frame(&field(), &mut surface);
        assert_eq!(stats, FrameStats { links: 1, dots: 3 });

        let ops = surface.ops();
        assert!(matches!(ops[0], DrawOp::Clear { .. }));
        assert!(matches!(ops[1], DrawOp::Gradient { .. }));
        assert!(matches!(ops[2], DrawOp::Gradient { .. }));
        assert!(matches!(ops[3], DrawOp::Line { .. }));
        assert!(ops[4..].iter().all(|op| matches!(op, DrawOp::Circle { .. })));
        assert_eq!(surface.line_count(), 1);
        assert_eq!(surface.circle_count(), 3);
    }

    #[test]
    fn link_and_dot_colors_carry_alpha() {
        let mut surface = RecordingSurface::new(DVec2::new(500.0, 500.0), 1.0);
        render_frame(&field(), &mut surface);

        let DrawOp::Line { color, .. } = surface.ops()[3] else {
            panic!("expected a line");
        };
        let expected = 0.06 + (1.0 - 50.0 / 120.0) * 0.16;
        assert_eq!((color.r, color.g, color.b), (99, 102, 241));
        assert!((color.a - expected).abs() < 1e-12);

        let DrawOp::Circle { color, radius, .. } = surface.ops()[4] else {
            panic!("expected a circle");
        };
        assert_eq!((color.r, color.g, color.b), (167, 139, 250));
        assert_eq!(color.a, 0.2);
        assert_eq!(radius, 2.0);
    }

    #[test]
    fn each_frame_starts_from_a_clear() {
        let mut surface = RecordingSurface::new(DVec2::new(500.0, 500.0), 1.0);
        render_frame(&field(), &mut surface);
        render_frame(&field(), &mut surface);
        assert_eq!(surface.frames_drawn(), 2);
        assert_eq!(surface.circle_count(), 3);
    }

    #[test]
    fn ambient_gradients_track_surface_size() {
        let [haze, glow] = ambient_gradients(DVec2::new(1000.0, 800.0));
        assert_eq!(haze.inner_center, DVec2::new(550.0, 240.0));
        assert_eq!(haze.inner_radius, 40.0);
        assert_eq!(haze.outer_radius, 900.0);
        assert_eq!(glow.inner_center, DVec2::new(200.0, 640.0));
        assert_eq!(glow.outer_radius, 800.0);
    }

    #[test]
    fn gradient_color_interpolates_between_stops() {
        let [haze, _] = ambient_gradients(DVec2::new(1000.0, 800.0));
        assert_eq!(haze.color_at(0.0), colors::HAZE_INDIGO);
        assert_eq!(haze.color_at(40.0), colors::HAZE_INDIGO);
        assert_eq!(haze.color_at(5000.0), colors::HAZE_CLEAR);

        // 0.45 of the way from radius 40 to 900
        let at_mid_stop = haze.color_at(40.0 + 0.45 * 860.0);
        assert!((at_mid_stop.a - colors::HAZE_PURPLE.a).abs() < 1e-9);
    }
}
